pub mod client;
pub mod prompt;

pub use client::{
    AiClient, AiClientTrait, AiOutcome, CompletionKind, CompletionRequest, OpenAiClient,
    PromptMessage, PromptRole,
};
