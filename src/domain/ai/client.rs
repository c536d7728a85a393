use std::sync::Arc;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::Serialize;
use tracing::debug;

use crate::utils::error::AppError;
use crate::utils::BaseResponse;

/// OpenAI 호출 타임아웃 (초)
const OPENAI_TIMEOUT_SECS: u64 = 25;

/// OpenAI 에러를 원인이 드러나는 AiUnavailable로 변환
fn classify_openai_error(error: OpenAIError) -> AppError {
    let reason = match &error {
        OpenAIError::ApiError(api_err) => {
            let err_type = api_err.r#type.as_deref().unwrap_or("");
            let message = &api_err.message;

            if err_type == "invalid_request_error" && message.contains("API key") {
                "authentication failed".to_string()
            } else if err_type == "rate_limit_error" || message.contains("rate limit") {
                "rate limited".to_string()
            } else if err_type == "server_error" {
                format!("provider server error: {}", message)
            } else {
                message.clone()
            }
        }
        OpenAIError::Reqwest(req_err) => {
            if req_err.is_timeout() || req_err.is_connect() {
                format!("connection failed: {}", req_err)
            } else {
                match req_err.status().map(|s| s.as_u16()) {
                    Some(401) => "authentication failed".to_string(),
                    Some(429) => "rate limited".to_string(),
                    _ => req_err.to_string(),
                }
            }
        }
        _ => error.to_string(),
    };

    AppError::AiUnavailable(reason)
}

/// 메시지 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// 공급자에 독립적인 대화 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

/// 어떤 기능의 호출인지. 기능마다 모델이 다릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// 폼 제출 직후 한 번의 답변
    SubmissionReply,
    /// 채팅 세션 답변
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub kind: CompletionKind,
    pub messages: Vec<PromptMessage>,
    pub max_tokens: Option<u32>,
}

/// 최선 노력(best-effort) AI 호출의 결과
///
/// 요청 자체는 성공으로 응답하되, 모델 호출이 실패했다면 응답 코드로 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOutcome {
    /// 답변 생성
    Replied,
    /// 프롬프트나 API 키가 없어 호출하지 않음
    Skipped,
    /// 호출했지만 실패
    Failed,
}

impl AiOutcome {
    /// 결과에 맞는 응답 봉투
    pub fn envelope<T: Serialize>(self, result: T) -> BaseResponse<T> {
        match self {
            AiOutcome::Failed => BaseResponse::ai_unavailable(result),
            AiOutcome::Replied | AiOutcome::Skipped => BaseResponse::success(result),
        }
    }
}

/// AI 클라이언트 인터페이스
///
/// 언어 모델 호출을 추상화하여 테스트에서 Mock 객체로 대체할 수 있습니다.
/// 빈 답변은 실패로 취급해 `AiUnavailable`을 반환해야 합니다.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AiClientTrait: Send + Sync {
    /// 채팅 완성 요청
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;

    /// API 연결 상태 확인 (모델 목록 조회)
    async fn check_connectivity(&self) -> Result<(), AppError>;
}

/// Arc로 래핑된 AiClient (Clone 지원)
pub type AiClient = Arc<dyn AiClientTrait>;

/// OpenAI API 클라이언트 구현체
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    submission_model: String,
    chat_model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: &str,
        submission_model: impl Into<String>,
        chat_model: impl Into<String>,
    ) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            submission_model: submission_model.into(),
            chat_model: chat_model.into(),
        }
    }

    fn model_for(&self, kind: CompletionKind) -> &str {
        match kind {
            CompletionKind::SubmissionReply => &self.submission_model,
            CompletionKind::Chat => &self.chat_model,
        }
    }
}

#[async_trait::async_trait]
impl AiClientTrait for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let model = self.model_for(request.kind).to_string();
        let messages = request
            .messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(model.as_str()).messages(messages);
        if let Some(limit) = request.max_tokens {
            args.max_completion_tokens(limit);
        }
        let chat_request = args
            .build()
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // OpenAI 호출 타임아웃 적용 (25초)
        let response = tokio::time::timeout(
            Duration::from_secs(OPENAI_TIMEOUT_SECS),
            self.client.chat().create(chat_request),
        )
        .await
        .map_err(|_| AppError::AiUnavailable(format!("timed out after {}s", OPENAI_TIMEOUT_SECS)))?
        .map_err(classify_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::AiUnavailable("empty completion".to_string()))?;

        debug!(model = %model, chars = content.len(), "Completion received");
        Ok(content)
    }

    async fn check_connectivity(&self) -> Result<(), AppError> {
        self.client
            .models()
            .list()
            .await
            .map_err(classify_openai_error)?;
        Ok(())
    }
}

/// 메시지 빌더 헬퍼 함수
fn to_openai_message(message: &PromptMessage) -> Result<ChatCompletionRequestMessage, AppError> {
    let content = message.content.as_str();
    let built = match message.role {
        PromptRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map(ChatCompletionRequestMessage::System),
        PromptRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map(ChatCompletionRequestMessage::User),
        PromptRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map(ChatCompletionRequestMessage::Assistant),
    };

    built.map_err(|e| AppError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_route_models_by_completion_kind() {
        let client = OpenAiClient::new("sk-test", "gpt-3.5-turbo", "gpt-4o-mini");

        assert_eq!(client.model_for(CompletionKind::SubmissionReply), "gpt-3.5-turbo");
        assert_eq!(client.model_for(CompletionKind::Chat), "gpt-4o-mini");
    }

    #[test]
    fn should_convert_every_role() {
        let messages = [
            PromptMessage::system("be nice"),
            PromptMessage::user("hi"),
            PromptMessage::assistant("hello"),
        ];

        let converted: Vec<_> = messages.iter().map(|m| to_openai_message(m).unwrap()).collect();

        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(converted[2], ChatCompletionRequestMessage::Assistant(_)));
    }

    #[tokio::test]
    async fn mock_client_should_surface_provider_failure() {
        let mut mock = MockAiClientTrait::new();
        mock.expect_complete()
            .returning(|_| Err(AppError::AiUnavailable("rate limited".into())));

        let result = mock
            .complete(CompletionRequest {
                kind: CompletionKind::Chat,
                messages: vec![PromptMessage::user("hi")],
                max_tokens: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::AiUnavailable(_))));
    }
}
