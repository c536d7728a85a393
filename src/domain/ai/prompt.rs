use serde_json::{Map, Value};

use super::client::PromptMessage;
use crate::domain::chat::entity::form_chat::{self, ChatSender};
use crate::domain::company::entity::company;
use crate::domain::form::entity::form_prompt;

/// 제출 답변 최대 토큰 수
pub const SUBMISSION_REPLY_MAX_TOKENS: u32 = 200;

/// 회사/프롬프트 설정이 없을 때의 채팅 시스템 프롬프트
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful business assistant.";

/// 제출 데이터를 `key: value` 줄로 펼칩니다.
pub fn flatten_submission(data: &Map<String, Value>) -> String {
    data.iter()
        .map(|(key, value)| format!("{}: {}", key, render_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// 제출 답변 요청 메시지
pub fn submission_reply_messages(prompt: &str, data: &Map<String, Value>) -> Vec<PromptMessage> {
    vec![PromptMessage::user(format!(
        "{}\n\nForm submission:\n{}\n\nProvide a helpful, personalized response:",
        prompt,
        flatten_submission(data)
    ))]
}

/// 회사 프로필 블록
fn business_profile(company: &company::Model) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    format!(
        "Business: {}\nType: {}\nGoal: {}\nProduct: {}\nAudience: {}\nTone: {}\nKeywords: {}\nCommon Qs: {}\nValue: {}\nFollow-up: {}",
        company.name,
        field(&company.business_type),
        field(&company.main_contact_goal),
        field(&company.product_description),
        field(&company.target_audience),
        field(&company.preferred_tone),
        field(&company.keywords),
        field(&company.common_questions),
        field(&company.value_offers),
        field(&company.follow_up_style),
    )
}

/// 채팅 시스템 프롬프트
///
/// 회사와 프롬프트가 모두 설정된 폼만 회사 프로필 뒤에 프롬프트와 컨텍스트를
/// 빈 줄로 이어 붙입니다. 둘 중 하나라도 없으면 기본 프롬프트를 사용합니다.
pub fn chat_system_prompt(
    company: Option<&company::Model>,
    prompt: Option<&form_prompt::Model>,
) -> String {
    let (Some(company), Some(prompt)) = (company, prompt) else {
        return FALLBACK_SYSTEM_PROMPT.to_string();
    };

    let mut sections = vec![business_profile(company)];
    for text in [&prompt.prompt, &prompt.context].into_iter().flatten() {
        if !text.trim().is_empty() {
            sections.push(text.clone());
        }
    }
    sections.join("\n\n")
}

/// 시스템 프롬프트 뒤에 세션 기록을 시간순으로 붙입니다.
pub fn chat_transcript(system_prompt: &str, history: &[form_chat::Model]) -> Vec<PromptMessage> {
    std::iter::once(PromptMessage::system(system_prompt))
        .chain(history.iter().map(|chat| match chat.sender {
            ChatSender::User => PromptMessage::user(chat.message.clone()),
            ChatSender::Ai => PromptMessage::assistant(chat.message.clone()),
        }))
        .collect()
}
