use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::entity::form_chat::{self, ChatSender};

/// 세션 ID가 없을 때 사용하는 기본 세션
pub const DEFAULT_SESSION_ID: &str = "default";

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery {
    /// 생략하면 `default`
    pub session_id: Option<String>,
}

impl ChatQuery {
    pub fn session_id(self) -> String {
        self.session_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(default_session_id)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostChatRequest {
    #[serde(default = "default_session_id")]
    #[validate(length(min = 1, max = 191, message = "sessionId must be 1-191 characters."))]
    pub session_id: String,
    pub sender: ChatSender,
    #[validate(length(min = 1, message = "Message must not be empty."))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: i64,
    pub form_id: i64,
    pub session_id: String,
    pub sender: ChatSender,
    pub message: String,
    pub created_at: NaiveDateTime,
}

impl From<form_chat::Model> for ChatMessageResponse {
    fn from(model: form_chat::Model) -> Self {
        Self {
            id: model.chat_id,
            form_id: model.form_id,
            session_id: model.session_id,
            sender: model.sender,
            message: model.message,
            created_at: model.created_at,
        }
    }
}

/// 메시지 전송 결과
///
/// 사용자 메시지는 배열(`[user, ai]`, AI 실패 시 `[user]`), 그 외 발신자는 단일 객체로 응답합니다.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PostChatResult {
    Single(ChatMessageResponse),
    Exchange(Vec<ChatMessageResponse>),
}

// ============== Swagger 응답 래퍼 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessChatListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<ChatMessageResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPostChatResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: PostChatResult,
}
