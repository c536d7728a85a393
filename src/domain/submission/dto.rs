use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::entity::form_submission::{self, UserResponse};

/// 팔로업 응답 문구
pub const YES_FOLLOW_UP: &str =
    "Great! I'll make sure someone from our team reaches out to you soon with more information.";
pub const NO_FOLLOW_UP: &str =
    "No problem! Thanks for letting us know. Feel free to reach out if you have any other questions.";

// ============== 폼 제출 ==============

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormRequest {
    /// 필드 ID를 키로 하는 응답 객체
    #[schema(value_type = Object)]
    #[serde(default)]
    pub submission_data: Value,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormResponse {
    pub submission_id: i64,
    /// 프롬프트가 없거나 모델 호출이 실패하면 `null`
    pub ai_response: Option<String>,
}

/// 제출자의 접속 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip: String,
    pub user_agent: String,
}

impl ClientMeta {
    pub const DEFAULT_IP: &'static str = "127.0.0.1";
    pub const DEFAULT_USER_AGENT: &'static str = "Unknown";

    /// `x-forwarded-for`의 첫 번째 주소와 `user-agent`
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(Self::DEFAULT_IP)
            .to_string();

        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(Self::DEFAULT_USER_AGENT)
            .to_string();

        Self { ip, user_agent }
    }
}

// ============== 예/아니오 응답 ==============

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub submission_id: i64,
    /// `yes` 또는 `no`
    pub response: String,
}

impl RespondRequest {
    pub fn choice(&self) -> Option<UserResponse> {
        match self.response.as_str() {
            "yes" => Some(UserResponse::Yes),
            "no" => Some(UserResponse::No),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondResponse {
    pub follow_up_message: String,
}

pub fn follow_up_message(choice: UserResponse) -> &'static str {
    match choice {
        UserResponse::Yes => YES_FOLLOW_UP,
        UserResponse::No => NO_FOLLOW_UP,
    }
}

// ============== 제출 목록 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionItem {
    pub id: i64,
    pub form_id: i64,
    /// 저장된 원본 (필드 ID 키)
    #[schema(value_type = Object)]
    pub data: Value,
    /// 필드 ID를 라벨로 바꾼 사본
    #[schema(value_type = Object)]
    pub submission_data: Value,
    pub ip: String,
    pub user_agent: String,
    pub submitted_at: NaiveDateTime,
    pub user_responded: bool,
    pub user_response: Option<UserResponse>,
}

impl SubmissionItem {
    pub fn new(model: form_submission::Model, labels: &HashMap<String, String>) -> Self {
        let submission_data = Value::Object(relabel(&model.data, labels));
        Self {
            id: model.submission_id,
            form_id: model.form_id,
            data: model.data,
            submission_data,
            ip: model.ip,
            user_agent: model.user_agent,
            submitted_at: model.submitted_at,
            user_responded: model.user_responded,
            user_response: model.user_response,
        }
    }
}

/// 라벨이 있는 키만 치환하고 나머지는 그대로 둡니다.
fn relabel(data: &Value, labels: &HashMap<String, String>) -> Map<String, Value> {
    data.as_object()
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| {
                    let label = labels.get(key).cloned().unwrap_or_else(|| key.clone());
                    (label, value.clone())
                })
                .collect()
        })
        .unwrap_or_default()
}

// ============== Swagger 응답 래퍼 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessSubmitFormResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: SubmitFormResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRespondResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: RespondResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessSubmissionListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<SubmissionItem>,
}
