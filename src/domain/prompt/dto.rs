use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::company::dto::{CompanyProfileRequest, CompanyResponse};
use crate::domain::form::entity::form_prompt;

/// 프롬프트 저장 요청
///
/// 회사 프로필 필드를 함께 보낼 수 있으며, 폼에 회사가 연결된 경우에만 반영됩니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePromptRequest {
    pub prompt: Option<String>,
    pub context: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: CompanyProfileRequest,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub form_id: i64,
    pub prompt: Option<String>,
    pub context: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
    /// 폼에 연결된 회사 프로필
    pub company: Option<CompanyResponse>,
}

impl PromptResponse {
    pub fn new(
        form_id: i64,
        prompt: Option<form_prompt::Model>,
        company: Option<CompanyResponse>,
    ) -> Self {
        match prompt {
            Some(prompt) => Self {
                form_id,
                prompt: prompt.prompt,
                context: prompt.context,
                updated_at: Some(prompt.updated_at),
                company,
            },
            None => Self {
                form_id,
                prompt: None,
                context: None,
                updated_at: None,
                company,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPromptResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: PromptResponse,
}
