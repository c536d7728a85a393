use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::form_field::{self, FieldType};
use crate::store::{FormRecord, FormSummary, NewField};

/// 폼 스타일 설정
///
/// 저장 값이 없거나 일부만 있으면 기본값으로 채웁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FormStyling {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub border_radius: String,
    pub font_size: String,
    pub font_family: String,
    pub dark_mode: bool,
}

impl Default for FormStyling {
    fn default() -> Self {
        Self {
            primary_color: "#2D5016".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#000000".to_string(),
            border_radius: "8px".to_string(),
            font_size: "16px".to_string(),
            font_family: "Inter".to_string(),
            dark_mode: false,
        }
    }
}

impl FormStyling {
    /// 저장된 JSON에서 복원. 형식이 깨진 값은 기본값.
    pub fn from_stored(stored: Option<&serde_json::Value>) -> Self {
        stored
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    pub fn to_stored(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// ============== 폼 필드 ==============

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldRequest {
    #[validate(length(min = 1, max = 255, message = "Field label must be 1-255 characters."))]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// select/radio/checkbox 선택지
    pub options: Option<Vec<String>>,
}

impl From<FieldRequest> for NewField {
    fn from(req: FieldRequest) -> Self {
        NewField {
            label: req.label,
            field_type: req.field_type,
            required: req.required,
            options: req.options,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldResponse {
    pub id: i64,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub order: i32,
}

impl From<&form_field::Model> for FieldResponse {
    fn from(model: &form_field::Model) -> Self {
        Self {
            id: model.form_field_id,
            label: model.label.clone(),
            field_type: model.field_type,
            required: model.required,
            options: model.option_list(),
            order: model.order_index,
        }
    }
}

// ============== 폼 생성 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters."))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub fields: Vec<FieldRequest>,
    /// 생략하면 서버가 생성
    pub embed_code: Option<String>,
    pub styling: Option<FormStyling>,
}

// ============== 폼 수정 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters."))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub fields: Vec<FieldRequest>,
    pub styling: Option<FormStyling>,
    #[serde(default)]
    pub is_published: bool,
}

// ============== 폼 조회 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDetailResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldResponse>,
    pub styling: FormStyling,
    pub is_published: bool,
    pub embed_code: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&FormRecord> for FormDetailResponse {
    fn from(record: &FormRecord) -> Self {
        Self {
            id: record.form.form_id,
            title: record.form.title.clone(),
            description: record.form.description.clone(),
            fields: record.fields.iter().map(FieldResponse::from).collect(),
            styling: FormStyling::from_stored(record.form.styling.as_ref()),
            is_published: record.form.is_active,
            embed_code: record.primary_embed().map(|e| e.embed_code.clone()),
            created_at: record.form.created_at,
            updated_at: record.form.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormListItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub embed_code: Option<String>,
    pub submission_count: u64,
    pub created_at: NaiveDateTime,
}

impl From<FormSummary> for FormListItem {
    fn from(summary: FormSummary) -> Self {
        Self {
            id: summary.form.form_id,
            title: summary.form.title,
            description: summary.form.description,
            is_published: summary.form.is_active,
            embed_code: summary.embed_code,
            submission_count: summary.submission_count,
            created_at: summary.form.created_at,
        }
    }
}

// ============== 임베드 정보 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedInfoResponse {
    pub form_id: i64,
    pub title: String,
    pub embed_code: String,
    /// `{base}/embed/{code}`
    pub embed_url: String,
    /// `{base}/forms/{id}`
    pub form_url: String,
    pub embed_script: String,
    pub iframe_snippet: String,
    pub loader_snippet: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFormResponse {
    pub id: i64,
}

// ============== Swagger 응답 래퍼 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessFormDetailResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: FormDetailResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessFormListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<FormListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEmbedInfoResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: EmbedInfoResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDeleteFormResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: DeleteFormResponse,
}
