use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::form::dto::{FieldResponse, FormStyling};
use crate::store::FormRecord;

/// 위젯/공개 페이지가 렌더링하는 폼
///
/// 소유자 정보와 통계는 포함하지 않습니다.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicFormResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldResponse>,
    pub styling: FormStyling,
    pub embed_code: Option<String>,
}

impl From<&FormRecord> for PublicFormResponse {
    fn from(record: &FormRecord) -> Self {
        Self {
            id: record.form.form_id,
            title: record.form.title.clone(),
            description: record.form.description.clone(),
            fields: record.fields.iter().map(FieldResponse::from).collect(),
            styling: FormStyling::from_stored(record.form.styling.as_ref()),
            embed_code: record.primary_embed().map(|e| e.embed_code.clone()),
        }
    }
}

/// `/embed.js?id=` 쿼리
#[derive(Debug, Deserialize, IntoParams)]
pub struct EmbedScriptQuery {
    /// 폼 ID
    pub id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPublicFormResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: PublicFormResponse,
}
