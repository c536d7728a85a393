use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::company;
use crate::store::CompanyProfile;

/// 회사 프로필 입력
///
/// 생략한 필드는 기존 값을 유지합니다. 프롬프트 저장 요청에도 평탄화되어 포함됩니다.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileRequest {
    #[validate(length(min = 1, max = 255, message = "Company name must be 1-255 characters."))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Website must be at most 255 characters."))]
    pub website: Option<String>,
    pub business_type: Option<String>,
    pub product_description: Option<String>,
    pub target_audience: Option<String>,
    pub main_contact_goal: Option<String>,
    pub preferred_tone: Option<String>,
    pub keywords: Option<String>,
    pub common_questions: Option<String>,
    pub value_offers: Option<String>,
    pub follow_up_style: Option<String>,
}

impl CompanyProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.website.is_none()
            && self.business_type.is_none()
            && self.product_description.is_none()
            && self.target_audience.is_none()
            && self.main_contact_goal.is_none()
            && self.preferred_tone.is_none()
            && self.keywords.is_none()
            && self.common_questions.is_none()
            && self.value_offers.is_none()
            && self.follow_up_style.is_none()
    }
}

impl From<CompanyProfileRequest> for CompanyProfile {
    fn from(req: CompanyProfileRequest) -> Self {
        CompanyProfile {
            name: req.name.map(|name| name.trim().to_string()),
            website: req.website,
            business_type: req.business_type,
            product_description: req.product_description,
            target_audience: req.target_audience,
            main_contact_goal: req.main_contact_goal,
            preferred_tone: req.preferred_tone,
            keywords: req.keywords,
            common_questions: req.common_questions,
            value_offers: req.value_offers,
            follow_up_style: req.follow_up_style,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub company_id: i64,
    pub name: String,
    pub website: Option<String>,
    pub business_type: Option<String>,
    pub product_description: Option<String>,
    pub target_audience: Option<String>,
    pub main_contact_goal: Option<String>,
    pub preferred_tone: Option<String>,
    pub keywords: Option<String>,
    pub common_questions: Option<String>,
    pub value_offers: Option<String>,
    pub follow_up_style: Option<String>,
    /// MB
    pub data_usage: f64,
    /// MB
    pub max_data_allowance: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<company::Model> for CompanyResponse {
    fn from(model: company::Model) -> Self {
        Self {
            company_id: model.company_id,
            name: model.name,
            website: model.website,
            business_type: model.business_type,
            product_description: model.product_description,
            target_audience: model.target_audience,
            main_contact_goal: model.main_contact_goal,
            preferred_tone: model.preferred_tone,
            keywords: model.keywords,
            common_questions: model.common_questions,
            value_offers: model.value_offers,
            follow_up_style: model.follow_up_style,
            data_usage: model.data_usage,
            max_data_allowance: model.max_data_allowance,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// 대시보드 헤더용 요약 프로필. 값이 없으면 빈 문자열.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileSummary {
    pub name: String,
    pub product_description: String,
    pub target_audience: String,
}

impl From<company::Model> for CompanyProfileSummary {
    fn from(model: company::Model) -> Self {
        Self {
            name: model.name,
            product_description: model.product_description.unwrap_or_default(),
            target_audience: model.target_audience.unwrap_or_default(),
        }
    }
}

// ============== Swagger 응답 래퍼 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessCompanyResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: CompanyResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessCompanyProfileSummary {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: CompanyProfileSummary,
}
