//! 영속 데이터 접근 계층
//!
//! 서비스 계층은 `DataSource` 트레이트만 바라보며, 실제 구현은 시작 시 한 번 선택됩니다.
//! - `SeaOrmDataSource`: MySQL (운영)
//! - `FixtureDataSource`: 메모리 기반 데모/테스트 데이터

pub mod database;
pub mod fixture;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::prelude::Json;

use crate::domain::chat::entity::form_chat::{self, ChatSender};
use crate::domain::company::entity::{company, company_file};
use crate::domain::form::entity::form_field::FieldType;
use crate::domain::form::entity::{embed, form, form_field, form_prompt};
use crate::domain::submission::entity::form_submission::{self, UserResponse};
use crate::domain::user::entity::user;
use crate::utils::error::AppError;

pub use database::SeaOrmDataSource;
pub use fixture::FixtureDataSource;

/// 사용자 생성/갱신 입력
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

/// 회사 프로필 입력
///
/// `None`인 필드는 갱신 시 기존 값을 유지합니다.
#[derive(Debug, Clone, Default)]
pub struct CompanyProfile {
    pub name: Option<String>,
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

impl CompanyProfile {
    /// 지정된 필드만 모델에 반영
    pub fn apply(self, model: &mut company::Model) {
        if let Some(name) = self.name {
            model.name = name;
        }
        fn merge(target: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *target = value;
            }
        }
        merge(&mut model.website, self.website);
        merge(&mut model.business_type, self.business_type);
        merge(&mut model.product_description, self.product_description);
        merge(&mut model.target_audience, self.target_audience);
        merge(&mut model.main_contact_goal, self.main_contact_goal);
        merge(&mut model.preferred_tone, self.preferred_tone);
        merge(&mut model.keywords, self.keywords);
        merge(&mut model.common_questions, self.common_questions);
        merge(&mut model.value_offers, self.value_offers);
        merge(&mut model.follow_up_style, self.follow_up_style);
    }

    /// 새 회사 레코드 생성 (사용량 0)
    pub fn into_new_company(
        self,
        user_id: i64,
        max_data_allowance: f64,
        now: NaiveDateTime,
    ) -> company::Model {
        let mut model = company::Model {
            company_id: 0,
            user_id,
            name: String::new(),
            website: None,
            business_type: None,
            product_description: None,
            target_audience: None,
            main_contact_goal: None,
            preferred_tone: None,
            keywords: None,
            common_questions: None,
            value_offers: None,
            follow_up_style: None,
            data_usage: 0.0,
            max_data_allowance,
            created_at: now,
            updated_at: now,
        };
        self.apply(&mut model);
        model
    }
}

/// 폼 필드 입력 (배열 순서가 곧 표시 순서)
#[derive(Debug, Clone)]
pub struct NewField {
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Option<Vec<String>>,
}

impl NewField {
    pub fn serialized_options(&self) -> Option<String> {
        self.options
            .as_ref()
            .and_then(|options| serde_json::to_string(options).ok())
    }
}

/// 폼 생성 입력
#[derive(Debug, Clone)]
pub struct NewForm {
    pub owner_id: String,
    pub company_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub styling: Option<Json>,
    pub fields: Vec<NewField>,
    pub embed_code: String,
    pub embed_url: String,
}

/// 폼 수정 입력. 필드 목록은 통째로 교체됩니다.
#[derive(Debug, Clone)]
pub struct FormUpdate {
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub styling: Option<Json>,
    pub fields: Vec<NewField>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub form_id: i64,
    pub data: Json,
    pub ip: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub form_id: i64,
    pub session_id: String,
    pub sender: ChatSender,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NewCompanyFile {
    pub name: String,
    pub url: String,
    /// MB
    pub size: f64,
}

/// 폼과 정렬된 필드, 임베드 목록
#[derive(Debug, Clone)]
pub struct FormRecord {
    pub form: form::Model,
    /// `order_index` 오름차순
    pub fields: Vec<form_field::Model>,
    /// 생성 순
    pub embeds: Vec<embed::Model>,
}

impl FormRecord {
    /// 외부에 노출하는 임베드 (첫 번째)
    pub fn primary_embed(&self) -> Option<&embed::Model> {
        self.embeds.first()
    }
}

/// 대시보드 폼 목록 항목
#[derive(Debug, Clone)]
pub struct FormSummary {
    pub form: form::Model,
    pub embed_code: Option<String>,
    pub submission_count: u64,
}

#[derive(Debug, Clone)]
pub struct RecentSubmission {
    pub form_title: String,
    pub submitted_at: NaiveDateTime,
    pub has_ai_response: bool,
}

#[derive(Debug, Clone)]
pub struct FormSubmissionCount {
    pub title: String,
    pub submissions: u64,
}

/// 소유자 기준 대시보드 집계
#[derive(Debug, Clone, Default)]
pub struct AnalyticsSnapshot {
    pub total_forms: u64,
    pub total_submissions: u64,
    /// AI 답변이 붙은 제출 수 + AI 채팅 메시지 수
    pub ai_interactions: u64,
    pub user_responses: u64,
    pub recent_submissions: Vec<RecentSubmission>,
    pub top_forms: Vec<FormSubmissionCount>,
}

/// 데이터 소스 추상화
///
/// 여러 레코드를 건드리는 쓰기(폼 수정/삭제, 업로드 기록, 파일 삭제)는 구현체 안에서
/// 원자적으로 처리됩니다.
#[async_trait]
pub trait DataSource: Send + Sync {
    // ===== 사용자 =====
    async fn find_user_by_external_id(&self, external_id: &str)
        -> Result<Option<user::Model>, AppError>;
    async fn upsert_user(&self, input: NewUser) -> Result<user::Model, AppError>;

    // ===== 회사 =====
    async fn find_company_by_user(&self, user_id: i64) -> Result<Option<company::Model>, AppError>;
    async fn find_company(&self, company_id: i64) -> Result<Option<company::Model>, AppError>;
    async fn create_company(
        &self,
        user_id: i64,
        profile: CompanyProfile,
        max_data_allowance: f64,
    ) -> Result<company::Model, AppError>;
    async fn update_company(
        &self,
        company_id: i64,
        profile: CompanyProfile,
    ) -> Result<company::Model, AppError>;

    // ===== 폼 =====
    /// 폼, 필드, 임베드를 한 번에 생성합니다. 임베드 코드 중복 시 `Conflict`.
    async fn create_form(&self, input: NewForm) -> Result<FormRecord, AppError>;
    async fn list_forms(&self, owner_id: &str) -> Result<Vec<FormSummary>, AppError>;
    async fn find_form(&self, form_id: i64) -> Result<Option<FormRecord>, AppError>;
    /// 활성 폼만 반환합니다.
    async fn find_active_form_by_embed_code(
        &self,
        embed_code: &str,
    ) -> Result<Option<FormRecord>, AppError>;
    async fn update_form(&self, form_id: i64, input: FormUpdate) -> Result<FormRecord, AppError>;
    /// 필드, 임베드, 프롬프트, 제출, 채팅까지 함께 삭제합니다.
    async fn delete_form(&self, form_id: i64) -> Result<(), AppError>;

    // ===== 프롬프트 =====
    async fn find_prompt(&self, form_id: i64) -> Result<Option<form_prompt::Model>, AppError>;
    /// `None`은 기존 값 유지를 뜻합니다.
    async fn upsert_prompt(
        &self,
        form_id: i64,
        prompt: Option<String>,
        context: Option<String>,
    ) -> Result<form_prompt::Model, AppError>;

    // ===== 제출 =====
    async fn create_submission(
        &self,
        input: NewSubmission,
    ) -> Result<form_submission::Model, AppError>;
    async fn find_submission(
        &self,
        submission_id: i64,
    ) -> Result<Option<form_submission::Model>, AppError>;
    async fn update_submission_data(&self, submission_id: i64, data: Json)
        -> Result<(), AppError>;
    /// 제출이 없으면 `None`
    async fn record_user_response(
        &self,
        submission_id: i64,
        response: UserResponse,
    ) -> Result<Option<form_submission::Model>, AppError>;
    /// 최신순
    async fn list_submissions(&self, form_id: i64)
        -> Result<Vec<form_submission::Model>, AppError>;

    // ===== 채팅 =====
    async fn append_chat_message(&self, input: NewChatMessage)
        -> Result<form_chat::Model, AppError>;
    /// 생성 시각 오름차순, 동률이면 ID 순
    async fn list_chat_messages(
        &self,
        form_id: i64,
        session_id: &str,
    ) -> Result<Vec<form_chat::Model>, AppError>;

    // ===== 파일 원장 =====
    /// 삭제되지 않은 파일, 최신순
    async fn list_company_files(&self, company_id: i64)
        -> Result<Vec<company_file::Model>, AppError>;
    /// 허용량 검사, 사용량 증가, 파일 기록을 하나의 원자적 단위로 처리합니다.
    /// 허용량을 넘으면 `QuotaExceeded`이며 아무것도 기록되지 않습니다.
    async fn record_upload(
        &self,
        company_id: i64,
        input: NewCompanyFile,
    ) -> Result<company_file::Model, AppError>;
    /// 삭제 표시와 사용량 차감을 함께 처리하고 삭제된 파일을 반환합니다.
    async fn soft_delete_file(
        &self,
        company_id: i64,
        file_id: i64,
    ) -> Result<company_file::Model, AppError>;
    /// 모든 파일을 삭제 표시하고 사용량을 0으로 되돌립니다.
    async fn soft_delete_all_files(&self, company_id: i64)
        -> Result<Vec<company_file::Model>, AppError>;

    // ===== 통계 =====
    async fn analytics(
        &self,
        owner_id: &str,
        recent_limit: usize,
        top_limit: usize,
    ) -> Result<AnalyticsSnapshot, AppError>;

    /// 헬스체크용 연결 확인
    async fn ping(&self) -> Result<(), AppError>;
}

/// 업로드 후 사용량이 허용량을 넘는지 여부
pub fn exceeds_allowance(data_usage: f64, size: f64, max_data_allowance: f64) -> bool {
    data_usage + size > max_data_allowance
}

pub(crate) const QUOTA_EXCEEDED_MESSAGE: &str =
    "Upload exceeds your data allowance. Delete some files or upgrade your plan.";
