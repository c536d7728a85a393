pub mod config;
pub mod domain;
pub mod global;
pub mod state;
pub mod storage;
pub mod store;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

use crate::domain::file::dto::MAX_UPLOAD_BODY_BYTES;
use crate::storage::UPLOADS_PATH;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        domain::health::handler::health_check,
        domain::embed::handler::get_embedded_form,
        domain::embed::handler::get_public_form,
        domain::embed::handler::embed_script,
        domain::submission::handler::submit_form,
        domain::submission::handler::respond,
        domain::submission::handler::list_submissions,
        domain::chat::handler::list_messages,
        domain::chat::handler::post_message,
        domain::form::handler::create_form,
        domain::form::handler::list_forms,
        domain::form::handler::get_form,
        domain::form::handler::update_form,
        domain::form::handler::delete_form,
        domain::form::handler::get_embed_info,
        domain::prompt::handler::get_prompt,
        domain::prompt::handler::save_prompt,
        domain::company::handler::get_company,
        domain::company::handler::create_company,
        domain::company::handler::update_company,
        domain::company::handler::get_company_profile,
        domain::file::handler::list_files,
        domain::file::handler::upload_file,
        domain::file::handler::delete_files,
        domain::analytics::handler::get_analytics,
        domain::user::handler::get_user,
        domain::user::handler::upsert_user,
    ),
    components(
        schemas(
            domain::health::dto::HealthStatus,
            domain::health::dto::HealthState,
            domain::health::dto::HealthChecks,
            domain::health::dto::CheckResult,
            domain::form::entity::form_field::FieldType,
            domain::form::dto::FormStyling,
            domain::form::dto::FieldRequest,
            domain::form::dto::FieldResponse,
            domain::form::dto::CreateFormRequest,
            domain::form::dto::UpdateFormRequest,
            domain::form::dto::FormDetailResponse,
            domain::form::dto::FormListItem,
            domain::form::dto::EmbedInfoResponse,
            domain::form::dto::DeleteFormResponse,
            domain::form::dto::SuccessFormDetailResponse,
            domain::form::dto::SuccessFormListResponse,
            domain::form::dto::SuccessEmbedInfoResponse,
            domain::form::dto::SuccessDeleteFormResponse,
            domain::embed::dto::PublicFormResponse,
            domain::embed::dto::SuccessPublicFormResponse,
            domain::submission::entity::form_submission::UserResponse,
            domain::submission::dto::SubmitFormRequest,
            domain::submission::dto::SubmitFormResponse,
            domain::submission::dto::RespondRequest,
            domain::submission::dto::RespondResponse,
            domain::submission::dto::SubmissionItem,
            domain::submission::dto::SuccessSubmitFormResponse,
            domain::submission::dto::SuccessRespondResponse,
            domain::submission::dto::SuccessSubmissionListResponse,
            domain::chat::entity::form_chat::ChatSender,
            domain::chat::dto::PostChatRequest,
            domain::chat::dto::ChatMessageResponse,
            domain::chat::dto::PostChatResult,
            domain::chat::dto::SuccessChatListResponse,
            domain::chat::dto::SuccessPostChatResponse,
            domain::prompt::dto::SavePromptRequest,
            domain::prompt::dto::PromptResponse,
            domain::prompt::dto::SuccessPromptResponse,
            domain::company::dto::CompanyProfileRequest,
            domain::company::dto::CompanyResponse,
            domain::company::dto::CompanyProfileSummary,
            domain::company::dto::SuccessCompanyResponse,
            domain::company::dto::SuccessCompanyProfileSummary,
            domain::file::dto::CompanyFileResponse,
            domain::file::dto::DataUsage,
            domain::file::dto::FileListResponse,
            domain::file::dto::DeleteFilesResponse,
            domain::file::dto::UploadFileForm,
            domain::file::dto::SuccessFileListResponse,
            domain::file::dto::SuccessCompanyFileResponse,
            domain::file::dto::SuccessDeleteFilesResponse,
            domain::analytics::dto::AnalyticsStats,
            domain::analytics::dto::RecentSubmissionItem,
            domain::analytics::dto::TopFormItem,
            domain::analytics::dto::AnalyticsResponse,
            domain::analytics::dto::SuccessAnalyticsResponse,
            domain::user::dto::UpsertUserRequest,
            domain::user::dto::UserResponse,
            domain::user::dto::SuccessUserResponse,
            utils::response::ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "헬스체크"),
        (name = "Embed", description = "임베드 위젯 공개 API"),
        (name = "Submission", description = "폼 제출과 팔로업 응답"),
        (name = "Chat", description = "폼 채팅 세션"),
        (name = "Form", description = "폼 관리"),
        (name = "Prompt", description = "폼 AI 프롬프트"),
        (name = "Company", description = "회사 프로필"),
        (name = "CompanyFile", description = "회사 파일과 저장 용량"),
        (name = "Analytics", description = "대시보드 통계"),
        (name = "User", description = "사용자 동기화")
    )
)]
pub struct ApiDoc;

/// 애플리케이션 라우터 생성
pub fn create_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    // 위젯이 외부 사이트에서 호출하는 공개 API
    let public_routes = Router::new()
        .route("/embed.js", get(domain::embed::handler::embed_script))
        .route(
            "/api/embed/:embed_code",
            get(domain::embed::handler::get_embedded_form),
        )
        .route(
            "/api/public/forms/:form_id",
            get(domain::embed::handler::get_public_form),
        )
        .route(
            "/api/forms/submit/:embed_code",
            post(domain::submission::handler::submit_form),
        )
        .route("/api/ai/respond", post(domain::submission::handler::respond))
        .route(
            "/api/forms/:form_id/chat",
            get(domain::chat::handler::list_messages).post(domain::chat::handler::post_message),
        );

    // 대시보드 API (인증 필요)
    let dashboard_routes = Router::new()
        .route(
            "/api/forms",
            get(domain::form::handler::list_forms).post(domain::form::handler::create_form),
        )
        .route(
            "/api/forms/:form_id",
            get(domain::form::handler::get_form)
                .put(domain::form::handler::update_form)
                .delete(domain::form::handler::delete_form),
        )
        .route(
            "/api/forms/:form_id/embed",
            get(domain::form::handler::get_embed_info),
        )
        .route(
            "/api/forms/:form_id/submissions",
            get(domain::submission::handler::list_submissions),
        )
        .route(
            "/api/forms/:form_id/prompt",
            get(domain::prompt::handler::get_prompt).post(domain::prompt::handler::save_prompt),
        )
        .route(
            "/api/company",
            get(domain::company::handler::get_company)
                .post(domain::company::handler::create_company)
                .put(domain::company::handler::update_company),
        )
        .route(
            "/api/company/profile",
            get(domain::company::handler::get_company_profile),
        )
        .route(
            "/api/company/files",
            get(domain::file::handler::list_files)
                .post(domain::file::handler::upload_file)
                .delete(domain::file::handler::delete_files)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/analytics", get(domain::analytics::handler::get_analytics))
        .route(
            "/api/users",
            get(domain::user::handler::get_user).post(domain::user::handler::upsert_user),
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(domain::health::health_check))
        .merge(public_routes)
        .merge(dashboard_routes)
        .nest_service(UPLOADS_PATH, uploads)
        .layer(middleware::from_fn(global::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
