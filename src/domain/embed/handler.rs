use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{EmbedScriptQuery, PublicFormResponse, SuccessPublicFormResponse};
use super::script::{is_script_safe_id, loader_script};
use super::service::EmbedService;

/// 임베드 코드로 공개 폼 조회 API
///
/// 위젯이 렌더링할 폼 정의를 반환합니다. 비활성 폼은 404입니다.
#[utoipa::path(
    get,
    path = "/api/embed/{embed_code}",
    params(
        ("embed_code" = String, Path, description = "임베드 코드")
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessPublicFormResponse),
        (status = 404, description = "폼 없음 또는 비공개", body = ErrorResponse)
    ),
    tag = "Embed"
)]
pub async fn get_embedded_form(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<BaseResponse<PublicFormResponse>>, AppError> {
    let Path(embed_code) = path?;

    let result = EmbedService::public_form_by_code(&state, &embed_code).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 폼 ID로 공개 폼 조회 API
///
/// `/embed.js`가 띄우는 iframe 페이지에서 사용합니다.
#[utoipa::path(
    get,
    path = "/api/public/forms/{form_id}",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessPublicFormResponse),
        (status = 404, description = "폼 없음 또는 비공개", body = ErrorResponse)
    ),
    tag = "Embed"
)]
pub async fn get_public_form(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BaseResponse<PublicFormResponse>>, AppError> {
    let Path(form_id) = path?;

    let result = EmbedService::public_form_by_id(&state, form_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 임베드 로더 스크립트
///
/// 외부 사이트가 `<script src="/embed.js?id=...">`로 불러오는 JavaScript를 반환합니다.
#[utoipa::path(
    get,
    path = "/embed.js",
    params(EmbedScriptQuery),
    responses(
        (status = 200, description = "로더 스크립트", content_type = "application/javascript", body = String),
        (status = 400, description = "폼 ID 누락", content_type = "text/plain", body = String)
    ),
    tag = "Embed"
)]
pub async fn embed_script(
    State(state): State<AppState>,
    query: Result<Query<EmbedScriptQuery>, QueryRejection>,
) -> Response {
    let form_id = query
        .ok()
        .and_then(|Query(q)| q.id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let Some(form_id) = form_id else {
        return (StatusCode::BAD_REQUEST, "Missing form ID").into_response();
    };

    // 스크립트 본문에 그대로 들어가므로 안전한 문자만 허용
    if !is_script_safe_id(&form_id) {
        warn!(form_id = %form_id, "Rejected unsafe form id for embed script");
        return (StatusCode::BAD_REQUEST, "Invalid form ID").into_response();
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        loader_script(&form_id, &state.config.app_base_url),
    )
        .into_response()
}
