use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{PromptResponse, SavePromptRequest, SuccessPromptResponse};
use super::service::PromptService;

/// 폼 프롬프트 조회 API
#[utoipa::path(
    get,
    path = "/api/forms/{form_id}/prompt",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessPromptResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Prompt"
)]
pub async fn get_prompt(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BaseResponse<PromptResponse>>, AppError> {
    let Path(form_id) = path?;

    let result = PromptService::get_prompt(&state, &user, form_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 폼 프롬프트 저장 API
#[utoipa::path(
    post,
    path = "/api/forms/{form_id}/prompt",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    request_body = SavePromptRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "저장 성공", body = SuccessPromptResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Prompt"
)]
pub async fn save_prompt(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SavePromptRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<PromptResponse>>, AppError> {
    let Path(form_id) = path?;
    let Json(req) = payload?;
    req.validate()?;

    let result = PromptService::save_prompt(&state, &user, form_id, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Prompt saved.",
    )))
}
