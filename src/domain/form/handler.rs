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

use super::dto::{
    CreateFormRequest, DeleteFormResponse, EmbedInfoResponse, FormDetailResponse, FormListItem,
    SuccessDeleteFormResponse, SuccessEmbedInfoResponse, SuccessFormDetailResponse,
    SuccessFormListResponse, UpdateFormRequest,
};
use super::service::FormService;

/// 폼 생성 API
///
/// 필드와 임베드 코드를 함께 생성합니다. 폼은 게시 상태로 시작합니다.
#[utoipa::path(
    post,
    path = "/api/forms",
    request_body = CreateFormRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "폼 생성 성공", body = SuccessFormDetailResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 409, description = "임베드 코드 중복", body = ErrorResponse)
    ),
    tag = "Form"
)]
pub async fn create_form(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateFormRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<FormDetailResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let result = FormService::create_form(&state, &user, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Form created.",
    )))
}

/// 내 폼 목록 조회 API
#[utoipa::path(
    get,
    path = "/api/forms",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessFormListResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "Form"
)]
pub async fn list_forms(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<FormListItem>>>, AppError> {
    let result = FormService::list_forms(&state, &user).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 폼 상세 조회 API
#[utoipa::path(
    get,
    path = "/api/forms/{form_id}",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessFormDetailResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Form"
)]
pub async fn get_form(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BaseResponse<FormDetailResponse>>, AppError> {
    let Path(form_id) = path?;

    let result = FormService::get_form(&state, &user, form_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 폼 수정 API
///
/// 제목/설명/스타일/게시 여부를 덮어쓰고 필드를 전부 교체합니다.
#[utoipa::path(
    put,
    path = "/api/forms/{form_id}",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    request_body = UpdateFormRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "수정 성공", body = SuccessFormDetailResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Form"
)]
pub async fn update_form(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateFormRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<FormDetailResponse>>, AppError> {
    let Path(form_id) = path?;
    let Json(req) = payload?;
    req.validate()?;

    let result = FormService::update_form(&state, &user, form_id, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Form updated.",
    )))
}

/// 폼 삭제 API
#[utoipa::path(
    delete,
    path = "/api/forms/{form_id}",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "삭제 성공", body = SuccessDeleteFormResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Form"
)]
pub async fn delete_form(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BaseResponse<DeleteFormResponse>>, AppError> {
    let Path(form_id) = path?;

    let result = FormService::delete_form(&state, &user, form_id).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Form deleted.",
    )))
}

/// 임베드 코드 조회 API
///
/// 대시보드에서 복사할 인라인 스크립트, iframe 태그, `/embed.js` 스니펫을 반환합니다.
#[utoipa::path(
    get,
    path = "/api/forms/{form_id}/embed",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessEmbedInfoResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "폼 또는 임베드 없음", body = ErrorResponse)
    ),
    tag = "Form"
)]
pub async fn get_embed_info(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BaseResponse<EmbedInfoResponse>>, AppError> {
    let Path(form_id) = path?;

    let result = FormService::embed_info(&state, &user, form_id).await?;

    Ok(Json(BaseResponse::success(result)))
}
