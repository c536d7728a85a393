use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{
    CompanyProfileRequest, CompanyProfileSummary, CompanyResponse, SuccessCompanyProfileSummary,
    SuccessCompanyResponse,
};
use super::service::CompanyService;

/// 내 회사 조회 API
#[utoipa::path(
    get,
    path = "/api/company",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessCompanyResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "회사 없음", body = ErrorResponse)
    ),
    tag = "Company"
)]
pub async fn get_company(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<CompanyResponse>>, AppError> {
    let result = CompanyService::get_company(&state, &user).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 회사 생성 API (온보딩)
#[utoipa::path(
    post,
    path = "/api/company",
    request_body = CompanyProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "생성 성공", body = SuccessCompanyResponse),
        (status = 400, description = "잘못된 요청 또는 이미 존재", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "사용자 없음", body = ErrorResponse)
    ),
    tag = "Company"
)]
pub async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CompanyProfileRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<CompanyResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let result = CompanyService::create_company(&state, &user, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Company created.",
    )))
}

/// 회사 프로필 수정 API
#[utoipa::path(
    put,
    path = "/api/company",
    request_body = CompanyProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "수정 성공", body = SuccessCompanyResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "회사 없음", body = ErrorResponse)
    ),
    tag = "Company"
)]
pub async fn update_company(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CompanyProfileRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<CompanyResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let result = CompanyService::update_company(&state, &user, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 회사 요약 프로필 조회 API
#[utoipa::path(
    get,
    path = "/api/company/profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessCompanyProfileSummary),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "회사 없음", body = ErrorResponse)
    ),
    tag = "Company"
)]
pub async fn get_company_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<CompanyProfileSummary>>, AppError> {
    let result = CompanyService::get_profile(&state, &user).await?;

    Ok(Json(BaseResponse::success(result)))
}
