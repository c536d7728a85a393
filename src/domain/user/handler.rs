use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{SuccessUserResponse, UpsertUserRequest, UserQuery, UserResponse};
use super::service::UserService;

/// 사용자 조회 API
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessUserResponse),
        (status = 400, description = "external_id 누락", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "사용자 없음", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<BaseResponse<UserResponse>>, AppError> {
    let Query(query) = query?;

    let result = UserService::find_user(&state, &user, query.external_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 사용자 동기화 API
///
/// ID 공급자의 사용자 정보를 로컬에 반영하고 마지막 로그인 시각을 갱신합니다.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UpsertUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "동기화 성공", body = SuccessUserResponse),
        (status = 400, description = "필수 값 누락", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn upsert_user(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<UpsertUserRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<UserResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let result = UserService::upsert_user(&state, &user, req).await?;

    Ok(Json(BaseResponse::success(result)))
}
