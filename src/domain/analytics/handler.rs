use axum::{extract::State, Json};

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{AnalyticsResponse, SuccessAnalyticsResponse};
use super::service::AnalyticsService;

/// 대시보드 통계 API
///
/// 내 폼 기준 총계, 최근 제출 10건, 제출 수 상위 5개 폼을 반환합니다.
#[utoipa::path(
    get,
    path = "/api/analytics",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessAnalyticsResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<AnalyticsResponse>>, AppError> {
    let result = AnalyticsService::dashboard(&state, &user).await?;

    Ok(Json(BaseResponse::success(result)))
}
