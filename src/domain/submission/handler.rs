use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::HeaderMap,
    Json,
};

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{
    ClientMeta, RespondRequest, RespondResponse, SubmissionItem, SubmitFormRequest,
    SubmitFormResponse, SuccessRespondResponse, SuccessSubmissionListResponse,
    SuccessSubmitFormResponse,
};
use super::service::SubmissionService;

/// 폼 제출 API
///
/// 임베드 위젯에서 호출합니다. 프롬프트가 설정된 폼이면 AI 답변을 함께 반환하며,
/// 답변 생성에 실패하면 `AI2001` 코드와 함께 `aiResponse: null`을 반환합니다.
#[utoipa::path(
    post,
    path = "/api/forms/submit/{embed_code}",
    params(
        ("embed_code" = String, Path, description = "임베드 코드")
    ),
    request_body = SubmitFormRequest,
    responses(
        (status = 200, description = "제출 성공 (AI 답변 실패 시 code = AI2001)", body = SuccessSubmitFormResponse),
        (status = 400, description = "잘못된 제출 데이터", body = ErrorResponse),
        (status = 404, description = "폼 없음 또는 비공개", body = ErrorResponse)
    ),
    tag = "Submission"
)]
pub async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<SubmitFormRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<SubmitFormResponse>>, AppError> {
    let Path(embed_code) = path?;
    let Json(req) = payload?;

    let (result, outcome) = SubmissionService::submit(
        &state,
        &embed_code,
        req.submission_data,
        ClientMeta::from_headers(&headers),
    )
    .await?;

    Ok(Json(outcome.envelope(result)))
}

/// 예/아니오 응답 API
///
/// 제출 후 위젯의 "더 안내받으시겠어요?" 질문에 대한 응답을 기록합니다.
#[utoipa::path(
    post,
    path = "/api/ai/respond",
    request_body = RespondRequest,
    responses(
        (status = 200, description = "응답 기록 성공", body = SuccessRespondResponse),
        (status = 400, description = "잘못된 응답 값", body = ErrorResponse),
        (status = 404, description = "제출 없음", body = ErrorResponse)
    ),
    tag = "Submission"
)]
pub async fn respond(
    State(state): State<AppState>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<RespondResponse>>, AppError> {
    let Json(req) = payload?;

    let result = SubmissionService::respond(&state, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 폼 제출 목록 조회 API
#[utoipa::path(
    get,
    path = "/api/forms/{form_id}/submissions",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessSubmissionListResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Submission"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BaseResponse<Vec<SubmissionItem>>>, AppError> {
    let Path(form_id) = path?;

    let result = SubmissionService::list_submissions(&state, &user, form_id).await?;

    Ok(Json(BaseResponse::success(result)))
}
