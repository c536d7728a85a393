use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use validator::Validate;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{
    ChatMessageResponse, ChatQuery, PostChatRequest, PostChatResult, SuccessChatListResponse,
    SuccessPostChatResponse,
};
use super::service::ChatService;

/// 채팅 메시지 목록 조회 API
#[utoipa::path(
    get,
    path = "/api/forms/{form_id}/chat",
    params(
        ("form_id" = i64, Path, description = "폼 ID"),
        ChatQuery
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessChatListResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Chat"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<ChatQuery>, QueryRejection>,
) -> Result<Json<BaseResponse<Vec<ChatMessageResponse>>>, AppError> {
    let Path(form_id) = path?;
    let Query(query) = query?;
    let session_id = query.session_id();

    let result = ChatService::list_messages(&state, form_id, &session_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 채팅 메시지 전송 API
///
/// `sender`가 `user`이면 AI 답변까지 생성해 `[user, ai]` 배열을 반환합니다.
/// AI 답변에 실패하면 `AI2001` 코드와 함께 `[user]`만 반환합니다.
#[utoipa::path(
    post,
    path = "/api/forms/{form_id}/chat",
    params(
        ("form_id" = i64, Path, description = "폼 ID")
    ),
    request_body = PostChatRequest,
    responses(
        (status = 200, description = "전송 성공", body = SuccessPostChatResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 404, description = "폼 없음", body = ErrorResponse)
    ),
    tag = "Chat"
)]
pub async fn post_message(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostChatRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<PostChatResult>>, AppError> {
    let Path(form_id) = path?;
    let Json(req) = payload?;
    req.validate()?;

    let (result, outcome) = ChatService::post_message(&state, form_id, req).await?;

    Ok(Json(outcome.envelope(result)))
}
