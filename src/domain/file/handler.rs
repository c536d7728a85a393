use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::QueryRejection,
        Multipart, Query, State,
    },
    Json,
};

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{
    CompanyFileResponse, DeleteFileQuery, DeleteFilesResponse, FileListResponse,
    SuccessCompanyFileResponse, SuccessDeleteFilesResponse, SuccessFileListResponse,
    UploadFileForm,
};
use super::service::{DeleteTarget, FileService, UploadedFile};

/// multipart 필드 이름
const FILE_FIELD: &str = "file";

/// 회사 파일 목록 조회 API
#[utoipa::path(
    get,
    path = "/api/company/files",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessFileListResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "CompanyFile"
)]
pub async fn list_files(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<FileListResponse>>, AppError> {
    let result = FileService::list_files(&state, &user).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 회사 파일 업로드 API
///
/// 허용량을 넘는 업로드는 413으로 거절되며 아무것도 저장되지 않습니다.
#[utoipa::path(
    post,
    path = "/api/company/files",
    request_body(content = UploadFileForm, content_type = "multipart/form-data"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "업로드 성공", body = SuccessCompanyFileResponse),
        (status = 400, description = "파일 누락", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "회사 없음", body = ErrorResponse),
        (status = 413, description = "허용량 초과", body = ErrorResponse)
    ),
    tag = "CompanyFile"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BaseResponse<CompanyFileResponse>>, AppError> {
    let mut multipart = multipart?;

    let mut uploaded = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        uploaded = Some(UploadedFile { name, bytes });
        break;
    }
    let file = uploaded.ok_or_else(|| AppError::bad_request("No file provided"))?;

    let result = FileService::upload(&state, &user, file).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "File uploaded.",
    )))
}

/// 회사 파일 삭제 API
///
/// `?id=`로 단건, `?all=true`로 전체를 삭제합니다.
#[utoipa::path(
    delete,
    path = "/api/company/files",
    params(DeleteFileQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "삭제 성공", body = SuccessDeleteFilesResponse),
        (status = 400, description = "삭제 대상 누락", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "회사 또는 파일 없음", body = ErrorResponse)
    ),
    tag = "CompanyFile"
)]
pub async fn delete_files(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<DeleteFileQuery>, QueryRejection>,
) -> Result<Json<BaseResponse<DeleteFilesResponse>>, AppError> {
    let Query(query) = query?;

    let target = match (query.all, query.id) {
        (Some(true), _) => DeleteTarget::All,
        (_, Some(id)) => DeleteTarget::One(id),
        _ => return Err(AppError::bad_request("Missing file ID or 'all' parameter")),
    };

    let message = match target {
        DeleteTarget::All => "All files deleted successfully",
        DeleteTarget::One(_) => "File deleted successfully",
    };
    let result = FileService::delete(&state, &user, target).await?;

    Ok(Json(BaseResponse::success_with_message(result, message)))
}
