use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use tracing::{error, warn};

use super::response::ErrorResponse;
use crate::storage::BlobError;

/// 클라이언트에 노출되는 서버 오류 메시지
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// 애플리케이션 전역 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    /// 업로드가 회사의 데이터 허용량을 넘는 경우
    #[error("{0}")]
    QuotaExceeded(String),
    /// 언어 모델 호출 실패 (타임아웃, API 오류, 비정상 응답)
    #[error("AI provider unavailable: {0}")]
    AiUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("invalid request body: {0}")]
    JsonParseFailed(String),
}

impl AppError {
    /// 클라이언트에 반환할 메시지
    ///
    /// 내부 오류의 상세 내용은 로그에만 남기고 클라이언트에는 일반 메시지를 보냅니다.
    pub fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::QuotaExceeded(msg) => msg.clone(),
            AppError::AiUnavailable(_) => "AI reply is temporarily unavailable".to_string(),
            AppError::InternalError(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::JsonParseFailed(msg) => format!("Invalid request body: {}", msg),
        }
    }

    /// 에러 코드 반환
    pub fn error_code(&self) -> String {
        match self {
            AppError::BadRequest(_) => "COMMON400",
            AppError::NotFound(_) => "COMMON404",
            AppError::Unauthorized(_) => "AUTH4001",
            AppError::Conflict(_) => "COMMON409",
            AppError::QuotaExceeded(_) => "FILE4131",
            AppError::AiUnavailable(_) => "AI5031",
            AppError::InternalError(_) => "COMMON500",
            AppError::ValidationError(_) => "COMMON400",
            AppError::JsonParseFailed(_) => "COMMON400",
        }
        .to_string()
    }

    /// HTTP 상태 코드 반환
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::QuotaExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::AiUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::JsonParseFailed(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.message();

        // 에러 로깅
        match &self {
            AppError::InternalError(detail) => {
                error!(code = %error_code, detail = %detail, "Internal Server Error");
            }
            AppError::AiUnavailable(detail) => {
                error!(code = %error_code, detail = %detail, "AI provider failure surfaced");
            }
            _ => {
                warn!(code = %error_code, "Request rejected: {}", message);
            }
        }

        let error_response = ErrorResponse::new(error_code, message);

        (status, Json(error_response)).into_response()
    }
}

/// JsonRejection을 AppError로 변환
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::JsonParseFailed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// 편의 함수들
impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        AppError::InternalError(msg.into())
    }

    pub fn validation_error(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn should_map_quota_exceeded_to_413() {
        let error = AppError::QuotaExceeded("Upload exceeds data allowance.".into());

        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error.error_code(), "FILE4131");
    }

    #[test]
    fn should_hide_internal_details_from_client() {
        let error = AppError::internal_error("Connection refused (os error 111)");

        assert_eq!(error.message(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn should_convert_db_error_to_internal_error() {
        let error: AppError = DbErr::Custom("boom".into()).into();

        assert!(matches!(error, AppError::InternalError(_)));
    }

    #[tokio::test]
    async fn should_render_error_envelope() {
        // Arrange
        let error = AppError::not_found("Form not found or not published");

        // Act
        let response = error.into_response();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["isSuccess"], false);
        assert_eq!(json["code"], "COMMON404");
        assert_eq!(json["message"], "Form not found or not published");
        assert!(json["result"].is_null());
    }
}
