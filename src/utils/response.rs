use serde::Serialize;
use utoipa::ToSchema;

/// 성공 응답 코드
pub const SUCCESS_CODE: &str = "COMMON200";

/// AI 응답 없이 처리된 경우의 응답 코드
///
/// 요청 자체는 성공했지만 언어 모델 호출이 실패해 AI 답변이 빠진 경우 사용합니다.
pub const AI_UNAVAILABLE_CODE: &str = "AI2001";

/// API 명세에 맞는 기본 응답 구조체
///
/// 형식:
/// ```json
/// {
///   "isSuccess": true,
///   "code": "COMMON200",
///   "message": "Success",
///   "result": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse<T: Serialize> {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Option<T>,
}

impl<T: Serialize> BaseResponse<T> {
    /// 성공 응답 생성
    pub fn success(result: T) -> Self {
        Self {
            is_success: true,
            code: SUCCESS_CODE.to_string(),
            message: "Success".to_string(),
            result: Some(result),
        }
    }

    /// 성공 응답 생성 (메시지 지정)
    pub fn success_with_message(result: T, message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            code: SUCCESS_CODE.to_string(),
            message: message.into(),
            result: Some(result),
        }
    }

    /// AI 답변 없이 저장만 완료된 응답 생성
    pub fn ai_unavailable(result: T) -> Self {
        Self {
            is_success: true,
            code: AI_UNAVAILABLE_CODE.to_string(),
            message: "Saved, but the AI reply is unavailable".to_string(),
            result: Some(result),
        }
    }
}

/// 에러 응답 구조체
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Option<()>,
}

impl ErrorResponse {
    /// 에러 응답 생성
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            code: code.into(),
            message: message.into(),
            result: None,
        }
    }
}
