use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::company::entity::company_file;

/// 업로드 요청 본문 최대 크기
pub const MAX_UPLOAD_BODY_BYTES: usize = 64 * 1024 * 1024;

/// 업로드 바이트 수를 MB로 환산
pub fn size_in_mb(bytes: usize) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFileResponse {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub url: String,
    /// MB
    pub size: f64,
    pub created_at: NaiveDateTime,
}

impl From<company_file::Model> for CompanyFileResponse {
    fn from(model: company_file::Model) -> Self {
        Self {
            id: model.file_id,
            company_id: model.company_id,
            name: model.name,
            url: model.url,
            size: model.size,
            created_at: model.created_at,
        }
    }
}

/// 사용량 (MB). `available`은 회사의 전체 허용량입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataUsage {
    pub used: f64,
    pub available: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub files: Vec<CompanyFileResponse>,
    pub usage: DataUsage,
}

/// `DELETE /api/company/files` 쿼리
#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteFileQuery {
    /// 삭제할 파일 ID
    pub id: Option<i64>,
    /// `true`면 전체 삭제
    pub all: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFilesResponse {
    pub deleted_ids: Vec<i64>,
}

// ============== Swagger 응답 래퍼 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessFileListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: FileListResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessCompanyFileResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: CompanyFileResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDeleteFilesResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: DeleteFilesResponse,
}

/// 업로드 요청 문서화용 (multipart)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadFileForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_bytes_to_megabytes() {
        assert_eq!(size_in_mb(1024 * 1024), 1.0);
        assert_eq!(size_in_mb(3 * 512 * 1024), 1.5);
        assert_eq!(size_in_mb(0), 0.0);
    }
}
