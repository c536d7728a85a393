use axum::body::Bytes;
use tracing::{error, info, warn};

use crate::domain::company::entity::{company, company_file};
use crate::state::AppState;
use crate::storage::upload_key;
use crate::store::{exceeds_allowance, NewCompanyFile, QUOTA_EXCEEDED_MESSAGE};
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;

use super::dto::{size_in_mb, CompanyFileResponse, DataUsage, DeleteFilesResponse, FileListResponse};

/// multipart에서 꺼낸 업로드 파일
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Bytes,
}

/// 삭제 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    One(i64),
    All,
}

pub struct FileService;

impl FileService {
    /// 파일 목록과 사용량
    ///
    /// 회사가 없으면 빈 목록과 기본 허용량을 반환합니다.
    pub async fn list_files(
        state: &AppState,
        auth: &AuthUser,
    ) -> Result<FileListResponse, AppError> {
        let Some(company) = Self::find_company(state, auth).await? else {
            return Ok(FileListResponse {
                files: Vec::new(),
                usage: DataUsage {
                    used: 0.0,
                    available: state.config.default_max_data_allowance_mb,
                },
            });
        };

        let files = state.store.list_company_files(company.company_id).await?;

        Ok(FileListResponse {
            files: files.into_iter().map(CompanyFileResponse::from).collect(),
            usage: DataUsage {
                used: company.data_usage,
                available: company.max_data_allowance,
            },
        })
    }

    /// 파일 업로드
    ///
    /// 허용량 사전 검사 → 저장소 기록 → 사용량 증가와 원장 기록(원자적) 순서입니다.
    /// 원장 기록이 실패하면 저장소에 쓴 파일을 지웁니다.
    pub async fn upload(
        state: &AppState,
        auth: &AuthUser,
        file: UploadedFile,
    ) -> Result<CompanyFileResponse, AppError> {
        let name = file.name.trim().to_string();
        if name.is_empty() || file.bytes.is_empty() {
            return Err(AppError::bad_request("No file provided"));
        }

        let company = Self::find_company(state, auth)
            .await?
            .ok_or_else(|| AppError::not_found("Company not found. Please create a company first."))?;
        let company_id = company.company_id;
        let size = size_in_mb(file.bytes.len());

        // 1. 사전 검사 (아무것도 쓰지 않음)
        if exceeds_allowance(company.data_usage, size, company.max_data_allowance) {
            warn!(
                company_id,
                size,
                data_usage = company.data_usage,
                max_data_allowance = company.max_data_allowance,
                "Upload rejected by allowance pre-check"
            );
            return Err(AppError::QuotaExceeded(QUOTA_EXCEEDED_MESSAGE.to_string()));
        }

        // 2. 저장소 기록
        let key = upload_key(&auth.external_id, &name);
        let url = state.blobs.put(&key, file.bytes).await?;

        // 3. 사용량 증가 + 원장 기록
        let recorded = state
            .store
            .record_upload(company_id, NewCompanyFile { name, url, size })
            .await;

        match recorded {
            Ok(model) => {
                info!(company_id, file_id = model.file_id, size, "File uploaded");
                Ok(CompanyFileResponse::from(model))
            }
            Err(e) => {
                warn!(company_id, key = %key, error = %e, "Upload not recorded, removing stored blob");
                if let Err(remove_err) = state.blobs.remove(&[key.clone()]).await {
                    error!(company_id, key = %key, error = %remove_err, "Failed to remove orphaned blob");
                }
                Err(e)
            }
        }
    }

    /// 파일 삭제 (단건/전체)
    ///
    /// 원장과 사용량을 먼저 정리하고 저장소 삭제는 최선 노력으로 처리합니다.
    pub async fn delete(
        state: &AppState,
        auth: &AuthUser,
        target: DeleteTarget,
    ) -> Result<DeleteFilesResponse, AppError> {
        let company = Self::find_company(state, auth)
            .await?
            .ok_or_else(|| AppError::not_found("Company not found"))?;
        let company_id = company.company_id;

        let deleted = match target {
            DeleteTarget::One(file_id) => {
                vec![state.store.soft_delete_file(company_id, file_id).await?]
            }
            DeleteTarget::All => state.store.soft_delete_all_files(company_id).await?,
        };

        info!(company_id, count = deleted.len(), target = ?target, "Files deleted");

        Self::remove_blobs(state, company_id, &deleted).await;

        Ok(DeleteFilesResponse {
            deleted_ids: deleted.iter().map(|file| file.file_id).collect(),
        })
    }

    async fn remove_blobs(state: &AppState, company_id: i64, files: &[company_file::Model]) {
        let keys: Vec<String> = files
            .iter()
            .filter_map(|file| {
                let key = state.blobs.key_for_url(&file.url);
                if key.is_none() {
                    warn!(company_id, file_id = file.file_id, url = %file.url, "File url not owned by blob store");
                }
                key
            })
            .collect();

        if keys.is_empty() {
            return;
        }
        if let Err(e) = state.blobs.remove(&keys).await {
            error!(company_id, error = %e, "Failed to remove blobs of deleted files");
        }
    }

    async fn find_company(
        state: &AppState,
        auth: &AuthUser,
    ) -> Result<Option<company::Model>, AppError> {
        match &auth.user {
            Some(user) => state.store.find_company_by_user(user.user_id).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::storage::MemoryBlobStore;
    use crate::store::fixture::DEMO_EXTERNAL_ID;
    use crate::store::{DataSource, FixtureDataSource};

    const MB: usize = 1024 * 1024;

    struct Harness {
        store: Arc<FixtureDataSource>,
        blobs: Arc<MemoryBlobStore>,
        state: AppState,
        auth: AuthUser,
        company_id: i64,
    }

    async fn harness() -> Harness {
        let store = Arc::new(FixtureDataSource::seeded());
        let blobs = Arc::new(MemoryBlobStore::new("http://localhost:3000"));
        let user = store
            .find_user_by_external_id(DEMO_EXTERNAL_ID)
            .await
            .unwrap()
            .unwrap();
        let company_id = store
            .find_company_by_user(user.user_id)
            .await
            .unwrap()
            .unwrap()
            .company_id;
        let state = AppState {
            store: store.clone(),
            ai: None,
            blobs: blobs.clone(),
            config: AppConfig::for_fixture("test-secret"),
        };
        Harness {
            store,
            blobs,
            state,
            auth: AuthUser {
                external_id: DEMO_EXTERNAL_ID.to_string(),
                user: Some(user),
            },
            company_id,
        }
    }

    fn file(name: &str, bytes: usize) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            bytes: Bytes::from(vec![0u8; bytes]),
        }
    }

    async fn usage(h: &Harness) -> f64 {
        h.store
            .find_company(h.company_id)
            .await
            .unwrap()
            .unwrap()
            .data_usage
    }

    #[tokio::test]
    async fn should_gate_uploads_on_remaining_allowance() {
        // Arrange
        let h = harness().await;
        h.store.overwrite_data_usage(h.company_id, 8.0).unwrap();

        // Act
        let rejected = FileService::upload(&h.state, &h.auth, file("big.pdf", 3 * MB)).await;
        let accepted = FileService::upload(&h.state, &h.auth, file("small.pdf", 3 * MB / 2)).await;

        // Assert
        assert!(matches!(rejected, Err(AppError::QuotaExceeded(_))));
        let accepted = accepted.unwrap();
        assert_eq!(accepted.size, 1.5);
        assert_eq!(usage(&h).await, 9.5);
        assert_eq!(h.blobs.len(), 1);
        let listed = FileService::list_files(&h.state, &h.auth).await.unwrap();
        assert_eq!(listed.files.len(), 1);
        assert_eq!(listed.usage, DataUsage { used: 9.5, available: 10.0 });
    }

    #[tokio::test]
    async fn should_reject_empty_upload() {
        let h = harness().await;

        let result = FileService::upload(&h.state, &h.auth, file("empty.txt", 0)).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(h.blobs.is_empty());
    }

    #[tokio::test]
    async fn should_restore_usage_and_remove_blob_on_delete() {
        // Arrange
        let h = harness().await;
        let uploaded = FileService::upload(&h.state, &h.auth, file("a.txt", MB))
            .await
            .unwrap();

        // Act
        let result = FileService::delete(&h.state, &h.auth, DeleteTarget::One(uploaded.id))
            .await
            .unwrap();

        // Assert
        assert_eq!(result.deleted_ids, vec![uploaded.id]);
        assert_eq!(usage(&h).await, 0.0);
        assert!(h.blobs.is_empty());
        let again = FileService::delete(&h.state, &h.auth, DeleteTarget::One(uploaded.id)).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reset_drifted_usage_on_delete_all() {
        // Arrange
        let h = harness().await;
        FileService::upload(&h.state, &h.auth, file("a.txt", MB)).await.unwrap();
        FileService::upload(&h.state, &h.auth, file("b.txt", MB)).await.unwrap();
        h.store.overwrite_data_usage(h.company_id, 7.25).unwrap();

        // Act
        let result = FileService::delete(&h.state, &h.auth, DeleteTarget::All)
            .await
            .unwrap();

        // Assert
        assert_eq!(result.deleted_ids.len(), 2);
        assert_eq!(usage(&h).await, 0.0);
        assert!(h.blobs.is_empty());
        let listed = FileService::list_files(&h.state, &h.auth).await.unwrap();
        assert!(listed.files.is_empty());
    }

    #[tokio::test]
    async fn should_return_default_allowance_without_company() {
        let h = harness().await;
        let stranger = AuthUser {
            external_id: "user_without_company".into(),
            user: None,
        };

        let listed = FileService::list_files(&h.state, &stranger).await.unwrap();

        assert!(listed.files.is_empty());
        assert_eq!(listed.usage.used, 0.0);
        assert_eq!(listed.usage.available, h.state.config.default_max_data_allowance_mb);
    }
}
