//! 업로드 파일 저장소
//!
//! 파일 원장(`company_file`)과 별개로 실제 바이트를 보관합니다.
//! 로컬 디렉토리에 저장하고 `/uploads` 경로로 정적 서빙합니다.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::Bytes;
use tracing::{debug, error, warn};

/// 공개 URL에서 저장소 키가 시작되는 경로
pub const UPLOADS_PATH: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// 바이트 저장소 추상화
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 저장 후 공개 URL 반환
    async fn put(&self, key: &str, bytes: Bytes) -> Result<String, BlobError>;

    /// 여러 키 삭제. 없는 키는 무시합니다.
    async fn remove(&self, keys: &[String]) -> Result<(), BlobError>;

    /// 이 저장소가 발급한 URL이면 키를 복원합니다.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

fn validate_key(key: &str) -> Result<(), BlobError> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

    if safe {
        Ok(())
    } else {
        Err(BlobError::InvalidKey(key.to_string()))
    }
}

fn public_url(base_url: &str, key: &str) -> String {
    format!("{}{}/{}", base_url, UPLOADS_PATH, key)
}

fn key_from_public_url(base_url: &str, url: &str) -> Option<String> {
    let prefix = format!("{}{}/", base_url, UPLOADS_PATH);
    url.strip_prefix(&prefix)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// 로컬 디렉토리 저장소
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<String, BlobError> {
        validate_key(key)?;
        let path = self.root.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!(error = %e, dir = %parent.display(), "Failed to create upload directory");
                e
            })?;
        }
        tokio::fs::write(&path, &bytes).await?;

        debug!(key = %key, size = bytes.len(), "Blob stored");
        Ok(public_url(&self.base_url, key))
    }

    async fn remove(&self, keys: &[String]) -> Result<(), BlobError> {
        for key in keys {
            validate_key(key)?;
            match tokio::fs::remove_file(self.root.join(key)).await {
                Ok(()) => debug!(key = %key, "Blob removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(key = %key, "Blob already missing");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        key_from_public_url(&self.base_url, url)
    }
}

/// 메모리 저장소 (테스트용)
pub struct MemoryBlobStore {
    base_url: String,
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .map(|blobs| blobs.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<String, BlobError> {
        validate_key(key)?;
        self.blobs
            .lock()
            .map_err(|_| BlobError::Unavailable("memory store lock poisoned".into()))?
            .insert(key.to_string(), bytes);
        Ok(public_url(&self.base_url, key))
    }

    async fn remove(&self, keys: &[String]) -> Result<(), BlobError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| BlobError::Unavailable("memory store lock poisoned".into()))?;
        for key in keys {
            blobs.remove(key);
        }
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        key_from_public_url(&self.base_url, url)
    }
}

/// 저장소 키 생성: `{소유자}/{날짜}/{uuid}-{파일명}`
pub fn upload_key(owner: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}-{}",
        sanitize_segment(owner),
        chrono::Utc::now().format("%Y-%m-%d"),
        uuid::Uuid::new_v4(),
        sanitize_segment(file_name)
    )
}

/// 경로 구분자와 제어 문자를 제거한 파일명 조각
fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
