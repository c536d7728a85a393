use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::ai::AiClient;
use crate::storage::BlobStore;
use crate::store::DataSource;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataSource>,
    /// `OPENAI_API_KEY`가 없으면 `None` (AI 답변 비활성)
    pub ai: Option<AiClient>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: AppConfig,
}
