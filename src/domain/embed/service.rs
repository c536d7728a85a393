use tracing::{debug, warn};

use crate::state::AppState;
use crate::store::FormRecord;
use crate::utils::error::AppError;

use super::dto::PublicFormResponse;

/// 비활성 폼과 없는 코드는 구분하지 않습니다.
pub const FORM_UNAVAILABLE_MESSAGE: &str = "Form not found or not published";

pub struct EmbedService;

impl EmbedService {
    /// 임베드 코드로 게시된 폼 조회
    pub async fn resolve(state: &AppState, embed_code: &str) -> Result<FormRecord, AppError> {
        let code = embed_code.trim();
        if code.is_empty() {
            return Err(AppError::not_found(FORM_UNAVAILABLE_MESSAGE));
        }

        match state.store.find_active_form_by_embed_code(code).await? {
            Some(record) => {
                debug!(form_id = record.form.form_id, embed_code = %code, "Embed code resolved");
                Ok(record)
            }
            None => {
                warn!(embed_code = %code, "Embed code did not resolve to an active form");
                Err(AppError::not_found(FORM_UNAVAILABLE_MESSAGE))
            }
        }
    }

    pub async fn public_form_by_code(
        state: &AppState,
        embed_code: &str,
    ) -> Result<PublicFormResponse, AppError> {
        let record = Self::resolve(state, embed_code).await?;
        Ok(PublicFormResponse::from(&record))
    }

    /// iframe `/forms/{id}` 페이지용. 게시된 폼만 반환합니다.
    pub async fn public_form_by_id(
        state: &AppState,
        form_id: i64,
    ) -> Result<PublicFormResponse, AppError> {
        let record = state
            .store
            .find_form(form_id)
            .await?
            .filter(|record| record.form.is_active)
            .ok_or_else(|| {
                warn!(form_id, "Public form requested for missing or inactive form");
                AppError::not_found(FORM_UNAVAILABLE_MESSAGE)
            })?;

        Ok(PublicFormResponse::from(&record))
    }
}
