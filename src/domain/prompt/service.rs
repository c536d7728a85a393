use tracing::info;

use crate::domain::company::dto::CompanyResponse;
use crate::domain::form::service::FormService;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;

use super::dto::{PromptResponse, SavePromptRequest};

pub struct PromptService;

impl PromptService {
    /// 폼 프롬프트와 연결된 회사 프로필
    pub async fn get_prompt(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
    ) -> Result<PromptResponse, AppError> {
        let record = FormService::find_owned(state, auth, form_id).await?;

        let company = match record.form.company_id {
            Some(company_id) => state.store.find_company(company_id).await?,
            None => None,
        };
        let prompt = state.store.find_prompt(form_id).await?;

        Ok(PromptResponse::new(
            form_id,
            prompt,
            company.map(CompanyResponse::from),
        ))
    }

    /// 프롬프트 저장
    ///
    /// 폼에 회사가 있으면 요청에 포함된 프로필 필드를 먼저 반영하고 프롬프트를 upsert합니다.
    pub async fn save_prompt(
        state: &AppState,
        auth: &AuthUser,
        form_id: i64,
        req: SavePromptRequest,
    ) -> Result<PromptResponse, AppError> {
        let record = FormService::find_owned(state, auth, form_id).await?;

        let company = match record.form.company_id {
            Some(company_id) if !req.profile.is_empty() => {
                let updated = state
                    .store
                    .update_company(company_id, req.profile.into())
                    .await?;
                info!(form_id, company_id, "Company profile updated with prompt");
                Some(updated)
            }
            Some(company_id) => state.store.find_company(company_id).await?,
            None => None,
        };

        let prompt = state
            .store
            .upsert_prompt(form_id, req.prompt, req.context)
            .await?;

        info!(form_id, "Form prompt saved");

        Ok(PromptResponse::new(
            form_id,
            Some(prompt),
            company.map(CompanyResponse::from),
        ))
    }
}
