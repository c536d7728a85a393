use tracing::{info, warn};

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;

use super::dto::{CompanyProfileRequest, CompanyProfileSummary, CompanyResponse};
use super::entity::company;

pub struct CompanyService;

impl CompanyService {
    /// 내 회사 조회
    pub async fn get_company(
        state: &AppState,
        auth: &AuthUser,
    ) -> Result<CompanyResponse, AppError> {
        let company = Self::require_company(state, auth).await?;
        Ok(CompanyResponse::from(company))
    }

    /// 회사 생성 (온보딩)
    ///
    /// 사용자당 하나만 만들 수 있으며 기본 허용량으로 시작합니다.
    pub async fn create_company(
        state: &AppState,
        auth: &AuthUser,
        req: CompanyProfileRequest,
    ) -> Result<CompanyResponse, AppError> {
        let user = auth.require_user()?;

        let name_missing = req
            .name
            .as_deref()
            .map(|name| name.trim().is_empty())
            .unwrap_or(true);
        if name_missing {
            return Err(AppError::validation_error("Company name is required"));
        }

        if state.store.find_company_by_user(user.user_id).await?.is_some() {
            warn!(user_id = user.user_id, "Company already exists for user");
            return Err(AppError::bad_request("Company already exists"));
        }

        let company = state
            .store
            .create_company(
                user.user_id,
                req.into(),
                state.config.default_max_data_allowance_mb,
            )
            .await?;

        info!(
            company_id = company.company_id,
            user_id = user.user_id,
            "Company created"
        );

        Ok(CompanyResponse::from(company))
    }

    /// 프로필 수정. 생략한 필드는 유지됩니다.
    pub async fn update_company(
        state: &AppState,
        auth: &AuthUser,
        req: CompanyProfileRequest,
    ) -> Result<CompanyResponse, AppError> {
        let company = Self::require_company(state, auth).await?;
        let company_id = company.company_id;

        let updated = state.store.update_company(company_id, req.into()).await?;

        info!(company_id, "Company profile updated");
        Ok(CompanyResponse::from(updated))
    }

    pub async fn get_profile(
        state: &AppState,
        auth: &AuthUser,
    ) -> Result<CompanyProfileSummary, AppError> {
        let company = Self::require_company(state, auth).await?;
        Ok(CompanyProfileSummary::from(company))
    }

    async fn require_company(
        state: &AppState,
        auth: &AuthUser,
    ) -> Result<company::Model, AppError> {
        let Some(user) = auth.user.as_ref() else {
            return Err(AppError::not_found("Company not found"));
        };

        state
            .store
            .find_company_by_user(user.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Company not found"))
    }
}
