use tracing::{info, warn};

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;

use super::dto::{UpsertUserRequest, UserResponse};

pub struct UserService;

impl UserService {
    /// 외부 ID로 사용자 조회. 본인만 조회할 수 있습니다.
    pub async fn find_user(
        state: &AppState,
        auth: &AuthUser,
        external_id: Option<String>,
    ) -> Result<UserResponse, AppError> {
        let external_id = external_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::bad_request("external_id is required"))?;

        if external_id != auth.external_id {
            warn!(requested = %external_id, caller = %auth.external_id, "Lookup of another user rejected");
            return Err(AppError::not_found("User not found"));
        }

        state
            .store
            .find_user_by_external_id(&external_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// 사용자 생성 또는 갱신 (`last_login` 갱신 포함)
    pub async fn upsert_user(
        state: &AppState,
        auth: &AuthUser,
        req: UpsertUserRequest,
    ) -> Result<UserResponse, AppError> {
        if req.external_id != auth.external_id {
            return Err(AppError::unauthorized("Cannot modify another user"));
        }

        let user = state.store.upsert_user(req.into()).await?;

        info!(user_id = user.user_id, external_id = %user.external_id, "User synced");
        Ok(UserResponse::from(user))
    }
}
