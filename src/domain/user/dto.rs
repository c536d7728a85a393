use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::entity::user;
use crate::store::NewUser;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    /// ID 공급자의 사용자 ID
    pub external_id: Option<String>,
}

/// 사용자 동기화 요청 (ID 공급자 필드명 그대로)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertUserRequest {
    #[validate(length(min = 1, message = "external_id and email are required"))]
    #[serde(default)]
    pub external_id: String,
    #[validate(length(min = 1, message = "external_id and email are required"))]
    #[serde(default)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<UpsertUserRequest> for NewUser {
    fn from(req: UpsertUserRequest) -> Self {
        NewUser {
            external_id: req.external_id,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            image_url: req.image_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.user_id,
            external_id: model.external_id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            image_url: model.image_url,
            last_login: model.last_login,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessUserResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: UserResponse,
}
