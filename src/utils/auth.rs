use axum::{
    async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info};

use crate::domain::user::entity::user;
use crate::state::AppState;
use crate::store::NewUser;
use crate::utils::error::AppError;
use crate::utils::jwt::{decode_token, Claims};

/// ID 공급자가 세션 토큰을 심는 쿠키 이름
pub const SESSION_COOKIE: &str = "__session";

/// 인증된 사용자 정보를 담는 Extractor
///
/// 토큰의 `sub`가 외부 사용자 ID이며, 로컬 사용자 레코드가 없으면 이메일 클레임으로
/// 최초 요청 시 생성합니다. 이메일이 없는 토큰이면 `user`는 `None`으로 남습니다.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub external_id: String,
    pub user: Option<user::Model>,
}

impl AuthUser {
    /// 로컬 사용자 레코드가 필요한 API에서 사용합니다.
    pub fn require_user(&self) -> Result<&user::Model, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // 1. Authorization 헤더에서 토큰 추출 시도
        let token = if let Some(auth_header) = parts.headers.get(AUTHORIZATION) {
            let auth_header_str = auth_header
                .to_str()
                .map_err(|_| AppError::unauthorized("Malformed authorization header"))?;

            auth_header_str
                .strip_prefix("Bearer ")
                .map(str::to_string)
                .ok_or_else(|| AppError::unauthorized("Unsupported authorization scheme"))?
        } else {
            // 2. 쿠키에서 토큰 추출 시도
            extract_token_from_cookie(parts)?
        };

        let claims = decode_token(&token, &state.config.jwt_secret)?;
        let user = mirror_user(state, &claims).await?;

        Ok(AuthUser {
            external_id: claims.sub,
            user,
        })
    }
}

fn extract_token_from_cookie(parts: &Parts) -> Result<String, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);

    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))
}

/// 외부 사용자를 로컬 사용자 테이블에 반영
async fn mirror_user(state: &AppState, claims: &Claims) -> Result<Option<user::Model>, AppError> {
    if let Some(existing) = state.store.find_user_by_external_id(&claims.sub).await? {
        return Ok(Some(existing));
    }

    let Some(email) = claims.email.clone() else {
        debug!(external_id = %claims.sub, "No email claim, skipping local user creation");
        return Ok(None);
    };

    let created = state
        .store
        .upsert_user(NewUser {
            external_id: claims.sub.clone(),
            email,
            first_name: claims.given_name.clone(),
            last_name: claims.family_name.clone(),
            image_url: claims.picture.clone(),
        })
        .await?;

    info!(user_id = created.user_id, external_id = %claims.sub, "Local user created on first request");

    Ok(Some(created))
}
