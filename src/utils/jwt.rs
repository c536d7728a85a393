use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::AppError;

/// ID 공급자 세션 토큰 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (외부 사용자 ID)
    pub sub: String,
    /// Issued At
    pub iat: usize,
    /// Expiration
    pub exp: usize,
    /// 최초 요청 시 로컬 사용자 생성에 사용
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, expiration_seconds: i64) -> Self {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(Duration::seconds(expiration_seconds))
            .unwrap_or(now)
            .timestamp() as usize;

        Self {
            sub: sub.into(),
            iat: now.timestamp() as usize,
            exp,
            email,
            given_name: None,
            family_name: None,
            picture: None,
        }
    }
}

/// 세션 토큰 생성
///
/// 운영 환경에서는 ID 공급자가 발급하며, 로컬 개발과 테스트에서 사용합니다.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token creation failed: {}", e)))
}

/// 세션 토큰 검증
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Session expired".into())
        }
        _ => AppError::Unauthorized("Invalid session token".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_decode() {
        let secret = "test_secret";
        let claims = Claims::new("user_2abc", Some("owner@acme.io".into()), 3600);

        let token = encode_token(&claims, secret).expect("Token generation failed");
        let decoded = decode_token(&token, secret).expect("Token validation failed");

        assert_eq!(decoded.sub, "user_2abc");
        assert_eq!(decoded.email.as_deref(), Some("owner@acme.io"));
    }

    #[test]
    fn test_invalid_token() {
        let result = decode_token("invalid_token", "test_secret");
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let claims = Claims::new("user_2abc", None, 3600);
        let token = encode_token(&claims, "secret-a").unwrap();

        let result = decode_token(&token, "secret-b");

        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims::new("user_2abc", None, -3600);
        let token = encode_token(&claims, "test_secret").unwrap();

        let result = decode_token(&token, "test_secret");

        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Session expired"),
            other => panic!("expected expired session, got {:?}", other),
        }
    }
}
