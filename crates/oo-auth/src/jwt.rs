//! JWT bearer tokens

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use oo_core::{Id, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name, used in checker labels
    pub name: String,
    #[serde(default)]
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Id, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid("Invalid user ID in token".to_string()))
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// Creates and validates HMAC-signed tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl JwtService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: None,
        }
    }

    /// Require (and stamp) the `iss` claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Signs a token for a user. Used by tests and operator tooling.
    pub fn create_token(
        &self,
        user_id: Id,
        name: impl Into<String>,
        role: Role,
        expires_in_seconds: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let exp = now
            .checked_add(expires_in_seconds)
            .filter(|exp| *exp >= 0)
            .ok_or_else(|| JwtError::EncodingFailed("Invalid expiration".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.into(),
            role,
            exp: exp as usize,
            iat: now as usize,
            jti: Some(uuid::Uuid::new_v4().to_string()),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer.clone()]);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    #[test]
    fn test_create_and_validate_token() {
        let service = JwtService::new(SECRET);
        let token = service.create_token(2, "Dina", Role::Ga, 3600).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 2);
        assert_eq!(claims.name, "Dina");
        assert_eq!(claims.role, Role::Ga);
        assert!(claims.jti.is_some());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(SECRET);
        let token = service.create_token(2, "Dina", Role::Ga, -3600).unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret_and_issuer() {
        let token = JwtService::new(SECRET)
            .create_token(1, "Root", Role::Admin, 3600)
            .unwrap();

        let other = JwtService::new(b"another-secret-key-at-least-32-bytes");
        assert!(matches!(other.validate_token(&token), Err(JwtError::Invalid(_))));

        let strict = JwtService::new(SECRET).with_issuer("officeops");
        assert!(matches!(strict.validate_token(&token), Err(JwtError::Invalid(_))));

        let stamped = strict.create_token(1, "Root", Role::Admin, 3600).unwrap();
        assert_eq!(strict.validate_token(&stamped).unwrap().iss.as_deref(), Some("officeops"));
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"7","name":"Budi","exp":1,"iat":0}"#).unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"abc","name":"x","exp":1,"iat":0}"#).unwrap();
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
