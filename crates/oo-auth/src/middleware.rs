//! Request authentication
//!
//! The HTTP layer hands over the raw `Authorization` header; the
//! authenticator answers with the current user or an [`AuthError`].

use std::sync::Arc;

use oo_core::OoError;
use thiserror::Error;
use tracing::debug;

use crate::jwt::{extract_bearer_token, JwtError, JwtService};
use crate::permissions::CurrentUser;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::Missing => AuthError::Required,
            JwtError::Invalid(_) | JwtError::EncodingFailed(_) => AuthError::InvalidCredentials,
        }
    }
}

impl From<AuthError> for OoError {
    fn from(err: AuthError) -> Self {
        OoError::unauthorized(err.to_string())
    }
}

/// Validates bearer tokens
#[derive(Clone)]
pub struct Authenticator {
    jwt: Arc<JwtService>,
}

impl Authenticator {
    pub fn new(jwt: JwtService) -> Self {
        Self { jwt: Arc::new(jwt) }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn authenticate(&self, authorization: Option<&str>) -> Result<CurrentUser, AuthError> {
        let header = authorization.ok_or(AuthError::Required)?;
        let token = extract_bearer_token(header).ok_or(AuthError::Required)?;

        let claims = self.jwt.validate_token(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AuthError::from(e)
        })?;
        Ok(CurrentUser::from_claims(&claims)?)
    }
}
