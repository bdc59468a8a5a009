//! HS256 session token encoding and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use storefront_core::SubjectId;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::Role;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding/decoding failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Issues and verifies signed session tokens.
///
/// Holds only key material, so one instance is shared by the sign-in actions
/// (issuing) and the session resolver (verifying).
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionTokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `subject` valid from `now` for `ttl`.
    pub fn issue_at(
        &self,
        subject: SubjectId,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            sub: subject,
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn issue(&self, subject: SubjectId, role: Role, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, role, Utc::now(), ttl)
    }

    /// Verify signature and time window, returning the raw claims.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionTokens").finish_non_exhaustive()
    }
}
