use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::config::{AuthScheme, JwtConfig};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("no token provided")]
    Missing,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token was issued by someone else")]
    WrongIssuer,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidIssuer => Self::WrongIssuer,
            _ => Self::Malformed,
        }
    }
}

/// Signing and verification keys, built once from [`JwtConfig`].
///
/// `previous` holds retired secrets: tokens they signed keep verifying until
/// they expire, new tokens are always signed with the current secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    previous: Vec<DecodingKey>,
    pub issuer: String,
    pub ttl: Duration,
    pub scheme: AuthScheme,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            previous: cfg
                .previous_secrets
                .iter()
                .map(|s| DecodingKey::from_secret(s.as_bytes()))
                .collect(),
            issuer: cfg.issuer.clone(),
            ttl: cfg.ttl(),
            scheme: cfg.scheme,
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, OffsetDateTime::now_utc())
    }

    fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Verifies signature, issuer and expiry, returning the subject user ID.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let claims = self.verify_claims(token)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)?;
        debug!(user_id, "jwt verified");
        Ok(user_id)
    }

    pub fn verify_claims(&self, token: &str) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Missing);
        }

        let validation = self.validation();
        let mut result = decode::<Claims>(token, &self.decoding, &validation);
        for key in &self.previous {
            let bad_signature =
                matches!(&result, Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature));
            if !bad_signature {
                break;
            }
            result = decode::<Claims>(token, key, &validation);
        }
        Ok(result?.claims)
    }

    /// Pulls the token out of an `Authorization` header value.
    pub fn token_from_header<'a>(&self, header: Option<&'a str>) -> Result<&'a str, TokenError> {
        let value = header.filter(|v| !v.trim().is_empty());
        let token = match (self.scheme, value) {
            (_, None) => return Err(TokenError::Missing),
            (AuthScheme::Raw, Some(v)) => v.trim(),
            (AuthScheme::Bearer, Some(v)) => v
                .trim_start()
                .strip_prefix("Bearer ")
                .or_else(|| v.trim_start().strip_prefix("bearer "))
                .ok_or(TokenError::Malformed)?
                .trim(),
        };
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        Ok(token)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;
        validation
    }
}
