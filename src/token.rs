use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthSettings;

/// Access tokens are valid for exactly one hour from issue.
pub const TOKEN_TTL_MINUTES: i64 = 60;

/// Claims carried by every issued token. Validity is purely a function of
/// these claims plus the signature; there is no server-side token registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the authenticated username.
    pub sub: String,
    /// Unique token id, fresh per issue.
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token was rejected")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and validates HS256-signed bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
        }
    }

    /// Mint a token for the given subject, expiring [`TOKEN_TTL_MINUTES`]
    /// from now.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.issue_at(username, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let exp = (now + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp();

        let claims = Claims {
            sub: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify signature, issuer, audience and expiry. Fails closed: any
    /// check that does not pass rejects the token.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str) -> AuthSettings {
        AuthSettings {
            username: "admin".to_string(),
            password: "password".to_string(),
            jwt_secret: secret.to_string(),
            issuer: "student-registry".to_string(),
            audience: "student-registry-clients".to_string(),
        }
    }

    #[test]
    fn issue_and_validate_roundtrip() {
        let service = TokenService::new(&settings("roundtrip-secret"));
        let now = Utc::now();

        let token = service.issue_at("admin", now).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, "student-registry");
        assert_eq!(claims.aud, "student-registry-clients");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = TokenService::new(&settings("expiry-secret"));
        // Two hours ago, so the one-hour token is well past its expiry.
        let issued = Utc::now() - Duration::hours(2);

        let token = service.issue_at("admin", issued).unwrap();

        assert!(matches!(service.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let issuer_service = TokenService::new(&settings("secret-a"));
        let verifier_service = TokenService::new(&settings("secret-b"));

        let token = issuer_service.issue("admin").unwrap();

        assert!(matches!(
            verifier_service.validate(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let service = TokenService::new(&settings("audience-secret"));
        let mut other = settings("audience-secret");
        other.audience = "someone-else".to_string();
        let verifier = TokenService::new(&other);

        let token = service.issue("admin").unwrap();

        assert!(matches!(verifier.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let service = TokenService::new(&settings("issuer-secret"));
        let mut other = settings("issuer-secret");
        other.issuer = "someone-else".to_string();
        let verifier = TokenService::new(&other);

        let token = service.issue("admin").unwrap();

        assert!(matches!(verifier.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = TokenService::new(&settings("garbage-secret"));

        assert!(matches!(
            service.validate("not-a-token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn token_ids_are_unique_per_issue() {
        let service = TokenService::new(&settings("jti-secret"));

        let first = service.issue("admin").unwrap();
        let second = service.issue("admin").unwrap();

        let first_claims = service.validate(&first).unwrap();
        let second_claims = service.validate(&second).unwrap();
        assert_ne!(first_claims.jti, second_claims.jti);
    }
}
