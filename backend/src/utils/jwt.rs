//! JWT token utilities for session issuance and verification.
//!
//! Tokens are compact HS256 JWTs carrying the principal id, username, role and
//! a validity window. Verification is pure: signature, algorithm, issuer and
//! time window are checked against the service key with no storage lookups.
//! Any HMAC algorithm signed with that key is accepted.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::database::models::Role;

/// Value of the `iss` claim on every token this service signs.
pub const ISSUER: &str = "uriel";

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Header algorithms accepted on verification: the HMAC family only.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Session claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Principal ID
    pub sub: String,
    /// Username, denormalized for display
    pub username: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Not before (unix seconds)
    pub nbf: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    pub iss: String,
}

/// Why a token was rejected. Callers only ever see "unauthorized"; the kind
/// is kept for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token uses an unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("token issuer is not recognised")]
    InvalidIssuer,
    #[error("token has expired or is not yet valid")]
    Expired,
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnexpectedAlgorithm
            }
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => TokenError::Expired,
            ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => TokenError::InvalidIssuer,
            _ => TokenError::Malformed,
        }
    }
}

/// Signs and verifies session tokens with a symmetric key.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service for `secret` issuing tokens valid for `lifetime`.
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        // The window is checked in `verify_at` against an explicit clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        TokenService {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token valid from now for the configured lifetime.
    pub fn issue(&self, principal_id: &str, username: &str, role: Role) -> Result<String, TokenError> {
        self.issue_at(principal_id, username, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        principal_id: &str,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let issued_at = now.timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: principal_id.to_string(),
            username: username.to_string(),
            role,
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at.saturating_add(lifetime),
            iss: ISSUER.to_string(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate and decode a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        let now = now.timestamp();
        if now < claims.nbf || now > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    use chrono::Duration as ChronoDuration;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret";
    const LIFETIME: Duration = Duration::from_secs(36 * 60 * 60);

    fn service() -> TokenService {
        TokenService::new(SECRET, LIFETIME)
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens.issue("p-1", "alice", Role::Player).unwrap();

        assert_eq!(token.split('.').count(), 3);

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "p-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Player);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, LIFETIME.as_secs() as i64);
    }

    #[test]
    fn test_validity_window_edges() {
        let tokens = service();
        let issued = Utc::now();
        let token = tokens.issue_at("p-1", "alice", Role::Player, issued).unwrap();
        let lifetime = ChronoDuration::seconds(LIFETIME.as_secs() as i64);

        let just_before = issued + lifetime - ChronoDuration::seconds(1);
        assert!(tokens.verify_at(&token, just_before).is_ok());

        let just_after = issued + lifetime + ChronoDuration::seconds(1);
        assert_eq!(tokens.verify_at(&token, just_after), Err(TokenError::Expired));

        let before_issue = issued - ChronoDuration::seconds(5);
        assert_eq!(tokens.verify_at(&token, before_issue), Err(TokenError::Expired));
    }

    #[test]
    fn test_old_token_rejected_by_wall_clock() {
        let tokens = service();
        let issued = Utc::now() - ChronoDuration::hours(37);
        let token = tokens.issue_at("p-1", "alice", Role::Player, issued).unwrap();

        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = service().issue("p-1", "alice", Role::Player).unwrap();
        let other = TokenService::new(b"a-completely-different-signing-key", LIFETIME);

        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let tokens = service();
        assert_eq!(tokens.verify(""), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("a.b"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("!!!.???.***"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let tokens = service();
        let token = tokens.issue("p-1", "alice", Role::Player).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let mut claims: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        claims["role"] = serde_json::json!("admin");
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(tokens.verify(&forged), Err(TokenError::InvalidSignature));
    }

    fn claims_for(role: Role, iss: &str) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: "p-1".to_string(),
            username: "alice".to_string(),
            role,
            iat: now,
            nbf: now,
            exp: now + 3600,
            iss: iss.to_string(),
        }
    }

    #[test]
    fn test_hmac_family_accepted() {
        let tokens = service();
        for algorithm in [Algorithm::HS384, Algorithm::HS512] {
            let token = encode(
                &Header::new(algorithm),
                &claims_for(Role::Player, ISSUER),
                &EncodingKey::from_secret(SECRET),
            )
            .unwrap();

            let claims = tokens.verify(&token).unwrap();
            assert_eq!(claims.sub, "p-1");
        }

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims_for(Role::Player, ISSUER),
            &EncodingKey::from_secret(b"a-completely-different-signing-key"),
        )
        .unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_algorithm_substitution_rejected() {
        let tokens = service();
        let legit = tokens.issue("p-1", "alice", Role::Player).unwrap();
        let signature = legit.rsplit('.').next().unwrap();
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims_for(Role::Admin, ISSUER)).unwrap());

        // Asymmetric header over a MAC-shaped signature
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let forged = format!("{}.{}.{}", header, payload, signature);
        assert_eq!(tokens.verify(&forged), Err(TokenError::UnexpectedAlgorithm));

        // alg "none" with an empty signature
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let unsigned = format!("{}.{}.", header, payload);
        assert!(tokens.verify(&unsigned).is_err());
    }

    #[test]
    fn test_oversized_lifetime_saturates() {
        let tokens = TokenService::new(SECRET, Duration::from_secs(u64::MAX));
        let token = tokens.issue("p-1", "alice", Role::Player).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.exp, i64::MAX);
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims_for(Role::Player, "someone-else"),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::InvalidIssuer));
    }
}
