use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{Role, Scope};

/// JWT claims model (transport-agnostic).
///
/// The minimal set of claims the catalog reads once a token has been decoded
/// and its signature verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / caller identifier.
    pub sub: String,

    /// Role claims; identity providers send either a string or an array.
    #[serde(default, alias = "roles", deserialize_with = "roles_from_claim")]
    pub role: Vec<Role>,

    /// Scope claims; a space-delimited string or an array.
    #[serde(default, alias = "scopes", deserialize_with = "scopes_from_claim")]
    pub scope: Vec<Scope>,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification lives in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn roles_from_claim<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![Role::new(role)],
        OneOrMany::Many(roles) => roles.into_iter().map(Role::new).collect(),
    })
}

fn scopes_from_claim<'de, D>(deserializer: D) -> Result<Vec<Scope>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(joined) => joined.split_whitespace().map(|s| Scope::new(s.to_string())).collect(),
        OneOrMany::Many(scopes) => scopes.into_iter().map(Scope::new).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn claims_at(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: "player-1".to_string(),
            role: vec![],
            scope: vec![],
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn accepts_a_token_inside_its_window() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let now = Utc::now();
        let claims = claims_at(now);
        assert_eq!(
            validate_claims(&claims, now + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::hours(1)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_windows() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.expires_at = claims.issued_at;
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn single_role_and_space_delimited_scope_are_accepted() {
        let claims: JwtClaims = serde_json::from_value(json!({
            "sub": "abc",
            "role": "Admin",
            "scope": "catalog.readaccess catalog.writeaccess",
            "iat": 1_700_000_000,
            "exp": 1_700_000_600,
        }))
        .unwrap();

        assert_eq!(claims.role, vec![Role::admin()]);
        assert_eq!(claims.scope, vec![Scope::read_access(), Scope::write_access()]);
    }

    #[test]
    fn array_claims_and_missing_claims_are_accepted() {
        let claims: JwtClaims = serde_json::from_value(json!({
            "sub": "abc",
            "scope": ["catalog.fullaccess"],
            "iat": 1_700_000_000,
            "exp": 1_700_000_600,
        }))
        .unwrap();

        assert!(claims.role.is_empty());
        assert_eq!(claims.scope, vec![Scope::full_access()]);
    }
}
