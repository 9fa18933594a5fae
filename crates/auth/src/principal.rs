use serde::Serialize;

use crate::{JwtClaims, Role, Scope};

/// The caller as seen by authorization: who they are and what they hold.
///
/// Built from verified claims by the transport layer; policies never look at
/// anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    subject: String,
    roles: Vec<Role>,
    scopes: Vec<Scope>,
}

impl Principal {
    pub fn new(subject: impl Into<String>, roles: Vec<Role>, scopes: Vec<Scope>) -> Self {
        Self {
            subject: subject.into(),
            roles,
            scopes,
        }
    }

    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self::new(claims.sub.clone(), claims.role.clone(), claims.scope.clone())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s.as_str() == scope)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }
}

impl From<&JwtClaims> for Principal {
    fn from(claims: &JwtClaims) -> Self {
        Self::from_claims(claims)
    }
}
