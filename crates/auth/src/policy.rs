//! Named authorization policies.
//!
//! Each policy is an explicit rule over the caller's claims:
//!
//! | Policy               | Allowed when                                                  |
//! |----------------------|---------------------------------------------------------------|
//! | `Read`               | role `Admin`, or scope `catalog.fullaccess`/`catalog.readaccess` |
//! | `Write`              | role `Admin`, or scope `catalog.fullaccess`/`catalog.writeaccess` |
//! | `CatalogReadOrAdmin` | role `Admin`, or scope `catalog.readaccess`                    |
//!
//! `CatalogReadOrAdmin` is narrower than `Read`: a caller holding only
//! `catalog.fullaccess` passes `Read` but not `CatalogReadOrAdmin`. The item
//! read endpoints use `CatalogReadOrAdmin`.

use core::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::{Principal, Role, Scope};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Policy {
    Read,
    Write,
    #[serde(rename = "CatalogReadOrAdmin")]
    ReadOrAdmin,
}

/// Declarative form of a policy: who gets in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRule {
    /// Callers in the `Admin` role pass regardless of scopes.
    pub admin_role: bool,
    /// Holding any one of these scopes is enough.
    pub scopes: &'static [&'static str],
}

const READ_RULE: PolicyRule = PolicyRule {
    admin_role: true,
    scopes: &[Scope::FULL_ACCESS, Scope::READ_ACCESS],
};

const WRITE_RULE: PolicyRule = PolicyRule {
    admin_role: true,
    scopes: &[Scope::FULL_ACCESS, Scope::WRITE_ACCESS],
};

const READ_OR_ADMIN_RULE: PolicyRule = PolicyRule {
    admin_role: true,
    scopes: &[Scope::READ_ACCESS],
};

impl Policy {
    pub const ALL: [Policy; 3] = [Policy::Read, Policy::Write, Policy::ReadOrAdmin];

    /// Registered policy name.
    pub fn name(self) -> &'static str {
        match self {
            Policy::Read => "Read",
            Policy::Write => "Write",
            Policy::ReadOrAdmin => "CatalogReadOrAdmin",
        }
    }

    pub fn rule(self) -> PolicyRule {
        match self {
            Policy::Read => READ_RULE,
            Policy::Write => WRITE_RULE,
            Policy::ReadOrAdmin => READ_OR_ADMIN_RULE,
        }
    }
}

impl core::fmt::Display for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown policy '{0}'")]
pub struct UnknownPolicy(pub String);

impl FromStr for Policy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: policy '{0}' not satisfied")]
    Forbidden(Policy),
}

/// Evaluate a policy against the caller's claims.
///
/// - No IO
/// - No panics
/// - Independent of any request context
pub fn evaluate(principal: &Principal, policy: Policy) -> Decision {
    let rule = policy.rule();

    if rule.admin_role && principal.is_admin() {
        return Decision::Allow;
    }

    if rule.scopes.iter().any(|s| principal.has_scope(s)) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Like [`evaluate`], with a deny turned into an error.
pub fn authorize(principal: &Principal, policy: Policy) -> Result<(), AuthzError> {
    match evaluate(principal, policy) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(AuthzError::Forbidden(policy)),
    }
}

/// Auditable account of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub policy: Policy,
    pub decision: Decision,
    pub reason: String,
    pub subject: String,
    pub roles: Vec<String>,
    pub scopes: Vec<String>,
    /// Scopes that would have satisfied the policy.
    pub accepted_scopes: Vec<String>,
}

/// Explain why a caller was (or would be) allowed or denied.
pub fn explain(principal: &Principal, policy: Policy) -> AuthorizationExplanation {
    let rule = policy.rule();
    let decision = evaluate(principal, policy);

    let reason = if rule.admin_role && principal.is_admin() {
        format!("caller has role '{}'", Role::ADMIN)
    } else if let Some(scope) = rule.scopes.iter().find(|s| principal.has_scope(s)) {
        format!("caller holds scope '{scope}'")
    } else {
        format!(
            "caller is not '{}' and holds none of {:?}",
            Role::ADMIN,
            rule.scopes
        )
    };

    AuthorizationExplanation {
        policy,
        decision,
        reason,
        subject: principal.subject().to_string(),
        roles: principal.roles().iter().map(|r| r.as_str().to_string()).collect(),
        scopes: principal.scopes().iter().map(|s| s.as_str().to_string()).collect(),
        accepted_scopes: rule.scopes.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(roles: Vec<Role>, scopes: Vec<Scope>) -> Principal {
        Principal::new("player-1", roles, scopes)
    }

    #[test]
    fn admin_passes_every_policy() {
        let admin = caller(vec![Role::admin()], vec![]);
        for policy in Policy::ALL {
            assert_eq!(evaluate(&admin, policy), Decision::Allow, "{policy}");
        }
    }

    #[test]
    fn read_scope_passes_reads_but_not_writes() {
        let reader = caller(vec![], vec![Scope::read_access()]);
        assert_eq!(evaluate(&reader, Policy::ReadOrAdmin), Decision::Allow);
        assert_eq!(evaluate(&reader, Policy::Read), Decision::Allow);
        assert_eq!(evaluate(&reader, Policy::Write), Decision::Deny);
    }

    #[test]
    fn write_scope_fails_read_or_admin() {
        let writer = caller(vec![], vec![Scope::write_access()]);
        assert_eq!(evaluate(&writer, Policy::Write), Decision::Allow);
        assert_eq!(evaluate(&writer, Policy::ReadOrAdmin), Decision::Deny);
        assert_eq!(evaluate(&writer, Policy::Read), Decision::Deny);
    }

    #[test]
    fn full_access_passes_read_but_not_read_or_admin() {
        let full = caller(vec![], vec![Scope::full_access()]);
        assert_eq!(evaluate(&full, Policy::Read), Decision::Allow);
        assert_eq!(evaluate(&full, Policy::Write), Decision::Allow);
        assert_eq!(evaluate(&full, Policy::ReadOrAdmin), Decision::Deny);
    }

    #[test]
    fn role_match_is_exact() {
        let lower = caller(vec![Role::new("admin")], vec![]);
        assert_eq!(evaluate(&lower, Policy::Write), Decision::Deny);
    }

    #[test]
    fn anonymous_claims_are_denied() {
        let nobody = caller(vec![], vec![]);
        assert_eq!(
            authorize(&nobody, Policy::Write),
            Err(AuthzError::Forbidden(Policy::Write))
        );
    }

    #[test]
    fn policy_names_parse_back() {
        for policy in Policy::ALL {
            assert_eq!(policy.name().parse::<Policy>(), Ok(policy));
        }
        assert!("Delete".parse::<Policy>().is_err());
    }

    #[test]
    fn explanation_names_the_granting_claim() {
        let reader = caller(vec![], vec![Scope::read_access()]);
        let granted = explain(&reader, Policy::ReadOrAdmin);
        assert_eq!(granted.decision, Decision::Allow);
        assert!(granted.reason.contains(Scope::READ_ACCESS));

        let denied = explain(&reader, Policy::Write);
        assert_eq!(denied.decision, Decision::Deny);
        assert_eq!(denied.accepted_scopes, vec![Scope::FULL_ACCESS, Scope::WRITE_ACCESS]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_scope() -> impl Strategy<Value = Scope> {
            prop_oneof![
                Just(Scope::full_access()),
                Just(Scope::read_access()),
                Just(Scope::write_access()),
                "[a-z]{1,8}\\.[a-z]{1,8}".prop_map(Scope::new),
            ]
        }

        proptest! {
            /// Property: the admin role short-circuits every policy, whatever the scopes.
            #[test]
            fn admin_always_allowed(scopes in proptest::collection::vec(any_scope(), 0..5)) {
                let admin = caller(vec![Role::admin()], scopes);
                for policy in Policy::ALL {
                    prop_assert!(evaluate(&admin, policy).is_allowed());
                }
            }

            /// Property: anything that passes CatalogReadOrAdmin also passes Read.
            #[test]
            fn read_or_admin_is_narrower_than_read(
                admin in any::<bool>(),
                scopes in proptest::collection::vec(any_scope(), 0..5),
            ) {
                let roles = if admin { vec![Role::admin()] } else { vec![] };
                let principal = caller(roles, scopes);
                if evaluate(&principal, Policy::ReadOrAdmin).is_allowed() {
                    prop_assert!(evaluate(&principal, Policy::Read).is_allowed());
                }
            }
        }
    }
}
