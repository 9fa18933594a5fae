//! `catalog-auth` — caller identity and policy evaluation.
//!
//! This crate is intentionally decoupled from HTTP and storage: policies are
//! pure functions of the caller's role and scope claims.

pub mod claims;
pub mod jwt;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod scopes;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use policy::{AuthorizationExplanation, AuthzError, Decision, Policy, PolicyRule, authorize, evaluate, explain};
pub use principal::Principal;
pub use roles::Role;
pub use scopes::Scope;
