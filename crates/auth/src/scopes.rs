use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// OAuth scope claim (e.g. "catalog.readaccess").
///
/// Distinct from roles: scopes describe what a client was granted, roles
/// describe who the user is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Cow<'static, str>);

impl Scope {
    pub const FULL_ACCESS: &'static str = "catalog.fullaccess";
    pub const READ_ACCESS: &'static str = "catalog.readaccess";
    pub const WRITE_ACCESS: &'static str = "catalog.writeaccess";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn full_access() -> Self {
        Self(Cow::Borrowed(Self::FULL_ACCESS))
    }

    pub fn read_access() -> Self {
        Self(Cow::Borrowed(Self::READ_ACCESS))
    }

    pub fn write_access() -> Self {
        Self(Cow::Borrowed(Self::WRITE_ACCESS))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
