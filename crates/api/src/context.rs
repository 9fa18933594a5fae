use catalog_auth::Principal;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; every `/items` route requires it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    principal: Principal,
}

impl CallerContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
