//! # Request Context
//!
//! The caller's identity, handed explicitly to every engine and query call.
//! Nothing in the storefront reads identity from ambient state.

use serde::{Deserialize, Serialize};

/// Who is making the request and whether they may see everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Stable user id. Becomes the owner of any order this caller places.
    pub identity: String,

    /// Staff callers see every order; everyone else sees only their own.
    pub privileged: bool,
}

impl RequestContext {
    /// Context for an ordinary customer.
    pub fn customer(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            privileged: false,
        }
    }

    /// Context for a staff member.
    pub fn staff(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            privileged: true,
        }
    }

    /// Whether this caller may read an order owned by `owner_id`.
    pub fn can_view(&self, owner_id: &str) -> bool {
        self.privileged || self.identity == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        let alice = RequestContext::customer("alice");
        let admin = RequestContext::staff("admin");

        assert!(alice.can_view("alice"));
        assert!(!alice.can_view("bob"));
        assert!(admin.can_view("bob"));
    }
}
