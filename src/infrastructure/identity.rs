//! In-memory identity provider
//!
//! Maps bearer tokens to user records for development and testing. A
//! production deployment wires a real session store behind the same
//! [`IdentityProvider`] port.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{DomainResult, IdentityProvider, User};

/// Token-to-user map
pub struct InMemoryIdentity {
    users: DashMap<String, User>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Register a token for a user; a repeated token is overwritten
    pub fn register(&self, token: impl Into<String>, user: User) {
        self.users.insert(token.into(), user);
    }

    /// Invalidate a token
    pub fn revoke(&self, token: &str) {
        self.users.remove(token);
    }
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn resolve(&self, token: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(token).map(|u| u.clone()))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    #[tokio::test]
    async fn resolves_registered_tokens_only() {
        let identity = InMemoryIdentity::new();
        identity.register("tok-1", User::new("alice", UserRole::User));

        let user = identity.resolve("tok-1").await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(identity.resolve("tok-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoked_token_stops_resolving() {
        let identity = InMemoryIdentity::new();
        identity.register("tok-1", User::new("alice", UserRole::User));
        identity.revoke("tok-1");
        assert!(identity.resolve("tok-1").await.unwrap().is_none());
    }
}
