//! Identity provider port
//!
//! The engine never owns token lifecycle; an external session/identity
//! store maps opaque bearer tokens to user records. Services consult this
//! port for the ownership and role checks on closing sessions, issuing
//! discount codes and financial operations.

use async_trait::async_trait;

use super::model::User;
use crate::domain::DomainResult;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an opaque bearer token to a user, or `None` when unknown
    async fn resolve(&self, token: &str) -> DomainResult<Option<User>>;
}
