//! Infrastructure layer - external concerns

pub mod identity;
pub mod storage;

pub use identity::InMemoryIdentity;
pub use storage::InMemoryRepositories;
