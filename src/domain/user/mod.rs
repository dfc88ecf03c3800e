pub mod identity;
pub mod model;

pub use identity::IdentityProvider;
pub use model::{User, UserRole};
