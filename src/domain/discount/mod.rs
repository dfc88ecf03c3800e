pub mod model;
pub mod repository;

pub use model::{DiscountCode, DiscountKind, LotScope};
pub use repository::DiscountRepository;
