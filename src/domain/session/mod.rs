pub mod model;
pub mod repository;

pub use model::{ParkingSession, PaymentStatus};
pub use repository::SessionRepository;
