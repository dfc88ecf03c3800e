pub mod discount;
pub mod error;
pub mod lot;
pub mod payment;
pub mod repositories;
pub mod reservation;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use discount::{DiscountCode, DiscountKind, DiscountRepository, LotScope};
pub use error::DomainError;
pub use lot::{GeoLocation, LotRepository, ParkingLot, PriceBreakdown};
pub use payment::{
    generate_transaction_id, DiscountMeta, Payment, PaymentRepository, Refund, RefundRepository,
    RefundStatus, TransactionDetail,
};
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{Reservation, ReservationRepository, ReservationStatus};
pub use session::{ParkingSession, PaymentStatus, SessionRepository};
pub use user::{IdentityProvider, User, UserRole};
