//! Application services

mod billing;
mod capacity;
mod discounts;
mod reservations;
mod sessions;

pub use billing::{BillingService, LotSummary, PaymentRequest, SessionSummary, Statement};
pub use capacity::CapacityLedger;
pub use discounts::{CodeCheck, DiscountService, NewDiscountCode, RejectReason};
pub use reservations::{Availability, ReservationService};
pub use sessions::SessionService;
