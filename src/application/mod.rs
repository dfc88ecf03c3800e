//! Application layer - business logic

pub mod services;

// Re-export key types for convenience
pub use services::{
    Availability, BillingService, CapacityLedger, CodeCheck, DiscountService, NewDiscountCode,
    PaymentRequest, RejectReason, ReservationService, SessionService, Statement,
};
