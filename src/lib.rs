//! # ParkOps Engine
//!
//! Capacity and financial reconciliation engine for multi-tenant parking
//! operations: lot capacity ledger, reservation overlap resolution,
//! parking session lifecycle, tiered pricing, discount codes and
//! payment/refund reconciliation.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, types and traits
//! - **application**: Business logic services
//! - **infrastructure**: Storage and identity implementations
//! - **shared**: Cross-cutting helpers (key guards, timestamps, logging)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError, LoggingConfig};

// Re-export services for easy access
pub use application::{
    Availability, BillingService, CapacityLedger, CodeCheck, DiscountService, NewDiscountCode,
    PaymentRequest, RejectReason, ReservationService, SessionService, Statement,
};

// Re-export in-memory implementations
pub use infrastructure::{InMemoryIdentity, InMemoryRepositories};
