pub mod model;
pub mod repository;

pub use model::{
    generate_transaction_id, DiscountMeta, Payment, Refund, RefundStatus, TransactionDetail,
};
pub use repository::{PaymentRepository, RefundRepository};
