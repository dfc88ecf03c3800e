pub mod model;
pub mod repository;

pub use model::{GeoLocation, ParkingLot, PriceBreakdown};
pub use repository::LotRepository;
