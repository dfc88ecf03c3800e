pub mod keylock;
pub mod logging;
pub mod timestamp;

pub use keylock::KeyLocks;
