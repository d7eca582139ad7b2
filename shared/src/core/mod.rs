//! Core seams of the two-factor engine
//!
//! This module holds the traits the engine is invoked through: the
//! [`TimeSource`] used for verification and the [`TwoFactorStore`] the
//! account security service persists enrollment state with.

pub mod clock;
pub mod memory_store;
pub mod store;

pub use clock::{FixedClock, SystemClock, TimeSource};
pub use memory_store::MemoryTwoFactorStore;
pub use store::{TwoFactorRecord, TwoFactorStore};
