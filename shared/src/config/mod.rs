//! Configuration types for EventDesk
//!
//! The shared library only defines the settings it consumes. Loading them
//! from disk is left to the application (see the backend's `Config`).

pub mod two_factor_config;

pub use two_factor_config::*;
