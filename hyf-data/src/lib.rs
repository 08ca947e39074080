//! Data loading for surface-water networks.
//!
//! This crate reads the inputs a network is built and driven from:
//! forcing time series (CSV) and realization configurations (JSON), and
//! assembles a [`hyf_core::HydroNetwork`] from the latter.

pub mod assemble;
pub mod config;
pub mod error;
pub mod forcing;

pub use assemble::assemble;
pub use config::RealizationConfig;
pub use error::{DataError, Result};
pub use forcing::ForcingTable;
