//! Surface-water network model.
//!
//! Catchments (drainage units) and nexuses (confluence, diversion and
//! observation points) are declared independently into a
//! [`network::NetworkBuilder`] and resolved into an immutable
//! [`network::HydroNetwork`]. Formulations and realizations attach to
//! catchments; hydro locations describe the physical feature at a nexus.

pub mod catchment;
pub mod error;
pub mod formulation;
pub mod location;
pub mod network;
pub mod nexus;
pub mod realization;
pub mod relations;
pub mod series;
pub mod service;

pub use catchment::Catchment;
pub use error::{HyError, Result};
pub use formulation::{Formulation, FormulationRegistry, FormulationType};
pub use location::{GaugeLocation, Geometry, HydroLocation, HydroLocationType, NexusLocation};
pub use network::{HydroNetwork, NetworkBuilder};
pub use nexus::Nexus;
pub use realization::{Realization, RealizationKind};
pub use relations::{normalize, Relations};
pub use series::TimeSeries;
