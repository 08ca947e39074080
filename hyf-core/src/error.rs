/// Error types for the network model and its collaborators
use std::fmt;
use thiserror::Error;

/// Which kind of node an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Catchment,
    Nexus,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Catchment => write!(f, "catchment"),
            NodeKind::Nexus => write!(f, "nexus"),
        }
    }
}

/// The single-valued relation a derived accessor reads through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Inflow,
    Outflow,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Inflow => write!(f, "inflow"),
            Relation::Outflow => write!(f, "outflow"),
        }
    }
}

/// Main error type for network operations
#[derive(Error, Debug)]
pub enum HyError {
    /// Two nodes of the same kind were declared with one id
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: NodeKind, id: String },

    /// A relation names a node that was never declared
    #[error("{from_kind} {from} references unknown {to_kind} {to}")]
    DanglingReference {
        from_kind: NodeKind,
        from: String,
        to_kind: NodeKind,
        to: String,
    },

    /// A catchment relates to itself through containment or conjunction
    #[error("catchment {0} references itself")]
    SelfReference(String),

    /// Catchment not found
    #[error("catchment not found: {0}")]
    UnknownCatchment(String),

    /// Nexus not found
    #[error("nexus not found: {0}")]
    UnknownNexus(String),

    /// A name outside the hydro location type code list
    #[error("unknown hydro location type: {0}")]
    UnknownLocationType(String),

    /// Upper/lower catchments requested without the nexus they read through
    #[error("catchment {catchment} has no {relation} nexus")]
    MissingRelation {
        catchment: String,
        relation: Relation,
    },

    /// A formulation does not satisfy its parameter contract
    #[error("formulation contract violated by {formulation_type}: {reason}")]
    ContractViolation {
        formulation_type: String,
        reason: String,
    },

    /// No constructor registered for the requested type tag
    #[error("unknown formulation type: {0}")]
    UnknownFormulationType(String),

    /// A response option had the wrong shape
    #[error("invalid option {name} for formulation {formulation}")]
    InvalidOption { formulation: String, name: String },

    /// The hydrometric service answered with a failure
    #[error("hydrometric service error: {0}")]
    Service(String),

    /// The hydrometric service does not know the station
    #[error("unknown station: {0}")]
    UnknownStation(String),

    /// The hydrometric service returned no observations
    #[error("no observations returned for station {0}")]
    EmptyResult(String),

    /// Failed to parse CSV data
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl HyError {
    pub(crate) fn contract(formulation_type: &str, reason: impl Into<String>) -> Self {
        HyError::ContractViolation {
            formulation_type: formulation_type.to_string(),
            reason: reason.into(),
        }
    }
}

/// Type alias for Results using HyError
pub type Result<T> = std::result::Result<T, HyError>;
