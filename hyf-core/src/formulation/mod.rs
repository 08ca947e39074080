//! Pluggable simulation models attached to catchments.
//!
//! A concrete model implements [`Formulation`] (what every instance can
//! do) and [`FormulationType`] (what the type itself provides: a tag, its
//! parameter requirements and a config factory). A [`FormulationRegistry`]
//! maps tags found in configuration to those factories and checks the
//! parameter contract on every creation.

pub mod linear_reservoir;

use crate::error::{HyError, Result};
use log::debug;
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

pub use linear_reservoir::LinearReservoir;

/// Keyed configuration values, as found in realization configs.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Parameter name to expected type.
pub type RequiredParams = BTreeMap<String, ParamType>;

/// The JSON shape a parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Float,
    Integer,
    Boolean,
    Text,
    FloatArray,
}

impl ParamType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::Float => value.is_number(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Text => value.is_string(),
            ParamType::FloatArray => value
                .as_array()
                .is_some_and(|a| a.iter().all(Value::is_number)),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Float => "float",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Text => "text",
            ParamType::FloatArray => "float array",
        };
        f.write_str(name)
    }
}

/// Look a parameter up in the local config, falling back to the global one.
pub fn param<'a>(
    name: &str,
    local: &'a ConfigMap,
    global: Option<&'a ConfigMap>,
) -> Option<&'a Value> {
    local.get(name).or_else(|| global.and_then(|g| g.get(name)))
}

/// Instance capabilities of a simulation model.
pub trait Formulation: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    /// Type tag of the concrete model; matches [`FormulationType::formulation_type`].
    fn kind(&self) -> &str;

    /// Id of the catchment this formulation is attached to.
    fn catchment(&self) -> Option<&str>;

    fn set_catchment(&mut self, catchment_id: &str);

    /// Parameters this instance requires.
    fn required_params(&self) -> RequiredParams;

    /// Output flux for `input_flux`, with model-specific `options`.
    fn get_response(&mut self, input_flux: f64, options: &ConfigMap) -> Result<f64>;
}

/// Type-level capabilities of a simulation model.
///
/// `required_params_for_type` must either be empty or equal
/// `required_params` of every instance; the registry rejects instances
/// that disagree.
pub trait FormulationType: Formulation + Sized + 'static {
    fn formulation_type() -> &'static str;

    fn required_params_for_type() -> RequiredParams;

    /// Build an instance from configuration alone; no catchment is needed.
    fn create_from_config(local: &ConfigMap, global: Option<&ConfigMap>) -> Result<Self>;
}

/// Id and catchment back-reference shared by formulation implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulationCore {
    id: String,
    catchment: Option<String>,
}

impl FormulationCore {
    pub fn new(id: impl Into<String>, catchment: Option<String>) -> Self {
        FormulationCore {
            id: id.into(),
            catchment,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn catchment(&self) -> Option<&str> {
        self.catchment.as_deref()
    }

    pub fn set_catchment(&mut self, catchment_id: &str) {
        self.catchment = Some(catchment_id.to_string());
    }
}

type Constructor = fn(&ConfigMap, Option<&ConfigMap>) -> Result<Box<dyn Formulation>>;

fn construct<T: FormulationType>(
    local: &ConfigMap,
    global: Option<&ConfigMap>,
) -> Result<Box<dyn Formulation>> {
    Ok(Box::new(T::create_from_config(local, global)?))
}

struct Entry {
    required: RequiredParams,
    construct: Constructor,
}

/// Maps formulation type tags to their factories.
#[derive(Default)]
pub struct FormulationRegistry {
    entries: BTreeMap<String, Entry>,
}

impl fmt::Debug for FormulationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulationRegistry")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FormulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the formulations shipped in this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<LinearReservoir>();
        registry
    }

    /// Register `T` under its type tag, replacing any previous entry.
    pub fn register<T: FormulationType>(&mut self) -> &mut Self {
        self.entries.insert(
            T::formulation_type().to_string(),
            Entry {
                required: T::required_params_for_type(),
                construct: construct::<T>,
            },
        );
        self
    }

    pub fn contains(&self, formulation_type: &str) -> bool {
        self.entries.contains_key(formulation_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Create a formulation of type `formulation_type` from configuration.
    ///
    /// Type-level parameters are checked against `local` (then `global`)
    /// before construction; the instance is checked against its type
    /// afterwards.
    pub fn create(
        &self,
        formulation_type: &str,
        local: &ConfigMap,
        global: Option<&ConfigMap>,
    ) -> Result<Box<dyn Formulation>> {
        let entry = self
            .entries
            .get(formulation_type)
            .ok_or_else(|| HyError::UnknownFormulationType(formulation_type.to_string()))?;

        for (name, expected) in &entry.required {
            match param(name, local, global) {
                None => {
                    return Err(HyError::contract(
                        formulation_type,
                        format!("missing required parameter {}", name),
                    ))
                }
                Some(value) if !expected.matches(value) => {
                    return Err(HyError::contract(
                        formulation_type,
                        format!("parameter {} must be {}, got {}", name, expected, value),
                    ))
                }
                Some(_) => {}
            }
        }

        let formulation = (entry.construct)(local, global)?;
        if formulation.kind() != formulation_type {
            return Err(HyError::contract(
                formulation_type,
                format!("instance reports type {}", formulation.kind()),
            ));
        }
        if !entry.required.is_empty() && entry.required != formulation.required_params() {
            return Err(HyError::contract(
                formulation_type,
                "type-level required parameters differ from the instance's",
            ));
        }
        debug!("created {} formulation {}", formulation_type, formulation.id());
        Ok(formulation)
    }
}
