use super::{
    param, ConfigMap, Formulation, FormulationCore, FormulationType, ParamType, RequiredParams,
};
use crate::error::{HyError, Result};
use serde_json::Value;

/// Single linear reservoir: each step drains a fixed fraction `k` of storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearReservoir {
    core: FormulationCore,
    k: f64,
    storage: f64,
}

impl LinearReservoir {
    pub const TYPE: &'static str = "linear_reservoir";

    pub fn new(id: impl Into<String>, k: f64, storage: f64) -> Result<Self> {
        if !(k > 0.0 && k <= 1.0) {
            return Err(HyError::contract(
                Self::TYPE,
                format!("k must be in (0, 1], got {}", k),
            ));
        }
        Ok(LinearReservoir {
            core: FormulationCore::new(id, None),
            k,
            storage,
        })
    }

    pub fn storage(&self) -> f64 {
        self.storage
    }
}

impl Formulation for LinearReservoir {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn kind(&self) -> &str {
        Self::TYPE
    }

    fn catchment(&self) -> Option<&str> {
        self.core.catchment()
    }

    fn set_catchment(&mut self, catchment_id: &str) {
        self.core.set_catchment(catchment_id);
    }

    fn required_params(&self) -> RequiredParams {
        Self::required_params_for_type()
    }

    /// Accepts an optional `dt` option scaling the input over the step.
    fn get_response(&mut self, input_flux: f64, options: &ConfigMap) -> Result<f64> {
        let dt = match options.get("dt") {
            None => 1.0,
            Some(v) => v.as_f64().ok_or_else(|| HyError::InvalidOption {
                formulation: self.id().to_string(),
                name: "dt".to_string(),
            })?,
        };
        self.storage += input_flux * dt;
        let outflow = self.k * self.storage;
        self.storage -= outflow;
        Ok(outflow)
    }
}

impl FormulationType for LinearReservoir {
    fn formulation_type() -> &'static str {
        Self::TYPE
    }

    fn required_params_for_type() -> RequiredParams {
        RequiredParams::from([("k".to_string(), ParamType::Float)])
    }

    fn create_from_config(local: &ConfigMap, global: Option<&ConfigMap>) -> Result<Self> {
        let id = local.get("id").and_then(Value::as_str).unwrap_or(Self::TYPE);
        let k = param("k", local, global)
            .and_then(Value::as_f64)
            .ok_or_else(|| HyError::contract(Self::TYPE, "missing required parameter k"))?;
        let storage = match param("storage", local, global) {
            None => 0.0,
            Some(value) => value.as_f64().ok_or_else(|| {
                HyError::contract(Self::TYPE, format!("storage must be a number, got {}", value))
            })?,
        };
        LinearReservoir::new(id, k, storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::FormulationRegistry;
    use serde_json::json;

    #[test]
    fn test_drains_fraction_of_storage() {
        let mut reservoir = LinearReservoir::new("lr-1", 0.5, 10.0).unwrap();
        let out = reservoir.get_response(2.0, &ConfigMap::new()).unwrap();
        assert_eq!(out, 6.0);
        assert_eq!(reservoir.storage(), 6.0);
    }

    #[test]
    fn test_dt_option() {
        let mut reservoir = LinearReservoir::new("lr-1", 1.0, 0.0).unwrap();
        let options = json!({"dt": 3.0}).as_object().cloned().unwrap();
        assert_eq!(reservoir.get_response(2.0, &options).unwrap(), 6.0);

        let bad = json!({"dt": "hourly"}).as_object().cloned().unwrap();
        assert!(matches!(
            reservoir.get_response(2.0, &bad),
            Err(HyError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_rejects_k_out_of_range() {
        assert!(LinearReservoir::new("lr-1", 0.0, 0.0).is_err());
        assert!(LinearReservoir::new("lr-1", 1.5, 0.0).is_err());
    }

    #[test]
    fn test_mistyped_storage_rejected() {
        let registry = FormulationRegistry::with_builtins();
        let local = json!({"k": 0.5, "storage": "100"}).as_object().cloned().unwrap();
        assert!(matches!(
            registry.create(LinearReservoir::TYPE, &local, None),
            Err(HyError::ContractViolation { .. })
        ));

        let local = json!({"k": 0.5, "storage": 100}).as_object().cloned().unwrap();
        let mut formulation = registry.create(LinearReservoir::TYPE, &local, None).unwrap();
        assert_eq!(formulation.get_response(0.0, &ConfigMap::new()).unwrap(), 50.0);
    }

    #[test]
    fn test_created_through_registry() {
        let registry = FormulationRegistry::with_builtins();
        let local = json!({"id": "lr-cat-1", "k": 0.25}).as_object().cloned().unwrap();
        let mut formulation = registry.create(LinearReservoir::TYPE, &local, None).unwrap();
        assert_eq!(formulation.id(), "lr-cat-1");
        assert_eq!(formulation.get_response(4.0, &ConfigMap::new()).unwrap(), 1.0);
    }
}
