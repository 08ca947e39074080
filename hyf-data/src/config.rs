//! Realization configuration.
//!
//! A realization config is a JSON document keyed by catchment id. Each
//! catchment names its forcing source, its formulation(s) and, for
//! assembly into a network, the nexuses it flows from and to.
//!
//! ```json
//! {
//!   "global": {
//!     "formulations": [{"name": "linear_reservoir", "params": {"k": 0.1}}],
//!     "forcing": {"path": "forcing/global.csv"}
//!   },
//!   "time": {"start_time": "2015-12-01 00:00:00", "end_time": "2015-12-30 23:00:00"},
//!   "catchments": {
//!     "cat-88": {"forcing": {"path": "forcing/cat-88.csv"}, "outflow": "nex-26"}
//!   },
//!   "nexuses": {
//!     "nex-26": {"location": {"station_id": "02146211", "geometry": [-80.9, 35.2]}}
//!   }
//! }
//! ```

use crate::error::{DataError, Result};
use chrono::NaiveDateTime;
use hyf_core::{
    formulation::ConfigMap, GaugeLocation, Geometry, HydroLocation, HydroLocationType,
    NexusLocation, RealizationKind,
};
use hyf_utils::dates::parse_datetime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Where a catchment's forcing comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcingConfig {
    pub path: String,
    /// Loader-specific keys (provider, file pattern, ...), kept as-is.
    #[serde(flatten)]
    pub extra: ConfigMap,
}

/// A formulation type tag and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulationConfig {
    pub name: String,
    #[serde(default)]
    pub params: ConfigMap,
}

/// Defaults applied to every catchment that does not override them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub formulations: Vec<FormulationConfig>,
    pub forcing: Option<ForcingConfig>,
}

/// Simulation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    pub start_time: String,
    pub end_time: String,
    /// Output interval in seconds
    pub output_interval: Option<u64>,
}

impl TimeConfig {
    pub fn bounds(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((parse_datetime(&self.start_time)?, parse_datetime(&self.end_time)?))
    }
}

/// Realization record attached to a catchment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizationEntry {
    pub id: String,
    #[serde(default)]
    pub kind: RealizationKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatchmentConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formulations: Vec<FormulationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forcing: Option<ForcingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outflow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containing: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contained: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conjoined: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realization: Option<RealizationEntry>,
}

/// Hydro location of a nexus. A `station_id` makes it a gauge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(rename = "type", default)]
    pub location_type: HydroLocationType,
    pub station_id: Option<String>,
    pub geometry: Option<Geometry>,
    pub referenced_position: Option<Value>,
}

impl LocationConfig {
    pub fn to_location(&self, nexus_id: &str) -> NexusLocation {
        match &self.station_id {
            Some(station_id) => {
                let mut gauge = GaugeLocation::new(station_id, nexus_id);
                if let Some(geometry) = self.geometry {
                    gauge = gauge.with_geometry(geometry);
                }
                if let Some(position) = &self.referenced_position {
                    gauge = gauge.with_referenced_position(position.clone());
                }
                gauge.into()
            }
            None => {
                let mut location = HydroLocation::new(nexus_id).with_type(self.location_type);
                if let Some(geometry) = self.geometry {
                    location = location.with_geometry(geometry);
                }
                if let Some(position) = &self.referenced_position {
                    location = location.with_referenced_position(position.clone());
                }
                location.into()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NexusConfig {
    pub location: Option<LocationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealizationConfig {
    pub global: Option<GlobalConfig>,
    pub time: Option<TimeConfig>,
    #[serde(default)]
    pub catchments: BTreeMap<String, CatchmentConfig>,
    #[serde(default)]
    pub nexuses: BTreeMap<String, NexusConfig>,
    /// Directory relative forcing paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl RealizationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config file; relative forcing paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&json)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        log::info!(
            "read realization config {} with {} catchments",
            path.display(),
            config.catchments.len()
        );
        Ok(config)
    }

    /// `path` joined onto `base_dir` when relative.
    pub fn resolve(&self, path: &str) -> String {
        match &self.base_dir {
            Some(base) if Path::new(path).is_relative() => {
                base.join(path).to_string_lossy().into_owned()
            }
            _ => path.to_string(),
        }
    }

    pub fn global_formulation(&self) -> Option<&FormulationConfig> {
        self.global.as_ref().and_then(|g| g.formulations.first())
    }

    pub fn global_forcing(&self) -> Option<&ForcingConfig> {
        self.global.as_ref().and_then(|g| g.forcing.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "global": {
            "formulations": [{"name": "linear_reservoir", "params": {"k": 0.1}}],
            "forcing": {"path": "forcing/global.csv", "provider": "CsvPerFeature"}
        },
        "time": {"start_time": "2015-12-01 00:00:00", "end_time": "2015-12-30 23:00:00", "output_interval": 3600},
        "catchments": {
            "cat-88": {"forcing": {"path": "forcing/cat-88.csv"}, "outflow": "nex-26"},
            "cat-89": {"inflow": "nex-26", "realization": {"id": "ca-89", "kind": "catchment_area"}}
        },
        "nexuses": {
            "nex-26": {"location": {"station_id": "02146211", "geometry": [-80.9, 35.2]}}
        }
    }"#;

    #[test]
    fn test_parse_config() {
        let config = RealizationConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.catchments.len(), 2);
        let cat88 = &config.catchments["cat-88"];
        assert_eq!(cat88.forcing.as_ref().unwrap().path, "forcing/cat-88.csv");
        assert_eq!(cat88.outflow.as_deref(), Some("nex-26"));
        assert_eq!(config.global_formulation().unwrap().name, "linear_reservoir");
        assert_eq!(
            config.global_forcing().unwrap().extra["provider"],
            "CsvPerFeature"
        );
        let realization = config.catchments["cat-89"].realization.as_ref().unwrap();
        assert_eq!(realization.kind, RealizationKind::CatchmentArea);
    }

    #[test]
    fn test_time_bounds() {
        let config = RealizationConfig::from_json(CONFIG).unwrap();
        let (start, end) = config.time.unwrap().bounds().unwrap();
        assert!(start < end);
    }

    #[test]
    fn test_gauge_location_from_station_id() {
        let config = RealizationConfig::from_json(CONFIG).unwrap();
        let location = config.nexuses["nex-26"]
            .location
            .as_ref()
            .unwrap()
            .to_location("nex-26");
        assert_eq!(location.location_type(), HydroLocationType::HydrometricStation);
        assert_eq!(location.as_gauge().unwrap().station_id(), "02146211");
        assert_eq!(
            location.hydro_location().geometry(),
            Some(&Geometry::Coordinates(-80.9, 35.2))
        );
    }

    #[test]
    fn test_plain_location_keeps_type() {
        let location = LocationConfig {
            location_type: HydroLocationType::Confluence,
            ..LocationConfig::default()
        }
        .to_location("nex-1");
        assert!(location.as_gauge().is_none());
        assert_eq!(location.location_type(), HydroLocationType::Confluence);
    }

    #[test]
    fn test_resolve_relative_paths() {
        let mut config = RealizationConfig::default();
        assert_eq!(config.resolve("forcing/a.csv"), "forcing/a.csv");
        config.base_dir = Some(PathBuf::from("/data/run"));
        assert_eq!(config.resolve("forcing/a.csv"), "/data/run/forcing/a.csv");
        assert_eq!(config.resolve("/abs/a.csv"), "/abs/a.csv");
    }

    #[test]
    fn test_missing_config_file() {
        let result = RealizationConfig::from_path("/nonexistent/realization.json");
        assert!(matches!(result, Err(DataError::Io { .. })));
    }
}
