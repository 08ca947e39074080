use crate::{
    error::{HyError, Result},
    series::TimeSeries,
    service::HydrometricService,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The kind of physical feature found at a hydro location.
///
/// Names follow the HY_Features `HydroLocationType` code list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HydroLocationType {
    #[default]
    #[serde(rename = "UNDEFINED")]
    Undefined,
    Barrage,
    Bifurcation,
    CatchmentOutlet,
    Confluence,
    Dam,
    DiversionOfWater,
    ExtractionWell,
    Fork,
    HydrometricStation,
    InfiltrationWell,
    InjectionWell,
    InletStructure,
    Intake,
    OutletStructure,
    Ponor,
    PourPoint,
    Rapids,
    ReferenceClimatologicalStation,
    RiverMouth,
    Sinkhole,
    Source,
    Spring,
    Waterfall,
    Weir,
}

impl HydroLocationType {
    pub const ALL: [HydroLocationType; 25] = [
        HydroLocationType::Undefined,
        HydroLocationType::Barrage,
        HydroLocationType::Bifurcation,
        HydroLocationType::CatchmentOutlet,
        HydroLocationType::Confluence,
        HydroLocationType::Dam,
        HydroLocationType::DiversionOfWater,
        HydroLocationType::ExtractionWell,
        HydroLocationType::Fork,
        HydroLocationType::HydrometricStation,
        HydroLocationType::InfiltrationWell,
        HydroLocationType::InjectionWell,
        HydroLocationType::InletStructure,
        HydroLocationType::Intake,
        HydroLocationType::OutletStructure,
        HydroLocationType::Ponor,
        HydroLocationType::PourPoint,
        HydroLocationType::Rapids,
        HydroLocationType::ReferenceClimatologicalStation,
        HydroLocationType::RiverMouth,
        HydroLocationType::Sinkhole,
        HydroLocationType::Source,
        HydroLocationType::Spring,
        HydroLocationType::Waterfall,
        HydroLocationType::Weir,
    ];

    /// The code-list name, e.g. `hydrometricStation`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HydroLocationType::Undefined => "UNDEFINED",
            HydroLocationType::Barrage => "barrage",
            HydroLocationType::Bifurcation => "bifurcation",
            HydroLocationType::CatchmentOutlet => "catchmentOutlet",
            HydroLocationType::Confluence => "confluence",
            HydroLocationType::Dam => "dam",
            HydroLocationType::DiversionOfWater => "diversionOfWater",
            HydroLocationType::ExtractionWell => "extractionWell",
            HydroLocationType::Fork => "fork",
            HydroLocationType::HydrometricStation => "hydrometricStation",
            HydroLocationType::InfiltrationWell => "infiltrationWell",
            HydroLocationType::InjectionWell => "injectionWell",
            HydroLocationType::InletStructure => "inletStructure",
            HydroLocationType::Intake => "intake",
            HydroLocationType::OutletStructure => "outletStructure",
            HydroLocationType::Ponor => "ponor",
            HydroLocationType::PourPoint => "pourPoint",
            HydroLocationType::Rapids => "rapids",
            HydroLocationType::ReferenceClimatologicalStation => "referenceClimatologicalStation",
            HydroLocationType::RiverMouth => "riverMouth",
            HydroLocationType::Sinkhole => "sinkhole",
            HydroLocationType::Source => "source",
            HydroLocationType::Spring => "spring",
            HydroLocationType::Waterfall => "waterfall",
            HydroLocationType::Weir => "weir",
        }
    }
}

impl fmt::Display for HydroLocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HydroLocationType {
    type Err = HyError;

    fn from_str(s: &str) -> Result<Self> {
        HydroLocationType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| HyError::UnknownLocationType(s.to_string()))
    }
}

/// Location geometry: a structured point or a bare coordinate pair.
///
/// Neither form is validated; the values are carried as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    // Tried first: an untagged struct variant would also accept `[x, y]`.
    Coordinates(f64, f64),
    Point { x: f64, y: f64 },
}

impl From<(f64, f64)> for Geometry {
    fn from((x, y): (f64, f64)) -> Self {
        Geometry::Coordinates(x, y)
    }
}

/// Geospatial and typed metadata describing the feature at a nexus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydroLocation {
    realized_nexus: String,
    geometry: Option<Geometry>,
    location_type: HydroLocationType,
    referenced_position: Option<serde_json::Value>,
}

impl HydroLocation {
    pub fn new(realized_nexus: impl Into<String>) -> Self {
        HydroLocation {
            realized_nexus: realized_nexus.into(),
            geometry: None,
            location_type: HydroLocationType::Undefined,
            referenced_position: None,
        }
    }

    pub fn with_geometry(mut self, geometry: impl Into<Geometry>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    pub fn with_type(mut self, location_type: HydroLocationType) -> Self {
        self.location_type = location_type;
        self
    }

    /// Position measured from a known referent (linear referencing).
    /// Not interpreted here.
    pub fn with_referenced_position(mut self, position: serde_json::Value) -> Self {
        self.referenced_position = Some(position);
        self
    }

    /// Id of the nexus this location realizes
    pub fn realized_nexus(&self) -> &str {
        &self.realized_nexus
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn location_type(&self) -> HydroLocationType {
        self.location_type
    }

    pub fn referenced_position(&self) -> Option<&serde_json::Value> {
        self.referenced_position.as_ref()
    }
}

/// A hydrometric station: a hydro location backed by observed data.
///
/// The location type is always [`HydroLocationType::HydrometricStation`];
/// there is no way to change it, and a serialized `location_type` is
/// ignored when reading one back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GaugeRecord")]
pub struct GaugeLocation {
    station_id: String,
    location: HydroLocation,
}

impl GaugeLocation {
    pub fn new(station_id: impl Into<String>, realized_nexus: impl Into<String>) -> Self {
        GaugeLocation {
            station_id: station_id.into(),
            location: HydroLocation::new(realized_nexus)
                .with_type(HydroLocationType::HydrometricStation),
        }
    }

    pub fn with_geometry(mut self, geometry: impl Into<Geometry>) -> Self {
        self.location = self.location.with_geometry(geometry);
        self
    }

    pub fn with_referenced_position(mut self, position: serde_json::Value) -> Self {
        self.location = self.location.with_referenced_position(position);
        self
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn location(&self) -> &HydroLocation {
        &self.location
    }

    pub fn location_type(&self) -> HydroLocationType {
        self.location.location_type()
    }

    /// Fetch observations for this station.
    ///
    /// `start`/`end` are passed through untouched; leaving both out asks
    /// the service for its default range. Every call issues a new request
    /// and any service failure is returned as-is.
    pub async fn get_data<S: HydrometricService>(
        &self,
        service: &S,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<TimeSeries> {
        log::debug!(
            "requesting observations for station {} ({:?} .. {:?})",
            self.station_id,
            start,
            end
        );
        service.fetch(&self.station_id, start, end).await
    }
}

/// Serialized form of a gauge; carries no location type.
#[derive(Deserialize)]
struct GaugeRecord {
    station_id: String,
    location: GaugeSite,
}

#[derive(Deserialize)]
struct GaugeSite {
    realized_nexus: String,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    referenced_position: Option<serde_json::Value>,
}

impl From<GaugeRecord> for GaugeLocation {
    fn from(record: GaugeRecord) -> Self {
        let site = record.location;
        let mut gauge = GaugeLocation::new(record.station_id, site.realized_nexus);
        if let Some(geometry) = site.geometry {
            gauge = gauge.with_geometry(geometry);
        }
        if let Some(position) = site.referenced_position {
            gauge = gauge.with_referenced_position(position);
        }
        gauge
    }
}

impl AsRef<HydroLocation> for GaugeLocation {
    fn as_ref(&self) -> &HydroLocation {
        &self.location
    }
}

/// The location attached to a nexus: either plain metadata or a gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NexusLocation {
    Gauge(GaugeLocation),
    Plain(HydroLocation),
}

impl NexusLocation {
    pub fn hydro_location(&self) -> &HydroLocation {
        match self {
            NexusLocation::Gauge(gauge) => gauge.location(),
            NexusLocation::Plain(location) => location,
        }
    }

    pub fn as_gauge(&self) -> Option<&GaugeLocation> {
        match self {
            NexusLocation::Gauge(gauge) => Some(gauge),
            NexusLocation::Plain(_) => None,
        }
    }

    pub fn location_type(&self) -> HydroLocationType {
        self.hydro_location().location_type()
    }
}

impl From<HydroLocation> for NexusLocation {
    fn from(location: HydroLocation) -> Self {
        NexusLocation::Plain(location)
    }
}

impl From<GaugeLocation> for NexusLocation {
    fn from(gauge: GaugeLocation) -> Self {
        NexusLocation::Gauge(gauge)
    }
}
