use crate::{
    location::NexusLocation,
    relations::{normalize, Relations},
};

/// A confluence, diversion or observation point joining catchments.
///
/// Receiving catchments lie downstream of the nexus, contributing
/// catchments upstream. Both sequences are fixed once the nexus is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Nexus {
    id: String,
    hydro_location: Option<NexusLocation>,
    receiving_catchments: Relations,
    contributing_catchments: Relations,
}

impl Nexus {
    pub fn new(id: impl Into<String>, hydro_location: Option<NexusLocation>) -> Self {
        Nexus {
            id: id.into(),
            hydro_location,
            receiving_catchments: Relations::empty(),
            contributing_catchments: Relations::empty(),
        }
    }

    pub fn receiving(mut self, catchments: impl Into<Relations>) -> Self {
        self.receiving_catchments = normalize(catchments);
        self
    }

    pub fn contributing(mut self, catchments: impl Into<Relations>) -> Self {
        self.contributing_catchments = normalize(catchments);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn hydro_location(&self) -> Option<&NexusLocation> {
        self.hydro_location.as_ref()
    }

    /// Catchments downstream of this nexus
    pub fn receiving_catchments(&self) -> &Relations {
        &self.receiving_catchments
    }

    /// Catchments upstream of this nexus
    pub fn contributing_catchments(&self) -> &Relations {
        &self.contributing_catchments
    }
}
