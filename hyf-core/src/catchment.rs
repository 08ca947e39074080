use crate::{
    formulation::Formulation,
    realization::Realization,
    relations::{normalize, Relations},
};
use serde_json::Value;

/// A drainage area: one node of the surface-water network.
///
/// Relations are held as ids and resolved by the owning
/// [`HydroNetwork`](crate::HydroNetwork). Everything except the
/// formulation and realization is fixed once the catchment is built.
#[derive(Debug)]
pub struct Catchment {
    id: String,
    params: Value,
    inflow: Option<String>,
    outflow: Option<String>,
    contained_catchments: Relations,
    containing_catchment: Option<String>,
    conjoined_catchments: Relations,
    formulation: Option<Box<dyn Formulation>>,
    realization: Option<Realization>,
}

impl Catchment {
    /// `params` is carried for collaborators such as the forcing loader
    /// and is not interpreted here.
    pub fn new(id: impl Into<String>, params: Value) -> Self {
        Catchment {
            id: id.into(),
            params,
            inflow: None,
            outflow: None,
            contained_catchments: Relations::empty(),
            containing_catchment: None,
            conjoined_catchments: Relations::empty(),
            formulation: None,
            realization: None,
        }
    }

    pub fn with_inflow(mut self, nexus_id: impl Into<String>) -> Self {
        self.inflow = Some(nexus_id.into());
        self
    }

    pub fn with_outflow(mut self, nexus_id: impl Into<String>) -> Self {
        self.outflow = Some(nexus_id.into());
        self
    }

    pub fn with_contained(mut self, catchments: impl Into<Relations>) -> Self {
        self.contained_catchments = normalize(catchments);
        self
    }

    pub fn with_containing(mut self, catchment_id: impl Into<String>) -> Self {
        self.containing_catchment = Some(catchment_id.into());
        self
    }

    pub fn with_conjoined(mut self, catchments: impl Into<Relations>) -> Self {
        self.conjoined_catchments = normalize(catchments);
        self
    }

    /// Attach `formulation` and point its back-reference at this catchment.
    pub fn with_formulation(mut self, mut formulation: Box<dyn Formulation>) -> Self {
        formulation.set_catchment(&self.id);
        self.formulation = Some(formulation);
        self
    }

    pub fn with_realization(mut self, realization: Realization) -> Self {
        self.realization = Some(realization);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Id of the nexus feeding this catchment; `None` for headwaters.
    pub fn inflow(&self) -> Option<&str> {
        self.inflow.as_deref()
    }

    /// Id of the nexus this catchment drains to; `None` for sinks.
    pub fn outflow(&self) -> Option<&str> {
        self.outflow.as_deref()
    }

    pub fn contained_catchments(&self) -> &Relations {
        &self.contained_catchments
    }

    pub fn containing_catchment(&self) -> Option<&str> {
        self.containing_catchment.as_deref()
    }

    pub fn conjoined_catchments(&self) -> &Relations {
        &self.conjoined_catchments
    }

    pub fn formulation(&self) -> Option<&dyn Formulation> {
        self.formulation.as_deref()
    }

    pub fn formulation_mut(&mut self) -> Option<&mut (dyn Formulation + 'static)> {
        self.formulation.as_deref_mut()
    }

    /// Replace the formulation, returning the previous one.
    ///
    /// Unlike [`Catchment::with_formulation`] this does not touch the
    /// formulation's back-reference.
    pub fn set_formulation(
        &mut self,
        formulation: Box<dyn Formulation>,
    ) -> Option<Box<dyn Formulation>> {
        self.formulation.replace(formulation)
    }

    pub fn realization(&self) -> Option<&Realization> {
        self.realization.as_ref()
    }

    /// Replace the realization, returning the previous one.
    pub fn set_realization(&mut self, realization: Realization) -> Option<Realization> {
        self.realization.replace(realization)
    }
}
