//! Arena storage for a surface-water network.
//!
//! Catchments and nexuses are declared into a [`NetworkBuilder`] in any
//! order, referring to each other by id. [`NetworkBuilder::build`]
//! resolves every reference at once and either yields a complete
//! [`HydroNetwork`] or fails without producing one.
//!
//! Two-sided wiring (a catchment's outflow nexus listing that catchment
//! as contributing, and so on) is left to the caller.
//! [`HydroNetwork::wiring_issues`] reports where the two sides disagree.

use crate::{
    catchment::Catchment,
    error::{HyError, NodeKind, Relation, Result},
    nexus::Nexus,
    relations::Relations,
};
use log::debug;
use std::{collections::HashMap, fmt};

/// Collects nodes before they are resolved into a [`HydroNetwork`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    catchments: Vec<Catchment>,
    nexuses: Vec<Nexus>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_catchment(&mut self, catchment: Catchment) -> &mut Self {
        self.catchments.push(catchment);
        self
    }

    pub fn add_nexus(&mut self, nexus: Nexus) -> &mut Self {
        self.nexuses.push(nexus);
        self
    }

    pub fn build(self) -> Result<HydroNetwork> {
        let catchment_index = index_ids(
            NodeKind::Catchment,
            self.catchments.iter().map(Catchment::id),
        )?;
        let nexus_index = index_ids(NodeKind::Nexus, self.nexuses.iter().map(Nexus::id))?;

        let catchment_ref = |from_kind: NodeKind, from: &str, to: &str| -> Result<()> {
            if catchment_index.contains_key(to) {
                Ok(())
            } else {
                Err(dangling(from_kind, from, NodeKind::Catchment, to))
            }
        };

        for c in &self.catchments {
            for nexus_id in [c.inflow(), c.outflow()].into_iter().flatten() {
                if !nexus_index.contains_key(nexus_id) {
                    return Err(dangling(NodeKind::Catchment, c.id(), NodeKind::Nexus, nexus_id));
                }
            }
            let related = c
                .contained_catchments()
                .iter()
                .map(String::as_str)
                .chain(c.conjoined_catchments().iter().map(String::as_str))
                .chain(c.containing_catchment());
            for other in related {
                if other == c.id() {
                    return Err(HyError::SelfReference(c.id().to_string()));
                }
                catchment_ref(NodeKind::Catchment, c.id(), other)?;
            }
        }

        for n in &self.nexuses {
            for other in n
                .receiving_catchments()
                .iter()
                .chain(n.contributing_catchments().iter())
            {
                catchment_ref(NodeKind::Nexus, n.id(), other)?;
            }
        }

        debug!(
            "built network with {} catchments and {} nexuses",
            self.catchments.len(),
            self.nexuses.len()
        );
        Ok(HydroNetwork {
            catchments: self.catchments,
            nexuses: self.nexuses,
            catchment_index,
            nexus_index,
        })
    }
}

fn index_ids<'a>(
    kind: NodeKind,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.to_string(), i).is_some() {
            return Err(HyError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}

fn dangling(from_kind: NodeKind, from: &str, to_kind: NodeKind, to: &str) -> HyError {
    HyError::DanglingReference {
        from_kind,
        from: from.to_string(),
        to_kind,
        to: to.to_string(),
    }
}

/// A one-sided link found by [`HydroNetwork::wiring_issues`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringIssue {
    /// The catchment drains to the nexus, which does not list it as contributing
    OutflowNotContributing { catchment: String, nexus: String },
    /// The catchment is fed by the nexus, which does not list it as receiving
    InflowNotReceiving { catchment: String, nexus: String },
    /// The nexus lists the catchment as contributing, whose outflow is elsewhere
    ContributingWithoutOutflow { nexus: String, catchment: String },
    /// The nexus lists the catchment as receiving, whose inflow is elsewhere
    ReceivingWithoutInflow { nexus: String, catchment: String },
    /// `child` names `parent` as containing, which does not list `child`
    ContainmentOneSided { parent: String, child: String },
    /// `catchment` lists `peer` as conjoined, but not the reverse
    ConjoinedOneSided { catchment: String, peer: String },
}

impl fmt::Display for WiringIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WiringIssue::OutflowNotContributing { catchment, nexus } => write!(
                f,
                "{} drains to {} but is not among its contributing catchments",
                catchment, nexus
            ),
            WiringIssue::InflowNotReceiving { catchment, nexus } => write!(
                f,
                "{} is fed by {} but is not among its receiving catchments",
                catchment, nexus
            ),
            WiringIssue::ContributingWithoutOutflow { nexus, catchment } => write!(
                f,
                "{} lists {} as contributing but its outflow is elsewhere",
                nexus, catchment
            ),
            WiringIssue::ReceivingWithoutInflow { nexus, catchment } => write!(
                f,
                "{} lists {} as receiving but its inflow is elsewhere",
                nexus, catchment
            ),
            WiringIssue::ContainmentOneSided { parent, child } => write!(
                f,
                "containment between {} and {} is recorded on one side only",
                parent, child
            ),
            WiringIssue::ConjoinedOneSided { catchment, peer } => write!(
                f,
                "{} is conjoined with {} but not the reverse",
                catchment, peer
            ),
        }
    }
}

/// A resolved surface-water network.
///
/// Node fields cannot change; [`HydroNetwork::catchment_mut`] only gives
/// access to a catchment's formulation and realization setters.
#[derive(Debug)]
pub struct HydroNetwork {
    catchments: Vec<Catchment>,
    nexuses: Vec<Nexus>,
    catchment_index: HashMap<String, usize>,
    nexus_index: HashMap<String, usize>,
}

impl HydroNetwork {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    pub fn catchment(&self, id: &str) -> Option<&Catchment> {
        self.catchment_index.get(id).map(|&i| &self.catchments[i])
    }

    pub fn catchment_mut(&mut self, id: &str) -> Option<&mut Catchment> {
        let i = *self.catchment_index.get(id)?;
        Some(&mut self.catchments[i])
    }

    pub fn nexus(&self, id: &str) -> Option<&Nexus> {
        self.nexus_index.get(id).map(|&i| &self.nexuses[i])
    }

    /// Catchments in declaration order.
    pub fn catchments(&self) -> impl Iterator<Item = &Catchment> {
        self.catchments.iter()
    }

    /// Nexuses in declaration order.
    pub fn nexuses(&self) -> impl Iterator<Item = &Nexus> {
        self.nexuses.iter()
    }

    pub fn catchment_count(&self) -> usize {
        self.catchments.len()
    }

    pub fn nexus_count(&self) -> usize {
        self.nexuses.len()
    }

    fn require_catchment(&self, id: &str) -> Result<&Catchment> {
        self.catchment(id)
            .ok_or_else(|| HyError::UnknownCatchment(id.to_string()))
    }

    fn require_nexus(&self, id: &str) -> Result<&Nexus> {
        self.nexus(id)
            .ok_or_else(|| HyError::UnknownNexus(id.to_string()))
    }

    /// Contributing catchments of the catchment's inflow nexus.
    ///
    /// Fails with [`HyError::MissingRelation`] for a headwater catchment
    /// rather than returning an empty sequence.
    pub fn upper_catchments(&self, catchment_id: &str) -> Result<&Relations> {
        let catchment = self.require_catchment(catchment_id)?;
        let inflow = catchment.inflow().ok_or_else(|| HyError::MissingRelation {
            catchment: catchment_id.to_string(),
            relation: Relation::Inflow,
        })?;
        Ok(self.require_nexus(inflow)?.contributing_catchments())
    }

    /// Receiving catchments of the catchment's outflow nexus.
    ///
    /// Fails with [`HyError::MissingRelation`] for a sink catchment.
    pub fn lower_catchments(&self, catchment_id: &str) -> Result<&Relations> {
        let catchment = self.require_catchment(catchment_id)?;
        let outflow = catchment.outflow().ok_or_else(|| HyError::MissingRelation {
            catchment: catchment_id.to_string(),
            relation: Relation::Outflow,
        })?;
        Ok(self.require_nexus(outflow)?.receiving_catchments())
    }

    /// Catchments with no inflow nexus.
    pub fn headwaters(&self) -> impl Iterator<Item = &Catchment> {
        self.catchments.iter().filter(|c| c.inflow().is_none())
    }

    /// Catchments with no outflow nexus.
    pub fn sinks(&self) -> impl Iterator<Item = &Catchment> {
        self.catchments.iter().filter(|c| c.outflow().is_none())
    }

    /// Every link recorded on only one of its two sides.
    pub fn wiring_issues(&self) -> Vec<WiringIssue> {
        let mut issues = Vec::new();

        for c in &self.catchments {
            if let Some(n) = c.outflow().and_then(|id| self.nexus(id)) {
                if !n.contributing_catchments().contains_id(c.id()) {
                    issues.push(WiringIssue::OutflowNotContributing {
                        catchment: c.id().to_string(),
                        nexus: n.id().to_string(),
                    });
                }
            }
            if let Some(n) = c.inflow().and_then(|id| self.nexus(id)) {
                if !n.receiving_catchments().contains_id(c.id()) {
                    issues.push(WiringIssue::InflowNotReceiving {
                        catchment: c.id().to_string(),
                        nexus: n.id().to_string(),
                    });
                }
            }
            if let Some(parent) = c.containing_catchment().and_then(|id| self.catchment(id)) {
                if !parent.contained_catchments().contains_id(c.id()) {
                    issues.push(WiringIssue::ContainmentOneSided {
                        parent: parent.id().to_string(),
                        child: c.id().to_string(),
                    });
                }
            }
            for child in c.contained_catchments() {
                if self
                    .catchment(child)
                    .is_some_and(|ch| ch.containing_catchment() != Some(c.id()))
                {
                    issues.push(WiringIssue::ContainmentOneSided {
                        parent: c.id().to_string(),
                        child: child.clone(),
                    });
                }
            }
            for peer in c.conjoined_catchments() {
                if self
                    .catchment(peer)
                    .is_some_and(|p| !p.conjoined_catchments().contains_id(c.id()))
                {
                    issues.push(WiringIssue::ConjoinedOneSided {
                        catchment: c.id().to_string(),
                        peer: peer.clone(),
                    });
                }
            }
        }

        for n in &self.nexuses {
            for id in n.contributing_catchments() {
                if self
                    .catchment(id)
                    .is_some_and(|c| c.outflow() != Some(n.id()))
                {
                    issues.push(WiringIssue::ContributingWithoutOutflow {
                        nexus: n.id().to_string(),
                        catchment: id.clone(),
                    });
                }
            }
            for id in n.receiving_catchments() {
                if self.catchment(id).is_some_and(|c| c.inflow() != Some(n.id())) {
                    issues.push(WiringIssue::ReceivingWithoutInflow {
                        nexus: n.id().to_string(),
                        catchment: id.clone(),
                    });
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{formulation::tests::TestFormulation, realization::Realization};
    use serde_json::json;

    /// cat-1 -> nex-1 -> (cat-2, cat-3), wired on both sides.
    fn fork() -> HydroNetwork {
        let mut builder = HydroNetwork::builder();
        builder
            .add_catchment(Catchment::new("cat-2", json!({})).with_inflow("nex-1"))
            .add_nexus(
                Nexus::new("nex-1", None)
                    .receiving(["cat-2", "cat-3"])
                    .contributing(vec!["cat-1"]),
            )
            .add_catchment(Catchment::new("cat-1", json!({})).with_outflow("nex-1"))
            .add_catchment(Catchment::new("cat-3", json!({})).with_inflow("nex-1"));
        builder.build().unwrap()
    }

    #[test]
    fn test_lower_catchments_is_outflow_receiving() {
        let network = fork();
        let lower = network.lower_catchments("cat-1").unwrap();
        assert_eq!(lower, network.nexus("nex-1").unwrap().receiving_catchments());
        assert_eq!(lower, &["cat-2", "cat-3"]);
    }

    #[test]
    fn test_upper_catchments_is_inflow_contributing() {
        let network = fork();
        assert_eq!(network.upper_catchments("cat-3").unwrap(), &["cat-1"]);
    }

    #[test]
    fn test_upper_without_inflow_fails() {
        let network = fork();
        let result = network.upper_catchments("cat-1");
        assert!(matches!(
            result,
            Err(HyError::MissingRelation {
                relation: Relation::Inflow,
                ..
            })
        ));
        let result = network.lower_catchments("cat-2");
        assert!(matches!(
            result,
            Err(HyError::MissingRelation {
                relation: Relation::Outflow,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_catchment() {
        let network = fork();
        assert!(matches!(
            network.lower_catchments("cat-9"),
            Err(HyError::UnknownCatchment(_))
        ));
    }

    #[test]
    fn test_outflow_to_empty_nexus() {
        let mut builder = NetworkBuilder::new();
        builder
            .add_nexus(Nexus::new("nex-1", None).receiving(Vec::<String>::new()))
            .add_catchment(Catchment::new("cat-1", json!({})).with_outflow("nex-1"));
        let network = builder.build().unwrap();
        assert!(network.lower_catchments("cat-1").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut builder = NetworkBuilder::new();
        builder
            .add_catchment(Catchment::new("cat-1", json!({})))
            .add_catchment(Catchment::new("cat-1", json!({})));
        assert!(matches!(
            builder.build(),
            Err(HyError::DuplicateId {
                kind: NodeKind::Catchment,
                ..
            })
        ));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_catchment(Catchment::new("cat-1", json!({})).with_outflow("nex-404"));
        match builder.build() {
            Err(HyError::DanglingReference { to_kind, to, .. }) => {
                assert_eq!(to_kind, NodeKind::Nexus);
                assert_eq!(to, "nex-404");
            }
            other => panic!("expected dangling reference, got {:?}", other),
        }

        let mut builder = NetworkBuilder::new();
        builder.add_nexus(Nexus::new("nex-1", None).contributing("cat-404"));
        assert!(matches!(
            builder.build(),
            Err(HyError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_self_containment_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_catchment(Catchment::new("cat-1", json!({})).with_contained("cat-1"));
        assert!(matches!(builder.build(), Err(HyError::SelfReference(_))));
    }

    #[test]
    fn test_consistent_network_has_no_issues() {
        assert!(fork().wiring_issues().is_empty());
    }

    #[test]
    fn test_one_sided_links_are_reported() {
        let mut builder = NetworkBuilder::new();
        builder
            .add_nexus(Nexus::new("nex-1", None))
            .add_catchment(
                Catchment::new("cat-1", json!({}))
                    .with_outflow("nex-1")
                    .with_conjoined("cat-2")
                    .with_contained(["cat-3"]),
            )
            .add_catchment(Catchment::new("cat-2", json!({})))
            .add_catchment(Catchment::new("cat-3", json!({})));
        let issues = builder.build().unwrap().wiring_issues();
        assert_eq!(
            issues,
            vec![
                WiringIssue::OutflowNotContributing {
                    catchment: "cat-1".to_string(),
                    nexus: "nex-1".to_string(),
                },
                WiringIssue::ContainmentOneSided {
                    parent: "cat-1".to_string(),
                    child: "cat-3".to_string(),
                },
                WiringIssue::ConjoinedOneSided {
                    catchment: "cat-1".to_string(),
                    peer: "cat-2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_headwaters_and_sinks() {
        let network = fork();
        let headwaters: Vec<&str> = network.headwaters().map(Catchment::id).collect();
        let sinks: Vec<&str> = network.sinks().map(Catchment::id).collect();
        assert_eq!(headwaters, vec!["cat-1"]);
        assert_eq!(sinks, vec!["cat-2", "cat-3"]);
    }

    #[test]
    fn test_attach_after_build() {
        let mut network = fork();
        let catchment = network.catchment_mut("cat-2").unwrap();
        catchment.set_formulation(Box::new(TestFormulation::new("form-2", Some("cat-2"))));
        catchment.set_realization(Realization::catchment_area("ca-2", Some("cat-2".to_string())));

        let catchment = network.catchment("cat-2").unwrap();
        assert_eq!(catchment.formulation().unwrap().id(), "form-2");
        assert_eq!(catchment.realization().unwrap().catchment_id(), Some("cat-2"));
    }
}
