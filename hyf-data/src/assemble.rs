//! Build a [`HydroNetwork`] from a [`RealizationConfig`].
//!
//! Catchments declare their inflow and outflow nexus; each nexus's
//! receiving and contributing lists are derived from those declarations,
//! so an assembled network is wired consistently on both sides.

use crate::{config::RealizationConfig, error::Result};
use hyf_core::{
    Catchment, FormulationRegistry, HydroNetwork, NetworkBuilder, Nexus, Realization,
    RealizationKind,
};
use log::{debug, info};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Assemble the network described by `config`.
///
/// Catchments are declared in id order. A catchment without its own
/// forcing or formulation inherits the global one; formulations are
/// created through `registry` with global params as fallback. Nexuses
/// referenced but not listed under `nexuses` are created without a
/// location.
pub fn assemble(
    config: &RealizationConfig,
    registry: &FormulationRegistry,
) -> Result<HydroNetwork> {
    let mut builder = NetworkBuilder::new();
    let mut receiving: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut contributing: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let global_formulation = config.global_formulation();

    for (id, entry) in &config.catchments {
        let mut entry = entry.clone();
        if entry.forcing.is_none() {
            entry.forcing = config.global_forcing().cloned();
        }
        if let Some(forcing) = entry.forcing.as_mut() {
            forcing.path = config.resolve(&forcing.path);
        }

        let mut catchment = Catchment::new(id, serde_json::to_value(&entry)?)
            .with_contained(entry.contained.clone())
            .with_conjoined(entry.conjoined.clone());
        if let Some(nexus_id) = &entry.inflow {
            catchment = catchment.with_inflow(nexus_id);
            receiving.entry(nexus_id.clone()).or_default().push(id.clone());
        }
        if let Some(nexus_id) = &entry.outflow {
            catchment = catchment.with_outflow(nexus_id);
            contributing.entry(nexus_id.clone()).or_default().push(id.clone());
        }
        if let Some(parent) = &entry.containing {
            catchment = catchment.with_containing(parent);
        }

        if let Some(formulation) = entry.formulations.first().or(global_formulation) {
            let mut local = formulation.params.clone();
            local
                .entry("id")
                .or_insert_with(|| Value::String(format!("{}-{}", formulation.name, id)));
            let global_params = global_formulation
                .filter(|g| g.name == formulation.name)
                .map(|g| &g.params);
            let created = registry.create(&formulation.name, &local, global_params)?;
            debug!("{} uses formulation {}", id, created.id());
            catchment = catchment.with_formulation(created);
        }

        if let Some(realization) = &entry.realization {
            let catchment_id = Some(id.clone());
            let realization = match realization.kind {
                RealizationKind::General => Realization::new(&realization.id, catchment_id),
                RealizationKind::CatchmentArea => {
                    Realization::catchment_area(&realization.id, catchment_id)
                }
            };
            catchment = catchment.with_realization(realization);
        }

        builder.add_catchment(catchment);
    }

    let nexus_ids: BTreeSet<&String> = config
        .nexuses
        .keys()
        .chain(receiving.keys())
        .chain(contributing.keys())
        .collect();
    for nexus_id in nexus_ids {
        let location = config
            .nexuses
            .get(nexus_id)
            .and_then(|n| n.location.as_ref())
            .map(|l| l.to_location(nexus_id));
        let nexus = Nexus::new(nexus_id, location)
            .receiving(receiving.get(nexus_id).cloned().unwrap_or_default())
            .contributing(contributing.get(nexus_id).cloned().unwrap_or_default());
        builder.add_nexus(nexus);
    }

    let network = builder.build()?;
    info!(
        "assembled network: {} catchments, {} nexuses",
        network.catchment_count(),
        network.nexus_count()
    );
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DataError, forcing::forcing_path};
    use hyf_core::{HyError, HydroLocationType};
    use std::path::PathBuf;

    const CONFIG: &str = r#"{
        "global": {
            "formulations": [{"name": "linear_reservoir", "params": {"k": 0.1}}],
            "forcing": {"path": "forcing/global.csv"}
        },
        "catchments": {
            "cat-1": {"outflow": "nex-1", "forcing": {"path": "forcing/cat-1.csv"}},
            "cat-2": {"outflow": "nex-1",
                      "formulations": [{"name": "linear_reservoir", "params": {"k": 0.5}}]},
            "cat-3": {"inflow": "nex-1", "contained": ["cat-3a"],
                      "realization": {"id": "ca-3", "kind": "catchment_area"}},
            "cat-3a": {"containing": "cat-3"}
        },
        "nexuses": {
            "nex-1": {"location": {"type": "confluence"}},
            "nex-9": {"location": {"station_id": "02146211"}}
        }
    }"#;

    fn network() -> HydroNetwork {
        let mut config = RealizationConfig::from_json(CONFIG).unwrap();
        config.base_dir = Some(PathBuf::from("/data/run"));
        assemble(&config, &FormulationRegistry::with_builtins()).unwrap()
    }

    #[test]
    fn test_nexus_relations_derived_from_catchments() {
        let network = network();
        let nexus = network.nexus("nex-1").unwrap();
        assert_eq!(nexus.contributing_catchments(), &["cat-1", "cat-2"]);
        assert_eq!(nexus.receiving_catchments(), &["cat-3"]);
        assert_eq!(network.upper_catchments("cat-3").unwrap(), &["cat-1", "cat-2"]);
        assert_eq!(network.lower_catchments("cat-1").unwrap(), &["cat-3"]);
        assert!(network.wiring_issues().is_empty());
    }

    #[test]
    fn test_declared_nexus_without_catchments() {
        let network = network();
        let gauge = network.nexus("nex-9").unwrap();
        assert!(gauge.receiving_catchments().is_empty());
        assert_eq!(
            gauge.hydro_location().unwrap().location_type(),
            HydroLocationType::HydrometricStation
        );
        assert_eq!(
            network.nexus("nex-1").unwrap().hydro_location().unwrap().location_type(),
            HydroLocationType::Confluence
        );
    }

    #[test]
    fn test_formulations_attached_and_back_linked() {
        let network = network();
        let own = network.catchment("cat-2").unwrap().formulation().unwrap();
        assert_eq!(own.id(), "linear_reservoir-cat-2");
        assert_eq!(own.catchment(), Some("cat-2"));

        let inherited = network.catchment("cat-3a").unwrap().formulation().unwrap();
        assert_eq!(inherited.kind(), "linear_reservoir");
        assert_eq!(inherited.catchment(), Some("cat-3a"));
    }

    #[test]
    fn test_forcing_inherited_and_resolved() {
        let network = network();
        let own = network.catchment("cat-1").unwrap();
        assert_eq!(
            forcing_path(own.id(), own.params()).unwrap(),
            PathBuf::from("/data/run/forcing/cat-1.csv")
        );
        let inherited = network.catchment("cat-2").unwrap();
        assert_eq!(
            forcing_path(inherited.id(), inherited.params()).unwrap(),
            PathBuf::from("/data/run/forcing/global.csv")
        );
    }

    #[test]
    fn test_containment_and_realization() {
        let network = network();
        let cat3 = network.catchment("cat-3").unwrap();
        assert_eq!(cat3.contained_catchments(), &["cat-3a"]);
        let realization = cat3.realization().unwrap();
        assert!(realization.is_catchment_area());
        assert_eq!(realization.catchment_id(), Some("cat-3"));
        assert_eq!(
            network.catchment("cat-3a").unwrap().containing_catchment(),
            Some("cat-3")
        );
    }

    #[test]
    fn test_unknown_formulation_type_fails_assembly() {
        let config = RealizationConfig::from_json(
            r#"{"catchments": {"cat-1": {"formulations": [{"name": "hymod"}]}}}"#,
        )
        .unwrap();
        let result = assemble(&config, &FormulationRegistry::with_builtins());
        assert!(matches!(
            result,
            Err(DataError::Core(HyError::UnknownFormulationType(_)))
        ));
    }

    #[test]
    fn test_dangling_containment_fails_assembly() {
        let config = RealizationConfig::from_json(
            r#"{"catchments": {"cat-1": {"containing": "cat-404"}}}"#,
        )
        .unwrap();
        let result = assemble(&config, &FormulationRegistry::new());
        assert!(matches!(
            result,
            Err(DataError::Core(HyError::DanglingReference { .. }))
        ));
    }
}
