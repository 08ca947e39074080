//! Report the structure of an assembled network.

use hyf_core::{FormulationRegistry, HyError, HydroNetwork, Relations};
use hyf_data::{assemble, RealizationConfig};
use log::{info, warn};

/// Assemble the network in `config_path` and print one line per catchment.
pub fn run_inspect(config_path: &str) -> anyhow::Result<()> {
    let config = RealizationConfig::from_path(config_path)?;
    let network = assemble(&config, &FormulationRegistry::with_builtins())?;
    info!(
        "{} catchments, {} nexuses, {} headwaters, {} sinks",
        network.catchment_count(),
        network.nexus_count(),
        network.headwaters().count(),
        network.sinks().count()
    );
    for line in describe(&network)? {
        println!("{}", line);
    }
    for issue in network.wiring_issues() {
        warn!("{}", issue);
    }
    Ok(())
}

fn neighbours(result: hyf_core::Result<&Relations>, absent: &str) -> anyhow::Result<String> {
    match result {
        Ok(ids) if ids.is_empty() => Ok("-".to_string()),
        Ok(ids) => Ok(ids.join(",")),
        Err(HyError::MissingRelation { .. }) => Ok(absent.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// One line per catchment: id, flow neighbours, formulation and realization.
pub fn describe(network: &HydroNetwork) -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::with_capacity(network.catchment_count());
    for catchment in network.catchments() {
        let upper = neighbours(network.upper_catchments(catchment.id()), "(headwater)")?;
        let lower = neighbours(network.lower_catchments(catchment.id()), "(sink)")?;
        let formulation = catchment
            .formulation()
            .map(|f| format!("{}:{}", f.kind(), f.id()))
            .unwrap_or_else(|| "-".to_string());
        let realization = catchment.realization().map(|r| r.id()).unwrap_or("-");
        lines.push(format!(
            "{} upper={} lower={} formulation={} realization={}",
            catchment.id(),
            upper,
            lower,
            formulation,
            realization
        ));
    }
    Ok(lines)
}
