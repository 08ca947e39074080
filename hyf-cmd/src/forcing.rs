//! Summarise catchment forcing data.

use anyhow::Context;
use chrono::NaiveDateTime;
use hyf_core::{FormulationRegistry, TimeSeries};
use hyf_data::{assemble, forcing::load_for_catchment, ForcingTable, RealizationConfig};
use hyf_utils::dates::format_datetime;
use log::info;

/// Load the forcing of `catchment_id` and print a summary per variable,
/// restricted to the config's simulation window when it has one.
pub fn run_forcing(
    config_path: &str,
    catchment_id: &str,
    variable: Option<&str>,
) -> anyhow::Result<()> {
    let config = RealizationConfig::from_path(config_path)?;
    let window = config.time.as_ref().map(|t| t.bounds()).transpose()?;
    let network = assemble(&config, &FormulationRegistry::with_builtins())?;
    let catchment = network
        .catchment(catchment_id)
        .with_context(|| format!("catchment {} not in {}", catchment_id, config_path))?;
    let table = load_for_catchment(catchment)?;
    info!(
        "{}: {} forcing rows, variables {:?}",
        catchment_id,
        table.len(),
        table.variables()
    );
    for line in summarize(&table, variable, window)? {
        println!("{}", line);
    }
    Ok(())
}

/// `name: n samples, first .. last, min/mean/max` for each variable.
pub fn summarize(
    table: &ForcingTable,
    variable: Option<&str>,
    window: Option<(NaiveDateTime, NaiveDateTime)>,
) -> anyhow::Result<Vec<String>> {
    let names: Vec<&str> = match variable {
        Some(name) => vec![name],
        None => table.variables().iter().map(String::as_str).collect(),
    };
    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        let mut series = table
            .series(name)
            .with_context(|| format!("no forcing variable {}", name))?;
        if let Some((start, end)) = window {
            series = series.between(start, end);
        }
        lines.push(describe_series(name, &series));
    }
    Ok(lines)
}

fn describe_series(name: &str, series: &TimeSeries) -> String {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return format!("{}: no samples", name);
    };
    let values = series.values();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    format!(
        "{}: {} samples, {} .. {}, min {:.3} mean {:.3} max {:.3}",
        name,
        series.len(),
        format_datetime(&first.0),
        format_datetime(&last.0),
        min,
        mean,
        max
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyf_utils::dates::parse_datetime;

    const FORCING: &str = "\
time,APCP_surface,T2D
2015-12-01 00:00:00,0.0,285.0
2015-12-01 01:00:00,0.5,286.0
2015-12-01 02:00:00,1.0,287.0
";

    #[test]
    fn test_summarize_all_variables() {
        let table = ForcingTable::parse(FORCING).unwrap();
        let lines = summarize(&table, None, None).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "APCP_surface: 3 samples, 2015-12-01 00:00:00 .. 2015-12-01 02:00:00, min 0.000 mean 0.500 max 1.000"
        );
    }

    #[test]
    fn test_summarize_window() {
        let table = ForcingTable::parse(FORCING).unwrap();
        let window = Some((
            parse_datetime("2015-12-01 01:00:00").unwrap(),
            parse_datetime("2015-12-01 05:00:00").unwrap(),
        ));
        let lines = summarize(&table, Some("T2D"), window).unwrap();
        assert_eq!(
            lines,
            vec!["T2D: 2 samples, 2015-12-01 01:00:00 .. 2015-12-01 02:00:00, min 286.000 mean 286.500 max 287.000"]
        );
    }

    #[test]
    fn test_summarize_unknown_variable() {
        let table = ForcingTable::parse(FORCING).unwrap();
        assert!(summarize(&table, Some("RAINRATE"), None).is_err());
    }

    #[test]
    fn test_empty_window() {
        let table = ForcingTable::parse(FORCING).unwrap();
        let window = Some((
            parse_datetime("2016-01-01").unwrap(),
            parse_datetime("2016-01-02").unwrap(),
        ));
        let lines = summarize(&table, Some("T2D"), window).unwrap();
        assert_eq!(lines, vec!["T2D: no samples"]);
    }
}
