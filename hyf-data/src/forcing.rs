//! Forcing data loading.
//!
//! Forcing files are CSV with a header row. The first column holds the
//! timestamp of each row; every other column is a numeric forcing
//! variable (precipitation, temperature, ...).
//!
//! # Example CSV
//! ```text
//! time,APCP_surface,T2D
//! 2015-12-01 00:00:00,0.0,285.8
//! 2015-12-01 01:00:00,0.2,285.1
//! ```

use crate::error::{DataError, Result};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use hyf_core::{Catchment, TimeSeries};
use hyf_utils::dates::parse_datetime;
use serde_json::Value;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

/// Forcing variables for one catchment, one row per timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcingTable {
    times: Vec<NaiveDateTime>,
    variables: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ForcingTable {
    /// Parse forcing CSV from any reader.
    ///
    /// A bad timestamp or non-numeric cell fails the whole load; rows are
    /// numbered as in the file, header being row 1.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(DataError::MissingTimeColumn);
        }
        let variables: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        let mut times = Vec::new();
        let mut columns = vec![Vec::new(); variables.len()];

        for (i, row) in rdr.records().enumerate() {
            let record = row?;
            let line = i + 2;
            let stamp = record.get(0).unwrap_or("");
            let time = parse_datetime(stamp).map_err(|_| DataError::Timestamp {
                row: line,
                value: stamp.to_string(),
            })?;
            times.push(time);
            for (j, variable) in variables.iter().enumerate() {
                let cell = record.get(j + 1).unwrap_or("");
                let value = cell.parse::<f64>().map_err(|_| DataError::Value {
                    row: line,
                    column: variable.clone(),
                    value: cell.to_string(),
                })?;
                columns[j].push(value);
            }
        }
        log::debug!(
            "loaded {} forcing rows with {} variables",
            times.len(),
            variables.len()
        );
        Ok(ForcingTable {
            times,
            variables,
            columns,
        })
    }

    pub fn parse(csv_data: &str) -> Result<Self> {
        Self::from_reader(csv_data.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("reading forcing from {}", path.display());
        Self::from_reader(file)
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The named variable as a time series.
    pub fn series(&self, variable: &str) -> Option<TimeSeries> {
        let idx = self.variables.iter().position(|v| v == variable)?;
        let samples = self
            .times
            .iter()
            .copied()
            .zip(self.columns[idx].iter().copied())
            .collect();
        Some(TimeSeries::from_samples(samples))
    }
}

/// `forcing.path` from a catchment's params.
pub fn forcing_path(catchment_id: &str, params: &Value) -> Result<PathBuf> {
    params
        .get("forcing")
        .and_then(|f| f.get("path"))
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .ok_or_else(|| DataError::MissingForcingPath(catchment_id.to_string()))
}

/// Load the forcing file named in the catchment's params.
pub fn load_for_catchment(catchment: &Catchment) -> Result<ForcingTable> {
    let path = forcing_path(catchment.id(), catchment.params())?;
    ForcingTable::from_path(path)
}
