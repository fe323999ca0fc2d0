//! Long-format full-ensemble table.
//!
//! Flattens the forecast tensor into one row per
//! `(time, depth, ensemble, obs_flag)` combination, with one column per
//! species, then joins the per-time flag series onto every row sharing that
//! time value (one-to-many: one flag pair broadcast across the
//! depth × ensemble × obs_flag combinations for that date).

use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use forecast_core::{FlagSeries, ForecastDimensions, ForecastTensor, FILL_VALUE, FILL_VALUE_CODE};

use crate::error::{OutputError, Result};

/// One row of the full-ensemble table.
#[derive(Debug, Clone)]
pub struct EnsembleRow {
    pub time: NaiveDate,
    pub depth: f64,
    pub ensemble: u32,
    pub obs_flag: u8,
    /// One value per species, in species order.
    pub species: Vec<f32>,
    pub forecast: u32,
    pub data_assimilation: u32,
}

/// The full-ensemble table: every tensor cell as a long-format record.
#[derive(Debug, Clone)]
pub struct EnsembleTable {
    columns: Vec<String>,
    species: Vec<String>,
    rows: Vec<EnsembleRow>,
}

impl EnsembleTable {
    /// Flatten a tensor and join the flag series.
    ///
    /// Fails with `UnmatchedTime` if any tensor date has no flag entry; no
    /// row may carry a null flag after the join.
    pub fn from_tensor(
        tensor: &ForecastTensor,
        dims: &ForecastDimensions,
        flags: &FlagSeries,
    ) -> Result<Self> {
        let [n_time, n_depth, n_ensemble, n_obs, n_species] = tensor.shape();

        let mut rows = Vec::with_capacity(n_time * n_depth * n_ensemble * n_obs);
        for (t, &date) in dims.time.iter().enumerate() {
            let pair = flags.get(date).ok_or(OutputError::UnmatchedTime(date))?;
            for (d, &depth) in dims.depth.iter().enumerate() {
                for (e, &member) in dims.ensemble.iter().enumerate() {
                    for (o, &flag) in dims.obs_flag.iter().enumerate() {
                        let species = (0..n_species)
                            .map(|s| tensor.get(t, d, e, o, s))
                            .collect();
                        rows.push(EnsembleRow {
                            time: date,
                            depth,
                            ensemble: member,
                            obs_flag: flag.code(),
                            species,
                            forecast: pair.forecast,
                            data_assimilation: pair.data_assimilation,
                        });
                    }
                }
            }
        }

        debug!(rows = rows.len(), "flattened ensemble table");

        let mut columns = vec![
            "time".to_string(),
            "depth".to_string(),
            "ensemble".to_string(),
            "obs_flag".to_string(),
        ];
        columns.extend(dims.species.iter().cloned());
        columns.push("forecast".to_string());
        columns.push("data_assimilation".to_string());

        Ok(Self {
            columns,
            species: dims.species.clone(),
            rows,
        })
    }

    /// Column names in serialization order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Species labels (the per-species column names).
    pub fn species_names(&self) -> &[String] {
        &self.species
    }

    /// All rows in serialization order.
    pub fn rows(&self) -> &[EnsembleRow] {
        &self.rows
    }

    /// Row count; always |time|·|depth|·|ensemble|·|obs_flag|.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Write the table as CSV with a single header line.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(self.columns.len());
            record.push(row.time.format("%Y-%m-%d").to_string());
            record.push(format_real(row.depth));
            record.push(row.ensemble.to_string());
            record.push(row.obs_flag.to_string());
            for &value in &row.species {
                record.push(format_species(value));
            }
            record.push(row.forecast.to_string());
            record.push(row.data_assimilation.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Serialize one species cell; a structurally absent cell renders as the
/// declared missing-value code.
fn format_species(value: f32) -> String {
    if value == FILL_VALUE {
        FILL_VALUE_CODE.to_string()
    } else {
        format_real(value as f64)
    }
}

/// Format a real value without scientific notation surprises.
pub(crate) fn format_real(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1.0e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
