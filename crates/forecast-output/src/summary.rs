//! Summary-statistics companion table.
//!
//! Collapses the full-ensemble table over the ensemble axis: rows are
//! grouped by `(time, depth, obs_flag, forecast, data_assimilation)` and
//! each group yields four statistics per species. Species remain columns;
//! the `statistic` column replaces `ensemble`.
//!
//! Statistic labels depend on the observation-error flag. The latent state
//! (obs_flag 1) carries confidence-interval semantics: `mean`, `se`,
//! `Conf_interv_02.5`, `Conf_interv_97.5`. With observation error added
//! (obs_flag 2) the spread is predictive: `mean`, `sd`, `Pred_interv_02.5`,
//! `Pred_interv_97.5`. Both interval bounds are renamed together.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::stats::{mean, quantile, sample_sd};
use crate::table::{format_real, EnsembleTable};

/// One row of the summary table: one statistic for one group.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub time: NaiveDate,
    pub depth: f64,
    pub obs_flag: u8,
    pub statistic: String,
    /// One value per species, in species order.
    pub species: Vec<f64>,
    pub forecast: u32,
    pub data_assimilation: u32,
}

/// The summary table derived from a full-ensemble table.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    columns: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Group the ensemble table and compute the four statistics per group.
    ///
    /// Output ordering is deterministic: groups sorted by
    /// (time, depth, obs_flag), statistics in
    /// mean / spread / lower bound / upper bound order.
    pub fn from_ensemble(table: &EnsembleTable) -> Self {
        let n_species = table.species_names().len();

        // Group key: (time, depth bits, obs_flag, forecast, data_assimilation).
        // Depths are non-negative so bit order matches numeric order.
        type Key = (NaiveDate, u64, u8, u32, u32);
        let mut groups: BTreeMap<Key, Vec<Vec<f64>>> = BTreeMap::new();

        for row in table.rows() {
            let key = (
                row.time,
                row.depth.to_bits(),
                row.obs_flag,
                row.forecast,
                row.data_assimilation,
            );
            let members = groups
                .entry(key)
                .or_insert_with(|| vec![Vec::new(); n_species]);
            for (s, &value) in row.species.iter().enumerate() {
                members[s].push(value as f64);
            }
        }

        let mut rows = Vec::with_capacity(groups.len() * 4);
        for ((time, depth_bits, obs_flag, forecast, data_assimilation), members) in &groups {
            let depth = f64::from_bits(*depth_bits);
            for (label, value_fn) in statistic_set(*obs_flag) {
                let species: Vec<f64> = members.iter().map(|m| value_fn(m)).collect();
                rows.push(SummaryRow {
                    time: *time,
                    depth,
                    obs_flag: *obs_flag,
                    statistic: label.to_string(),
                    species,
                    forecast: *forecast,
                    data_assimilation: *data_assimilation,
                });
            }
        }

        debug!(groups = groups.len(), rows = rows.len(), "summarized ensemble table");

        let mut columns = vec![
            "time".to_string(),
            "depth".to_string(),
            "statistic".to_string(),
            "obs_flag".to_string(),
        ];
        columns.extend(table.species_names().iter().cloned());
        columns.push("forecast".to_string());
        columns.push("data_assimilation".to_string());

        Self { columns, rows }
    }

    /// Column names in serialization order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// All rows in serialization order.
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Row count; always (number of groups) × 4.
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
            record.push(row.statistic.clone());
            record.push(row.obs_flag.to_string());
            for &value in &row.species {
                record.push(format_real(value));
            }
            record.push(row.forecast.to_string());
            record.push(row.data_assimilation.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// The four labeled statistics for one obs_flag value.
fn statistic_set(obs_flag: u8) -> [(&'static str, fn(&[f64]) -> f64); 4] {
    fn q_lower(v: &[f64]) -> f64 {
        quantile(v, 0.025)
    }
    fn q_upper(v: &[f64]) -> f64 {
        quantile(v, 0.975)
    }

    if obs_flag == 1 {
        [
            ("mean", mean),
            ("se", sample_sd),
            ("Conf_interv_02.5", q_lower),
            ("Conf_interv_97.5", q_upper),
        ]
    } else {
        [
            ("mean", mean),
            ("sd", sample_sd),
            ("Pred_interv_02.5", q_lower),
            ("Pred_interv_97.5", q_upper),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use forecast_core::{FlagSeries, ForecastDimensions, ForecastTensor, ObsFlag};

    fn build_table(days: usize, ensembles: u32) -> EnsembleTable {
        let dims = ForecastDimensions::new(
            ForecastDimensions::daily_time(NaiveDate::from_ymd_opt(2001, 3, 4).unwrap(), days),
            vec![1.0, 3.0, 5.0],
            (1..=ensembles).collect(),
            ObsFlag::both(),
            vec!["species_1".to_string(), "species_2".to_string()],
        )
        .unwrap();

        let mut tensor = ForecastTensor::filled(&dims);
        for t in 0..days {
            for d in 0..3 {
                for e in 0..ensembles as usize {
                    for o in 0..2 {
                        for s in 0..2 {
                            tensor.set(t, d, e, o, s, (e + 1) as f32 * 10.0 + s as f32);
                        }
                    }
                }
            }
        }

        let flags =
            FlagSeries::new(dims.time.clone(), vec![1; days], vec![0; days]).unwrap();
        EnsembleTable::from_tensor(&tensor, &dims, &flags).unwrap()
    }

    #[test]
    fn test_row_count_four_per_group() {
        let summary = SummaryTable::from_ensemble(&build_table(30, 10));
        // 30 times x 3 depths x 2 obs_flags x 4 statistics
        assert_eq!(summary.row_count(), 30 * 3 * 2 * 4);
    }

    #[test]
    fn test_statistic_labels_depend_on_obs_flag() {
        let summary = SummaryTable::from_ensemble(&build_table(1, 10));

        let labels = |flag: u8| -> Vec<String> {
            summary
                .rows()
                .iter()
                .filter(|r| r.obs_flag == flag && r.depth == 1.0)
                .map(|r| r.statistic.clone())
                .collect()
        };

        assert_eq!(
            labels(1),
            vec!["mean", "se", "Conf_interv_02.5", "Conf_interv_97.5"]
        );
        assert_eq!(
            labels(2),
            vec!["mean", "sd", "Pred_interv_02.5", "Pred_interv_97.5"]
        );
    }

    #[test]
    fn test_mean_over_ensemble_members() {
        let summary = SummaryTable::from_ensemble(&build_table(1, 10));
        let mean_row = summary
            .rows()
            .iter()
            .find(|r| r.statistic == "mean" && r.obs_flag == 1 && r.depth == 1.0)
            .unwrap();
        // Members are 10..=100 step 10 for species_1.
        assert!((mean_row.species[0] - 55.0).abs() < 1e-9);
        assert!((mean_row.species[1] - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_member_sd_is_zero() {
        let summary = SummaryTable::from_ensemble(&build_table(1, 1));
        for row in summary.rows().iter().filter(|r| r.statistic == "se" || r.statistic == "sd") {
            assert_eq!(row.species, vec![0.0, 0.0]);
        }
    }
}
