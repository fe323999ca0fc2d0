//! Dimension catalog for forecast output axes.
//!
//! A forecast tensor is indexed over five named axes: time, depth, ensemble
//! member, observation-error flag, and species. The typed aggregate
//! [`ForecastDimensions`] is what producers construct; [`Dimension`] is the
//! generic record materialized into the array container and the attribute
//! catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::units::parse_unit;

/// A named axis with a unit and an ordered coordinate sequence.
///
/// Construction validates the unit against the unit-expression grammar, so
/// a malformed unit fails here rather than during serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// Axis name ("time", "depth", ...).
    pub name: String,
    /// Unit expression ("meters", "days since 2001-03-04").
    pub unit: String,
    /// Ordered coordinate values along the axis.
    pub values: Vec<f64>,
    /// Human-readable description.
    pub description: String,
}

impl Dimension {
    /// Create a dimension, validating the unit and rejecting empty axes.
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        values: Vec<f64>,
        description: impl Into<String>,
    ) -> CoreResult<Self> {
        let name = name.into();
        let unit = unit.into();
        parse_unit(&unit)?;
        if values.is_empty() {
            return Err(CoreError::EmptyDimension(name));
        }
        Ok(Self {
            name,
            unit,
            values,
            description: description.into(),
        })
    }

    /// Number of coordinate values along this axis.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the axis has no values (never true for a constructed Dimension).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Observation-error flag axis values.
///
/// Distinguishes the model's pure latent-state estimate from that same
/// estimate with observation error added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObsFlag {
    /// Latent state only.
    Latent = 1,
    /// Latent state plus observation error.
    LatentObsError = 2,
}

impl ObsFlag {
    /// Integer code used in the serialized outputs.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Both flag values in serialization order.
    pub fn both() -> Vec<ObsFlag> {
        vec![ObsFlag::Latent, ObsFlag::LatentObsError]
    }
}

/// The five typed axes of a forecast tensor.
#[derive(Debug, Clone)]
pub struct ForecastDimensions {
    /// Daily timestamps, strictly increasing.
    pub time: Vec<NaiveDate>,
    /// Depths in meters.
    pub depth: Vec<f64>,
    /// Ensemble member ids.
    pub ensemble: Vec<u32>,
    /// Observation-error flag values.
    pub obs_flag: Vec<ObsFlag>,
    /// Species labels; also the per-species variable names in the container.
    pub species: Vec<String>,
}

impl ForecastDimensions {
    /// Build and sanity-check the axis set.
    pub fn new(
        time: Vec<NaiveDate>,
        depth: Vec<f64>,
        ensemble: Vec<u32>,
        obs_flag: Vec<ObsFlag>,
        species: Vec<String>,
    ) -> CoreResult<Self> {
        if time.is_empty() {
            return Err(CoreError::EmptyDimension("time".to_string()));
        }
        if depth.is_empty() {
            return Err(CoreError::EmptyDimension("depth".to_string()));
        }
        if ensemble.is_empty() {
            return Err(CoreError::EmptyDimension("ensemble".to_string()));
        }
        if obs_flag.is_empty() {
            return Err(CoreError::EmptyDimension("obs_flag".to_string()));
        }
        if species.is_empty() {
            return Err(CoreError::EmptyDimension("species".to_string()));
        }
        for pair in time.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CoreError::NonMonotonicTime(pair[1]));
            }
        }
        Ok(Self {
            time,
            depth,
            ensemble,
            obs_flag,
            species,
        })
    }

    /// Daily time axis starting at `start`, length `days`.
    pub fn daily_time(start: NaiveDate, days: usize) -> Vec<NaiveDate> {
        (0..days)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    /// Unit expression for the time axis ("days since <first date>").
    pub fn time_unit(&self) -> String {
        format!("days since {}", self.time[0].format("%Y-%m-%d"))
    }

    /// Materialize the five generic dimension records, validating every unit.
    pub fn catalog(&self) -> CoreResult<Vec<Dimension>> {
        let time_values = (0..self.time.len()).map(|i| i as f64).collect();
        Ok(vec![
            Dimension::new(
                "time",
                self.time_unit(),
                time_values,
                "daily forecast timestamps",
            )?,
            Dimension::new("depth", "meters", self.depth.clone(), "depth below surface")?,
            Dimension::new(
                "ensemble",
                "dimensionless",
                self.ensemble.iter().map(|&e| e as f64).collect(),
                "ensemble member id",
            )?,
            Dimension::new(
                "obs_flag",
                "dimensionless",
                self.obs_flag.iter().map(|&o| o.code() as f64).collect(),
                "1 = latent state, 2 = latent state plus observation error",
            )?,
            Dimension::new(
                "species",
                "dimensionless",
                (1..=self.species.len()).map(|i| i as f64).collect(),
                "species index; labels are the per-species variable names",
            )?,
        ])
    }

    /// Shape of the tensor indexed over these axes, species-innermost.
    pub fn shape(&self) -> [usize; 5] {
        [
            self.time.len(),
            self.depth.len(),
            self.ensemble.len(),
            self.obs_flag.len(),
            self.species.len(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dimension_rejects_bad_unit() {
        let err = Dimension::new("depth", "metrez", vec![1.0], "").unwrap_err();
        assert!(matches!(err, CoreError::MalformedUnit { .. }));
    }

    #[test]
    fn test_dimension_rejects_empty_values() {
        let err = Dimension::new("depth", "meters", vec![], "").unwrap_err();
        assert!(matches!(err, CoreError::EmptyDimension(_)));
    }

    #[test]
    fn test_daily_time_axis() {
        let time = ForecastDimensions::daily_time(date(2001, 3, 4), 3);
        assert_eq!(time, vec![date(2001, 3, 4), date(2001, 3, 5), date(2001, 3, 6)]);
    }

    #[test]
    fn test_non_monotonic_time_rejected() {
        let err = ForecastDimensions::new(
            vec![date(2001, 3, 5), date(2001, 3, 4)],
            vec![1.0],
            vec![1],
            ObsFlag::both(),
            vec!["species_1".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NonMonotonicTime(_)));
    }

    #[test]
    fn test_catalog_units_parse() {
        let dims = ForecastDimensions::new(
            ForecastDimensions::daily_time(date(2001, 3, 4), 30),
            vec![1.0, 3.0, 5.0],
            (1..=10).collect(),
            ObsFlag::both(),
            vec!["species_1".to_string(), "species_2".to_string()],
        )
        .unwrap();

        let catalog = dims.catalog().unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog[0].unit, "days since 2001-03-04");
        assert_eq!(catalog[0].len(), 30);
        assert_eq!(dims.shape(), [30, 3, 10, 2, 2]);
    }
}
