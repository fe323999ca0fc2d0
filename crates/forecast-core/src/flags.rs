//! Per-time-step forecast and data-assimilation flags.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};

/// One time step's flag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPair {
    /// 0 = hindcast, >0 = forecast horizon in steps.
    pub forecast: u32,
    /// 0 = free run, >0 = number of assimilated observations.
    pub data_assimilation: u32,
}

/// Forecast/data-assimilation flags keyed by time-axis date.
///
/// Length must equal the time-axis length at construction; the tabular
/// serializer joins these onto every row sharing the same date.
#[derive(Debug, Clone)]
pub struct FlagSeries {
    times: Vec<NaiveDate>,
    forecast: Vec<u32>,
    data_assimilation: Vec<u32>,
    by_date: HashMap<NaiveDate, FlagPair>,
}

impl FlagSeries {
    /// Build a flag series aligned with `times`.
    pub fn new(
        times: Vec<NaiveDate>,
        forecast: Vec<u32>,
        data_assimilation: Vec<u32>,
    ) -> CoreResult<Self> {
        if forecast.len() != times.len() {
            return Err(CoreError::LengthMismatch {
                name: "forecast".to_string(),
                expected: times.len(),
                actual: forecast.len(),
            });
        }
        if data_assimilation.len() != times.len() {
            return Err(CoreError::LengthMismatch {
                name: "data_assimilation".to_string(),
                expected: times.len(),
                actual: data_assimilation.len(),
            });
        }

        let by_date = times
            .iter()
            .zip(forecast.iter().zip(data_assimilation.iter()))
            .map(|(&date, (&f, &d))| {
                (
                    date,
                    FlagPair {
                        forecast: f,
                        data_assimilation: d,
                    },
                )
            })
            .collect();

        Ok(Self {
            times,
            forecast,
            data_assimilation,
            by_date,
        })
    }

    /// Number of time steps covered.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The flag pair for `date`, if the date is covered.
    pub fn get(&self, date: NaiveDate) -> Option<FlagPair> {
        self.by_date.get(&date).copied()
    }

    /// Forecast flags in time order, as f32 for the array container.
    pub fn forecast_values(&self) -> Vec<f32> {
        self.forecast.iter().map(|&v| v as f32).collect()
    }

    /// Data-assimilation flags in time order, as f32 for the array container.
    pub fn data_assimilation_values(&self) -> Vec<f32> {
        self.data_assimilation.iter().map(|&v| v as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2001, 3, 4).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = FlagSeries::new(dates(3), vec![0, 1], vec![0, 0, 0]).unwrap_err();
        assert!(matches!(err, CoreError::LengthMismatch { .. }));
    }

    #[test]
    fn test_lookup_by_date() {
        let series = FlagSeries::new(dates(3), vec![0, 1, 2], vec![5, 0, 0]).unwrap();
        let pair = series.get(dates(3)[1]).unwrap();
        assert_eq!(pair.forecast, 1);
        assert_eq!(pair.data_assimilation, 0);
        assert!(series
            .get(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap())
            .is_none());
    }
}
