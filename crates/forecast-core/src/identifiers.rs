//! Forecast run identifiers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The three-level identifier scheme for forecast runs.
///
/// `project_id` groups every run of one forecasting system; `model_id`
/// changes whenever the model or workflow changes; `iteration_id` is unique
/// per run, conventionally the issue timestamp. Many iterations share one
/// model id, and many model ids share one project id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastIdentifiers {
    pub project_id: String,
    pub model_id: String,
    pub iteration_id: String,
}

impl ForecastIdentifiers {
    /// Create identifiers, rejecting empty fields.
    pub fn new(
        project_id: impl Into<String>,
        model_id: impl Into<String>,
        iteration_id: impl Into<String>,
    ) -> CoreResult<Self> {
        let ids = Self {
            project_id: project_id.into(),
            model_id: model_id.into(),
            iteration_id: iteration_id.into(),
        };
        if ids.project_id.is_empty() {
            return Err(CoreError::EmptyIdentifier("project_id"));
        }
        if ids.model_id.is_empty() {
            return Err(CoreError::EmptyIdentifier("model_id"));
        }
        if ids.iteration_id.is_empty() {
            return Err(CoreError::EmptyIdentifier("iteration_id"));
        }
        Ok(ids)
    }

    /// The scheme the iteration id was generated under.
    ///
    /// Iteration ids are issue timestamps by convention; when the id parses
    /// as one, the metadata record declares `"datetime"` as its id system.
    pub fn id_system(&self) -> &'static str {
        let parses = NaiveDateTime::parse_from_str(&self.iteration_id, "%Y%m%dT%H%M%S").is_ok()
            || NaiveDateTime::parse_from_str(&self.iteration_id, "%Y-%m-%dT%H:%M:%S").is_ok();
        if parses {
            "datetime"
        } else {
            "uuid"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_rejected() {
        assert!(ForecastIdentifiers::new("", "m", "i").is_err());
        assert!(ForecastIdentifiers::new("p", "m", "").is_err());
    }

    #[test]
    fn test_datetime_id_system() {
        let ids = ForecastIdentifiers::new("logistic-demo", "v0.1", "20010304T060000").unwrap();
        assert_eq!(ids.id_system(), "datetime");

        let ids = ForecastIdentifiers::new("logistic-demo", "v0.1", "run-42").unwrap();
        assert_eq!(ids.id_system(), "uuid");
    }
}
