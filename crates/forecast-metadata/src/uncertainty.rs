//! Forecast-uncertainty extension block.
//!
//! Six fixed uncertainty classes, each carrying an ordinal status. The
//! ordinal order encodes implication: a class reported as `assimilates`
//! also propagates, is data-driven, and is present, so validation never
//! demands that an implied lower status be asserted explicitly. It does
//! reject contradictions, e.g. an `absent` class carrying structural
//! detail.

use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, MetadataResult};

/// Ordinal status of one uncertainty class.
///
/// Derives `Ord` so validation rules read as comparisons
/// (`status >= Propagates`) instead of string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyStatus {
    /// Not represented in the model.
    Absent,
    /// Represented, magnitude not informed by data.
    Present,
    /// Magnitude informed by data.
    DataDriven,
    /// Propagated into the forecast distribution.
    Propagates,
    /// Updated by assimilating new observations.
    Assimilates,
}

impl UncertaintyStatus {
    /// Serialized spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            UncertaintyStatus::Absent => "absent",
            UncertaintyStatus::Present => "present",
            UncertaintyStatus::DataDriven => "data_driven",
            UncertaintyStatus::Propagates => "propagates",
            UncertaintyStatus::Assimilates => "assimilates",
        }
    }
}

/// How uncertainty is propagated into the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMethod {
    Ensemble,
    Analytic,
}

/// Propagation details for a class with status >= propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propagation {
    pub method: PropagationMethod,
    /// Required when method is ensemble.
    pub ensemble_size: Option<u32>,
}

impl Propagation {
    pub fn ensemble(size: u32) -> Self {
        Self {
            method: PropagationMethod::Ensemble,
            ensemble_size: Some(size),
        }
    }

    pub fn analytic() -> Self {
        Self {
            method: PropagationMethod::Analytic,
            ensemble_size: None,
        }
    }
}

/// One uncertainty class: status plus optional structural detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncertaintyClass {
    pub status: UncertaintyStatus,
    /// Number of distinct terms representing this class, when known.
    pub complexity: Option<u32>,
    /// Whether covariances between terms are represented.
    pub covariance: Option<bool>,
    pub propagation: Option<Propagation>,
}

impl UncertaintyClass {
    /// A class that is not represented at all.
    pub fn absent() -> Self {
        Self::with_status(UncertaintyStatus::Absent)
    }

    pub fn with_status(status: UncertaintyStatus) -> Self {
        Self {
            status,
            complexity: None,
            covariance: None,
            propagation: None,
        }
    }

    pub fn complexity(mut self, complexity: u32) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn covariance(mut self, covariance: bool) -> Self {
        self.covariance = Some(covariance);
        self
    }

    pub fn propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = Some(propagation);
        self
    }

    /// Validate one class; `field` is the path prefix for error reporting.
    /// `propagation_required` is set for classes whose propagation block is
    /// mandatory once the status reaches `propagates`.
    fn validate(&self, field: &str, propagation_required: bool) -> MetadataResult<()> {
        if self.status == UncertaintyStatus::Absent {
            if self.complexity.is_some() {
                return Err(MetadataError::schema(
                    format!("{}/complexity", field),
                    "must be unset when status is absent",
                ));
            }
            if self.covariance.is_some() {
                return Err(MetadataError::schema(
                    format!("{}/covariance", field),
                    "must be unset when status is absent",
                ));
            }
            if self.propagation.is_some() {
                return Err(MetadataError::schema(
                    format!("{}/propagation", field),
                    "must be unset when status is absent",
                ));
            }
            return Ok(());
        }

        if propagation_required
            && self.status >= UncertaintyStatus::Propagates
            && self.propagation.is_none()
        {
            return Err(MetadataError::schema(
                format!("{}/propagation", field),
                "required when status is propagates or higher",
            ));
        }

        if let Some(propagation) = &self.propagation {
            if propagation.method == PropagationMethod::Ensemble
                && propagation.ensemble_size.is_none()
            {
                return Err(MetadataError::schema(
                    format!("{}/propagation/ensemble_size", field),
                    "required when propagation method is ensemble",
                ));
            }
        }

        Ok(())
    }
}

/// The six-class uncertainty block.
///
/// One named field per class makes "exactly one instance per kind" a
/// construction-time guarantee rather than a validation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastUncertainty {
    pub initial_conditions: UncertaintyClass,
    pub drivers: UncertaintyClass,
    pub parameters: UncertaintyClass,
    pub random_effects: UncertaintyClass,
    pub process_error: UncertaintyClass,
    pub obs_error: UncertaintyClass,
}

impl ForecastUncertainty {
    /// Class names in serialization order, paired with each class.
    pub fn classes(&self) -> [(&'static str, &UncertaintyClass); 6] {
        [
            ("initial_conditions", &self.initial_conditions),
            ("drivers", &self.drivers),
            ("parameters", &self.parameters),
            ("random_effects", &self.random_effects),
            ("process_error", &self.process_error),
            ("obs_error", &self.obs_error),
        ]
    }

    /// Validate all six classes. Propagation detail is mandatory for
    /// process error once its status reaches `propagates`; for the other
    /// classes it is validated only when supplied.
    pub fn validate(&self, field_prefix: &str) -> MetadataResult<()> {
        for (name, class) in self.classes() {
            let field = format!("{}/{}", field_prefix, name);
            let propagation_required = name == "process_error";
            class.validate(&field, propagation_required)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(process_error: UncertaintyClass) -> ForecastUncertainty {
        ForecastUncertainty {
            initial_conditions: UncertaintyClass::absent(),
            drivers: UncertaintyClass::absent(),
            parameters: UncertaintyClass::with_status(UncertaintyStatus::DataDriven),
            random_effects: UncertaintyClass::absent(),
            process_error,
            obs_error: UncertaintyClass::with_status(UncertaintyStatus::Present),
        }
    }

    #[test]
    fn test_status_ordering() {
        assert!(UncertaintyStatus::Assimilates > UncertaintyStatus::Propagates);
        assert!(UncertaintyStatus::Absent < UncertaintyStatus::Present);
    }

    #[test]
    fn test_higher_status_implies_lower() {
        // Assimilates without an explicit propagates assertion is valid,
        // provided the required propagation detail is there.
        let class = UncertaintyClass::with_status(UncertaintyStatus::Assimilates)
            .complexity(2)
            .propagation(Propagation::ensemble(10));
        block(class).validate("forecast").unwrap();
    }

    #[test]
    fn test_absent_with_complexity_contradicts() {
        let class = UncertaintyClass::absent().complexity(1);
        let err = block(class).validate("forecast").unwrap_err();
        assert!(matches!(
            err,
            MetadataError::SchemaValidation { ref field, .. }
                if field == "forecast/process_error/complexity"
        ));
    }

    #[test]
    fn test_process_error_propagates_requires_propagation() {
        let class = UncertaintyClass::with_status(UncertaintyStatus::Propagates);
        let err = block(class).validate("forecast").unwrap_err();
        assert!(matches!(
            err,
            MetadataError::SchemaValidation { ref field, .. }
                if field == "forecast/process_error/propagation"
        ));
    }

    #[test]
    fn test_ensemble_propagation_requires_size() {
        let class = UncertaintyClass::with_status(UncertaintyStatus::Propagates).propagation(
            Propagation {
                method: PropagationMethod::Ensemble,
                ensemble_size: None,
            },
        );
        let err = block(class).validate("forecast").unwrap_err();
        assert!(matches!(
            err,
            MetadataError::SchemaValidation { ref field, .. }
                if field == "forecast/process_error/propagation/ensemble_size"
        ));
    }

    #[test]
    fn test_analytic_propagation_needs_no_size() {
        let class = UncertaintyClass::with_status(UncertaintyStatus::Propagates)
            .propagation(Propagation::analytic());
        block(class).validate("forecast").unwrap();
    }
}
