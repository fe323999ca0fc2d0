//! Attribute catalog for the tabular outputs.
//!
//! Every column appearing in the ensemble and summary tables is described
//! by one [`AttributeDef`]. Definitions embed a bracketed variable_type tag
//! from a controlled vocabulary plus a braced free-text definition, e.g.
//! `[dimension]{time of the forecast step}`. The catalog is validated
//! against the actual output columns: the mapping must be a bijection and
//! each descriptor must be consistent with its column's value domain.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use forecast_core::parse_unit;

use crate::error::{MetadataError, MetadataResult};

/// Controlled vocabulary for the semantic role of a column or variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    Dimension,
    Variable,
    Diagnostic,
    Observation,
    ObsError,
    Flag,
    InitialCondition,
    Driver,
    Parameter,
    RandomEffect,
    ProcessError,
}

impl FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dimension" => Ok(VariableType::Dimension),
            "variable" => Ok(VariableType::Variable),
            "diagnostic" => Ok(VariableType::Diagnostic),
            "observation" => Ok(VariableType::Observation),
            "obs_error" => Ok(VariableType::ObsError),
            "flag" => Ok(VariableType::Flag),
            "initial_condition" => Ok(VariableType::InitialCondition),
            "driver" => Ok(VariableType::Driver),
            "parameter" => Ok(VariableType::Parameter),
            "random_effect" => Ok(VariableType::RandomEffect),
            "process_error" => Ok(VariableType::ProcessError),
            other => Err(other.to_string()),
        }
    }
}

/// Numeric domain vocabulary of the base exchange schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberType {
    /// Positive integers.
    Natural,
    /// Non-negative integers.
    Whole,
    /// Signed integers.
    Integer,
    /// Reals.
    Real,
}

/// Value domain of an actual output column, used for consistency checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDomain {
    /// ISO dates; needs a date format string, not a numberType.
    Date,
    /// Integer-valued; needs natural/whole/integer numberType.
    Integer,
    /// Real-valued; needs real numberType.
    Real,
    /// Free text; no numeric declaration.
    Text,
}

/// Name and value domain of one column in a tabular output.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub domain: ColumnDomain,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, domain: ColumnDomain) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ColumnDomain::Date)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnDomain::Integer)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, ColumnDomain::Real)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnDomain::Text)
    }
}

/// One column/variable descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Column name; must match the serialized header exactly.
    pub name: String,
    /// Definition with embedded `[variable_type]` tag and `{free text}`.
    pub definition: String,
    /// Unit expression, when the column is a measured quantity.
    pub unit: Option<String>,
    /// Format string for date columns ("YYYY-MM-DD").
    pub format_string: Option<String>,
    /// Numeric domain for numeric columns.
    pub number_type: Option<NumberType>,
    /// Code marking missing values, if any may occur.
    pub missing_value_code: Option<String>,
    /// Measurement precision.
    pub precision: Option<f64>,
    /// Domain minimum.
    pub minimum: Option<f64>,
    /// Domain maximum.
    pub maximum: Option<f64>,
}

impl AttributeDef {
    /// Create a descriptor with just the required fields.
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
            unit: None,
            format_string: None,
            number_type: None,
            missing_value_code: None,
            precision: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_format_string(mut self, fmt: impl Into<String>) -> Self {
        self.format_string = Some(fmt.into());
        self
    }

    pub fn with_number_type(mut self, number_type: NumberType) -> Self {
        self.number_type = Some(number_type);
        self
    }

    pub fn with_missing_value_code(mut self, code: impl Into<String>) -> Self {
        self.missing_value_code = Some(code.into());
        self
    }

    /// Parse the bracketed variable_type tag out of the definition.
    pub fn variable_type(&self) -> MetadataResult<VariableType> {
        let tag = self
            .definition
            .strip_prefix('[')
            .and_then(|rest| rest.split_once(']'))
            .map(|(tag, _)| tag)
            .ok_or_else(|| MetadataError::UnknownVariableType {
                value: self.definition.clone(),
                attribute: self.name.clone(),
            })?;

        VariableType::from_str(tag).map_err(|value| MetadataError::UnknownVariableType {
            value,
            attribute: self.name.clone(),
        })
    }

    /// The braced free-text part of the definition, if present.
    pub fn free_text(&self) -> Option<&str> {
        let start = self.definition.find('{')? + 1;
        let end = self.definition.rfind('}')?;
        (start <= end).then(|| &self.definition[start..end])
    }
}

/// The ordered attribute catalog for one tabular output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeList {
    pub attributes: Vec<AttributeDef>,
}

impl AttributeList {
    pub fn new(attributes: Vec<AttributeDef>) -> Self {
        Self { attributes }
    }

    /// Look up a descriptor by column name.
    pub fn get(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validate the catalog against the actual output columns.
    ///
    /// Checks, in order: every variable_type tag is in the controlled set;
    /// every declared unit parses; descriptors and columns are in bijection;
    /// each descriptor's numeric declaration matches its column's domain.
    pub fn validate_columns(&self, columns: &[ColumnSpec]) -> MetadataResult<()> {
        let mut seen = HashSet::new();
        for attr in &self.attributes {
            attr.variable_type()?;
            if let Some(unit) = &attr.unit {
                parse_unit(unit)?;
            }
            if !seen.insert(attr.name.as_str()) {
                return Err(MetadataError::AttributeMismatch {
                    column: attr.name.clone(),
                    detail: "duplicate attribute descriptor".to_string(),
                });
            }
        }

        let column_names: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        for attr in &self.attributes {
            if !column_names.contains(attr.name.as_str()) {
                return Err(MetadataError::AttributeMismatch {
                    column: attr.name.clone(),
                    detail: "descriptor has no matching output column".to_string(),
                });
            }
        }
        for column in columns {
            let attr = self.get(&column.name).ok_or_else(|| {
                MetadataError::AttributeMismatch {
                    column: column.name.clone(),
                    detail: "output column has no attribute descriptor".to_string(),
                }
            })?;
            check_domain(attr, column)?;
        }

        Ok(())
    }
}

/// A descriptor's numeric declaration must match its column's value domain.
fn check_domain(attr: &AttributeDef, column: &ColumnSpec) -> MetadataResult<()> {
    let mismatch = |detail: String| MetadataError::AttributeMismatch {
        column: column.name.clone(),
        detail,
    };

    match column.domain {
        ColumnDomain::Date => {
            let fmt = attr
                .format_string
                .as_deref()
                .ok_or_else(|| mismatch("date column requires a formatString".to_string()))?;
            if !fmt.contains("YYYY") {
                return Err(mismatch(format!(
                    "formatString '{}' is not a date pattern",
                    fmt
                )));
            }
            if attr.number_type.is_some() {
                return Err(mismatch(
                    "date column must not declare a numberType".to_string(),
                ));
            }
        }
        ColumnDomain::Integer => match attr.number_type {
            Some(NumberType::Natural) | Some(NumberType::Whole) | Some(NumberType::Integer) => {}
            Some(NumberType::Real) => {
                return Err(mismatch(
                    "integer column declared with numberType real".to_string(),
                ))
            }
            None => {
                return Err(mismatch(
                    "integer column requires a numberType".to_string(),
                ))
            }
        },
        ColumnDomain::Real => match attr.number_type {
            Some(NumberType::Real) => {}
            Some(_) => {
                return Err(mismatch(
                    "real column requires numberType real".to_string(),
                ))
            }
            None => return Err(mismatch("real column requires a numberType".to_string())),
        },
        ColumnDomain::Text => {
            if attr.number_type.is_some() {
                return Err(mismatch(
                    "text column must not declare a numberType".to_string(),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_attr() -> AttributeDef {
        AttributeDef::new("time", "[dimension]{time of the forecast step}")
            .with_format_string("YYYY-MM-DD")
    }

    fn depth_attr() -> AttributeDef {
        AttributeDef::new("depth", "[dimension]{depth below surface}")
            .with_unit("meters")
            .with_number_type(NumberType::Real)
    }

    #[test]
    fn test_variable_type_parsing() {
        assert_eq!(
            time_attr().variable_type().unwrap(),
            VariableType::Dimension
        );
        assert_eq!(
            time_attr().free_text().unwrap(),
            "time of the forecast step"
        );
    }

    #[test]
    fn test_unknown_variable_type_rejected() {
        let attr = AttributeDef::new("x", "[banana]{a fruit}");
        let err = attr.variable_type().unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnknownVariableType { ref value, .. } if value == "banana"
        ));
    }

    #[test]
    fn test_bijection_both_directions() {
        let list = AttributeList::new(vec![time_attr(), depth_attr()]);

        // Descriptor without a column.
        let err = list
            .validate_columns(&[ColumnSpec::date("time")])
            .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::AttributeMismatch { ref column, .. } if column == "depth"
        ));

        // Column without a descriptor.
        let err = list
            .validate_columns(&[
                ColumnSpec::date("time"),
                ColumnSpec::real("depth"),
                ColumnSpec::integer("ensemble"),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::AttributeMismatch { ref column, .. } if column == "ensemble"
        ));

        // Exact bijection passes.
        list.validate_columns(&[ColumnSpec::date("time"), ColumnSpec::real("depth")])
            .unwrap();
    }

    #[test]
    fn test_date_column_needs_date_format() {
        let bad = AttributeDef::new("time", "[dimension]{t}").with_number_type(NumberType::Real);
        let list = AttributeList::new(vec![bad]);
        let err = list
            .validate_columns(&[ColumnSpec::date("time")])
            .unwrap_err();
        assert!(matches!(err, MetadataError::AttributeMismatch { .. }));
    }

    #[test]
    fn test_integer_column_number_type() {
        let attr = AttributeDef::new("ensemble", "[dimension]{member id}")
            .with_unit("dimensionless")
            .with_number_type(NumberType::Natural);
        let list = AttributeList::new(vec![attr]);
        list.validate_columns(&[ColumnSpec::integer("ensemble")])
            .unwrap();

        let attr = AttributeDef::new("ensemble", "[dimension]{member id}")
            .with_number_type(NumberType::Real);
        let list = AttributeList::new(vec![attr]);
        assert!(list
            .validate_columns(&[ColumnSpec::integer("ensemble")])
            .is_err());
    }

    #[test]
    fn test_bad_unit_surfaces_core_error() {
        let attr = AttributeDef::new("depth", "[dimension]{d}")
            .with_unit("metrez")
            .with_number_type(NumberType::Real);
        let list = AttributeList::new(vec![attr]);
        let err = list
            .validate_columns(&[ColumnSpec::real("depth")])
            .unwrap_err();
        assert!(matches!(err, MetadataError::Core(_)));
    }
}
