//! Metadata record assembly and two-pass validation.
//!
//! A [`MetadataRecord`] composes the dataset description (authorship,
//! coverage, data-table physical description, attribute catalog) with the
//! forecast extension block (timestep, horizon, identifiers, uncertainty).
//! Validation is all-or-nothing: only a [`ValidatedRecord`] can be
//! serialized, and records are never mutated after validation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use forecast_core::{parse_unit, ForecastIdentifiers};

use crate::attributes::{AttributeList, ColumnSpec};
use crate::coverage::Coverage;
use crate::error::{MetadataError, MetadataResult};
use crate::uncertainty::ForecastUncertainty;

/// A person or organization in an authorship role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub individual: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    /// Stable identifier (e.g. an ORCID), if known.
    pub id: Option<String>,
}

impl Party {
    pub fn individual(name: impl Into<String>) -> Self {
        Self {
            individual: Some(name.into()),
            organization: None,
            email: None,
            id: None,
        }
    }

    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            individual: None,
            organization: Some(name.into()),
            email: None,
            id: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Physical description of a tabular output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Physical {
    pub object_name: String,
    pub header_lines: u32,
    pub record_delimiter: String,
    pub field_delimiter: String,
    pub size_bytes: Option<u64>,
}

impl Physical {
    /// Conventional description of a single-header CSV file.
    pub fn csv(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            header_lines: 1,
            record_delimiter: "\\n".to_string(),
            field_delimiter: ",".to_string(),
            size_bytes: None,
        }
    }

    pub fn with_size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }
}

/// The described tabular entity: file plus attribute catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub entity_name: String,
    pub description: String,
    pub physical: Physical,
    pub attributes: AttributeList,
}

/// The dataset section of the exchange document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub title: String,
    pub creator: Party,
    pub contact: Party,
    pub pub_date: NaiveDate,
    pub intellectual_rights: String,
    pub abstract_text: String,
    pub data_table: DataTable,
    pub keywords: Vec<String>,
    pub coverage: Coverage,
}

/// Free-text description of the forecasting model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescription {
    pub name: String,
    pub model_type: String,
    pub repository: String,
}

/// The forecast extension section of the exchange document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMetadata {
    /// Forecast timestep, e.g. "1 day".
    pub timestep: String,
    /// Forecast horizon, e.g. "30 days".
    pub forecast_horizon: String,
    /// When this iteration was issued.
    pub issue_time: NaiveDateTime,
    pub identifiers: ForecastIdentifiers,
    pub model_description: ModelDescription,
    pub uncertainty: ForecastUncertainty,
}

/// The top-level exchange document, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub package_id: String,
    pub id_system: String,
    pub dataset: Dataset,
    pub forecast: ForecastMetadata,
}

impl MetadataRecord {
    /// Assemble a record for one forecast iteration.
    ///
    /// The package id is the iteration id, and the id system is derived
    /// from how the iteration id was generated.
    pub fn assemble(dataset: Dataset, forecast: ForecastMetadata) -> Self {
        let package_id = forecast.identifiers.iteration_id.clone();
        let id_system = forecast.identifiers.id_system().to_string();
        Self {
            package_id,
            id_system,
            dataset,
            forecast,
        }
    }

    /// Run both validation passes, consuming the record.
    ///
    /// Pass 1 checks the base exchange schema: required fields present and
    /// well-typed, coverage sane, attribute catalog in bijection with the
    /// tabular output columns. Pass 2 checks the forecast extension:
    /// uncertainty rules, identifier/package consistency, parseable
    /// timestep and horizon. Any failure yields a non-serializable record.
    pub fn validate(self, columns: &[ColumnSpec]) -> MetadataResult<ValidatedRecord> {
        self.validate_base(columns)?;
        self.validate_extension()?;
        debug!(package_id = %self.package_id, "metadata record validated");
        Ok(ValidatedRecord { record: self })
    }

    /// Pass 1: base schema.
    fn validate_base(&self, columns: &[ColumnSpec]) -> MetadataResult<()> {
        require(&self.package_id, "packageId")?;
        require(&self.id_system, "system")?;
        require(&self.dataset.title, "dataset/title")?;
        require_party(&self.dataset.creator, "dataset/creator")?;
        require_party(&self.dataset.contact, "dataset/contact")?;
        require(&self.dataset.intellectual_rights, "dataset/intellectualRights")?;
        require(&self.dataset.abstract_text, "dataset/abstract")?;

        let table = &self.dataset.data_table;
        require(&table.entity_name, "dataset/dataTable/entityName")?;
        require(&table.description, "dataset/dataTable/entityDescription")?;
        require(&table.physical.object_name, "dataset/dataTable/physical/objectName")?;

        table.attributes.validate_columns(columns)?;

        if self.dataset.coverage.taxonomic.taxa.is_empty() {
            return Err(MetadataError::schema(
                "dataset/coverage/taxonomicCoverage",
                "at least one taxon is required",
            ));
        }

        Ok(())
    }

    /// Pass 2: forecast extension.
    fn validate_extension(&self) -> MetadataResult<()> {
        let forecast = &self.forecast;

        if self.package_id != forecast.identifiers.iteration_id {
            return Err(MetadataError::schema(
                "packageId",
                format!(
                    "must equal forecast_iteration_id '{}', got '{}'",
                    forecast.identifiers.iteration_id, self.package_id
                ),
            ));
        }

        validate_duration(&forecast.timestep, "additionalMetadata/forecast/timestep")?;
        validate_duration(
            &forecast.forecast_horizon,
            "additionalMetadata/forecast/forecast_horizon",
        )?;

        require(
            &forecast.model_description.name,
            "additionalMetadata/forecast/model_description/name",
        )?;

        forecast
            .uncertainty
            .validate("additionalMetadata/forecast")?;

        Ok(())
    }
}

/// A record that passed both validation passes.
///
/// This is the only type the serializers accept, so an unvalidated or
/// failed record can never reach an output file.
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    record: MetadataRecord,
}

impl ValidatedRecord {
    /// The validated record contents, read-only.
    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    /// Serialize to the EML-style XML exchange document.
    pub fn to_xml(&self) -> String {
        crate::eml::render(&self.record)
    }

    /// Serialize to the JSON graph form of the same document.
    pub fn to_json(&self) -> serde_json::Value {
        // Serialization of a validated record cannot fail: every field is
        // a plain data type with a derived Serialize.
        serde_json::to_value(&self.record).unwrap_or_default()
    }
}

/// A required string field must be non-empty.
fn require(value: &str, field: &str) -> MetadataResult<()> {
    if value.trim().is_empty() {
        return Err(MetadataError::schema(field, "required field is empty"));
    }
    Ok(())
}

/// A party needs at least an individual or an organization name.
fn require_party(party: &Party, field: &str) -> MetadataResult<()> {
    let named = party
        .individual
        .as_deref()
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
        || party
            .organization
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
    if !named {
        return Err(MetadataError::schema(
            field,
            "requires an individual or organization name",
        ));
    }
    Ok(())
}

/// A duration is an optional count followed by a pure time unit
/// ("1 day", "30 days", "day").
fn validate_duration(value: &str, field: &str) -> MetadataResult<()> {
    let trimmed = value.trim();
    let unit_part = match trimmed.split_once(' ') {
        Some((count, rest)) if count.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => trimmed,
    };
    let expr = parse_unit(unit_part)
        .map_err(|e| MetadataError::schema(field, e.to_string()))?;
    if !expr.is_time() {
        return Err(MetadataError::schema(
            field,
            format!("'{}' is not a time duration", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_duration_forms() {
        validate_duration("1 day", "f").unwrap();
        validate_duration("30 days", "f").unwrap();
        validate_duration("day", "f").unwrap();
        assert!(validate_duration("1 meter", "f").is_err());
        assert!(validate_duration("fortnight", "f").is_err());
    }

    #[test]
    fn test_require_party() {
        assert!(require_party(&Party::individual("A. Author"), "f").is_ok());
        let anonymous = Party {
            individual: None,
            organization: None,
            email: Some("a@example.org".to_string()),
            id: None,
        };
        assert!(require_party(&anonymous, "f").is_err());
    }
}
