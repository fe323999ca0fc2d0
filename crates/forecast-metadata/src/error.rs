//! Error types for metadata assembly and validation.

use thiserror::Error;

/// Result type alias using MetadataError.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised while building or validating a metadata record.
///
/// All of these indicate a construction-time defect in the caller's data;
/// none are retried, and a record that fails validation must not be
/// serialized.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// An attribute definition carries a variable_type tag outside the
    /// controlled vocabulary.
    #[error("unknown variable_type '{value}' on attribute '{attribute}'")]
    UnknownVariableType { value: String, attribute: String },

    /// The attribute catalog and the tabular output columns are not in
    /// bijection, or a descriptor contradicts its column's value domain.
    #[error("attribute mismatch for '{column}': {detail}")]
    AttributeMismatch { column: String, detail: String },

    /// A base- or extension-schema rule failed; carries the specific field
    /// path and the rule that was violated.
    #[error("schema validation failed at {field}: {rule}")]
    SchemaValidation { field: String, rule: String },

    /// Construction-time defect in the core data model (units, identifiers).
    #[error(transparent)]
    Core(#[from] forecast_core::CoreError),
}

impl MetadataError {
    /// Shorthand for a schema-rule failure at a field path.
    pub fn schema(field: impl Into<String>, rule: impl Into<String>) -> Self {
        MetadataError::SchemaValidation {
            field: field.into(),
            rule: rule.into(),
        }
    }
}
