//! Metadata record assembly, validation, and serialization for forecast
//! exchange documents.
//!
//! The record composes four layers: an attribute catalog describing every
//! tabular output column ([`attributes`]), coverage blocks ([`coverage`]),
//! the six-class forecast-uncertainty extension ([`uncertainty`]), and the
//! top-level record with its two-pass validator ([`record`]). Validation is
//! all-or-nothing; only a [`ValidatedRecord`] can be serialized, to XML or
//! to an equivalent JSON graph form.

mod eml;

pub mod attributes;
pub mod coverage;
pub mod error;
pub mod record;
pub mod uncertainty;

pub use attributes::{
    AttributeDef, AttributeList, ColumnDomain, ColumnSpec, NumberType, VariableType,
};
pub use coverage::{Coverage, GeographicCoverage, Taxon, TaxonomicCoverage, TemporalCoverage};
pub use error::{MetadataError, MetadataResult};
pub use record::{
    DataTable, Dataset, ForecastMetadata, MetadataRecord, ModelDescription, Party, Physical,
    ValidatedRecord,
};
pub use uncertainty::{
    ForecastUncertainty, Propagation, PropagationMethod, UncertaintyClass, UncertaintyStatus,
};
