//! Serializers for forecast ensemble output.
//!
//! Three interchangeable renditions of one forecast run:
//!
//! - [`container`]: a self-describing Zarr V3 array container holding the
//!   raw 5-D ensemble, per-time flags, coordinate arrays, and the forecast
//!   identifiers as global attributes.
//! - [`table`]: the long-format full-ensemble table, one row per
//!   (time, depth, ensemble, obs_flag) with species as columns.
//! - [`summary`]: the statistical summary derived from the ensemble table.
//!
//! All construction-time validation (unit grammar, shape checks, flag
//! joins) happens before any file is created.

pub mod container;
pub mod error;
pub mod stats;
pub mod summary;
pub mod table;

pub use container::{ContainerReader, ContainerWriter};
pub use error::{OutputError, Result};
pub use summary::{SummaryRow, SummaryTable};
pub use table::{EnsembleRow, EnsembleTable};
