//! Core data model shared across the forecast packaging crates.

pub mod dimension;
pub mod error;
pub mod flags;
pub mod identifiers;
pub mod tensor;
pub mod units;

pub use dimension::{Dimension, ForecastDimensions, ObsFlag};
pub use error::{CoreError, CoreResult};
pub use flags::{FlagPair, FlagSeries};
pub use identifiers::ForecastIdentifiers;
pub use tensor::{ForecastTensor, FILL_VALUE, FILL_VALUE_CODE};
pub use units::{parse_unit, UnitExpression, UnitFactor};
