//! Forecast tensor storage.
//!
//! A forecast ensemble is a 5-D array indexed `(time, depth, ensemble,
//! obs_flag, species)` in row-major order with species innermost. Cells that
//! are structurally absent carry the declared [`FILL_VALUE`].

use crate::dimension::ForecastDimensions;
use crate::error::{CoreError, CoreResult};

/// Declared fill value for structurally absent cells.
pub const FILL_VALUE: f32 = 1.0e32;

/// Serialized spelling of [`FILL_VALUE`] in tabular output; the attribute
/// catalog's missing-value code must match this exactly.
pub const FILL_VALUE_CODE: &str = "1e32";

/// 5-D forecast ensemble values, row-major, species innermost.
#[derive(Debug, Clone)]
pub struct ForecastTensor {
    shape: [usize; 5],
    data: Vec<f32>,
}

impl ForecastTensor {
    /// Wrap raw values, rejecting any length that is not the exact product
    /// of the dimension lengths.
    pub fn new(dims: &ForecastDimensions, data: Vec<f32>) -> CoreResult<Self> {
        let shape = dims.shape();
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(CoreError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Allocate a tensor of the right shape, pre-filled with [`FILL_VALUE`].
    pub fn filled(dims: &ForecastDimensions) -> Self {
        let shape = dims.shape();
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![FILL_VALUE; len],
        }
    }

    /// Tensor shape `[time, depth, ensemble, obs_flag, species]`.
    pub fn shape(&self) -> [usize; 5] {
        self.shape
    }

    /// Flat row-major index for `(t, d, e, o, s)`.
    fn index(&self, t: usize, d: usize, e: usize, o: usize, s: usize) -> usize {
        debug_assert!(t < self.shape[0]);
        debug_assert!(d < self.shape[1]);
        debug_assert!(e < self.shape[2]);
        debug_assert!(o < self.shape[3]);
        debug_assert!(s < self.shape[4]);
        (((t * self.shape[1] + d) * self.shape[2] + e) * self.shape[3] + o) * self.shape[4] + s
    }

    /// Read one cell.
    pub fn get(&self, t: usize, d: usize, e: usize, o: usize, s: usize) -> f32 {
        self.data[self.index(t, d, e, o, s)]
    }

    /// Write one cell.
    pub fn set(&mut self, t: usize, d: usize, e: usize, o: usize, s: usize, value: f32) {
        let idx = self.index(t, d, e, o, s);
        self.data[idx] = value;
    }

    /// Extract the contiguous 4-D `[time, depth, ensemble, obs_flag]` block
    /// for one species, in row-major order. This is the per-species variable
    /// written to the array container.
    pub fn species_block(&self, s: usize) -> Vec<f32> {
        let cells = self.data.len() / self.shape[4];
        let mut block = Vec::with_capacity(cells);
        let mut idx = s;
        for _ in 0..cells {
            block.push(self.data[idx]);
            idx += self.shape[4];
        }
        block
    }

    /// All values, row-major.
    pub fn values(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{ForecastDimensions, ObsFlag};
    use chrono::NaiveDate;

    fn small_dims() -> ForecastDimensions {
        ForecastDimensions::new(
            ForecastDimensions::daily_time(NaiveDate::from_ymd_opt(2001, 3, 4).unwrap(), 2),
            vec![1.0, 3.0],
            vec![1, 2, 3],
            ObsFlag::both(),
            vec!["species_1".to_string(), "species_2".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let dims = small_dims();
        let err = ForecastTensor::new(&dims, vec![0.0; 7]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ShapeMismatch { expected: 48, actual: 7 }
        ));
    }

    #[test]
    fn test_filled_tensor_carries_fill_value() {
        let dims = small_dims();
        let tensor = ForecastTensor::filled(&dims);
        assert_eq!(tensor.get(0, 0, 0, 0, 0), FILL_VALUE);
        assert_eq!(tensor.values().len(), 48);
    }

    #[test]
    fn test_species_block_extraction() {
        let dims = small_dims();
        let mut tensor = ForecastTensor::filled(&dims);
        tensor.set(1, 0, 2, 1, 0, 42.0);
        tensor.set(1, 0, 2, 1, 1, 43.0);

        let block0 = tensor.species_block(0);
        let block1 = tensor.species_block(1);
        assert_eq!(block0.len(), 24);

        // (t=1, d=0, e=2, o=1) row-major over [2, 2, 3, 2]
        let idx = ((1 * 2 + 0) * 3 + 2) * 2 + 1;
        assert_eq!(block0[idx], 42.0);
        assert_eq!(block1[idx], 43.0);
    }
}
