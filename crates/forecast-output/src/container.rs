//! Self-describing array container for the raw forecast ensemble.
//!
//! The container is a Zarr V3 hierarchy: one f32 array per species (shape
//! `[time, depth, ensemble, obs_flag]`), two 1-D flag arrays keyed to the
//! time axis, and 1-D coordinate arrays for every axis, all under a root
//! group whose attributes carry the three forecast identifiers. Cells not
//! explicitly written hold the declared fill value `1.0e32`.
//!
//! All validation (unit grammar, flag alignment) happens before any file or
//! directory is created, so a failed write never leaves a truncated
//! container behind.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use zarrs::array::{Array, ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::{Group, GroupBuilder};
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};
use zarrs_filesystem::FilesystemStore;

use forecast_core::{
    Dimension, FlagSeries, ForecastDimensions, ForecastIdentifiers, ForecastTensor, FILL_VALUE,
};

use crate::error::{OutputError, Result};

/// Writer for the forecast array container.
pub struct ContainerWriter;

impl ContainerWriter {
    /// Write a complete container to a filesystem directory.
    ///
    /// `species_unit` is the unit expression attached to every per-species
    /// variable. Creates (or overwrites the contents of) exactly one Zarr
    /// hierarchy rooted at `path`.
    pub fn write_to_path(
        path: &Path,
        tensor: &ForecastTensor,
        dims: &ForecastDimensions,
        flags: &FlagSeries,
        ids: &ForecastIdentifiers,
        species_unit: &str,
    ) -> Result<()> {
        // Validate everything before touching the filesystem.
        let catalog = dims.catalog()?;
        forecast_core::parse_unit(species_unit)?;
        Self::check_alignment(dims, flags)?;

        std::fs::create_dir_all(path)?;
        let store = Arc::new(
            FilesystemStore::new(path).map_err(|e| OutputError::Storage(e.to_string()))?,
        );
        Self::write(store, tensor, dims, flags, ids, &catalog, species_unit)
    }

    /// Write a complete container to an already-open store.
    pub fn write<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        store: Arc<S>,
        tensor: &ForecastTensor,
        dims: &ForecastDimensions,
        flags: &FlagSeries,
        ids: &ForecastIdentifiers,
        catalog: &[Dimension],
        species_unit: &str,
    ) -> Result<()> {
        // Root group with the three identifiers as global text attributes.
        let mut attrs = serde_json::Map::new();
        attrs.insert("forecast_project_id".to_string(), json!(ids.project_id));
        attrs.insert("forecast_model_id".to_string(), json!(ids.model_id));
        attrs.insert("forecast_iteration_id".to_string(), json!(ids.iteration_id));

        let mut binding = GroupBuilder::new();
        let group = binding
            .attributes(attrs)
            .build(store.clone(), "/")
            .map_err(|e| OutputError::Zarr(e.to_string()))?;
        group
            .store_metadata()
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        let [n_time, n_depth, n_ensemble, n_obs, _] = tensor.shape();
        let tensor_shape = vec![
            n_time as u64,
            n_depth as u64,
            n_ensemble as u64,
            n_obs as u64,
        ];
        let axis_names = vec!["time", "depth", "ensemble", "obs_flag"];

        // One variable per species over the four indexing axes.
        for (s, species) in dims.species.iter().enumerate() {
            let mut attrs = serde_json::Map::new();
            attrs.insert("units".to_string(), json!(species_unit));
            attrs.insert("long_name".to_string(), json!(species));

            let block = tensor.species_block(s);
            write_f32_array(
                &store,
                &format!("/{}", species),
                tensor_shape.clone(),
                axis_names.clone(),
                attrs,
                &block,
            )?;
            debug!(species = %species, cells = block.len(), "wrote species variable");
        }

        // 1-D flag variables over the time axis.
        let time_shape = vec![n_time as u64];
        for (name, values, description) in [
            (
                "forecast",
                flags.forecast_values(),
                "0 = hindcast, >0 = forecast horizon in steps",
            ),
            (
                "data_assimilation",
                flags.data_assimilation_values(),
                "0 = free run, >0 = number of assimilated observations",
            ),
        ] {
            let mut attrs = serde_json::Map::new();
            attrs.insert("units".to_string(), json!("dimensionless"));
            attrs.insert("long_name".to_string(), json!(description));
            write_f32_array(
                &store,
                &format!("/{}", name),
                time_shape.clone(),
                vec!["time"],
                attrs,
                &values,
            )?;
        }

        // 1-D coordinate arrays make the container self-describing.
        for dim in catalog.iter().filter(|d| d.name != "species") {
            let mut attrs = serde_json::Map::new();
            attrs.insert("units".to_string(), json!(dim.unit));
            attrs.insert("long_name".to_string(), json!(dim.description));
            let values: Vec<f32> = dim.values.iter().map(|&v| v as f32).collect();
            write_f32_array(
                &store,
                &format!("/coord_{}", dim.name),
                vec![dim.len() as u64],
                vec![dim.name.as_str()],
                attrs,
                &values,
            )?;
        }

        Ok(())
    }

    /// Flag series must cover the time axis exactly.
    fn check_alignment(dims: &ForecastDimensions, flags: &FlagSeries) -> Result<()> {
        if flags.len() != dims.time.len() {
            return Err(forecast_core::CoreError::LengthMismatch {
                name: "flags".to_string(),
                expected: dims.time.len(),
                actual: flags.len(),
            }
            .into());
        }
        for &date in &dims.time {
            if flags.get(date).is_none() {
                return Err(OutputError::UnmatchedTime(date));
            }
        }
        Ok(())
    }
}

/// Create one f32 array, store its metadata, then its data.
///
/// Metadata is stored before data so a failure never leaves chunk data
/// without a describing header.
fn write_f32_array<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
    store: &Arc<S>,
    path: &str,
    shape: Vec<u64>,
    dimension_names: Vec<&str>,
    attributes: serde_json::Map<String, serde_json::Value>,
    data: &[f32],
) -> Result<()> {
    // Single chunk covering the whole array; forecast output is small.
    let chunk_grid: zarrs::array::ChunkGrid = shape
        .clone()
        .try_into()
        .map_err(|e| OutputError::Zarr(format!("{:?}", e)))?;

    let mut binding = ArrayBuilder::new(
        shape.clone(),
        DataType::Float32,
        chunk_grid,
        FillValue::from(FILL_VALUE),
    );
    let builder = binding
        .attributes(attributes)
        .dimension_names(Some(dimension_names));

    let array = builder
        .build(store.clone(), path)
        .map_err(|e| OutputError::Zarr(e.to_string()))?;

    array
        .store_metadata()
        .map_err(|e| OutputError::Storage(e.to_string()))?;

    let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape)
        .map_err(|e| OutputError::Zarr(e.to_string()))?;
    array
        .store_array_subset_elements(&subset, data)
        .map_err(|e| OutputError::Storage(e.to_string()))?;

    Ok(())
}

/// Reader for a previously written forecast array container.
///
/// Covers what the round-trip checks need: identifiers, species blocks, and
/// the two flag arrays.
pub struct ContainerReader {
    store: Arc<FilesystemStore>,
    project_id: String,
    model_id: String,
    iteration_id: String,
}

impl ContainerReader {
    /// Open a container rooted at a filesystem directory.
    pub fn open(path: &Path) -> Result<Self> {
        let store = Arc::new(
            FilesystemStore::new(path).map_err(|e| OutputError::Storage(e.to_string()))?,
        );

        let group = Group::open(store.clone(), "/")
            .map_err(|e| OutputError::InvalidFormat(e.to_string()))?;
        let attrs = group.attributes();

        let get = |key: &str| -> Result<String> {
            attrs
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| OutputError::MissingData(format!("group attribute {}", key)))
        };

        Ok(Self {
            project_id: get("forecast_project_id")?,
            model_id: get("forecast_model_id")?,
            iteration_id: get("forecast_iteration_id")?,
            store,
        })
    }

    /// The three identifiers stored as global attributes.
    pub fn identifiers(&self) -> Result<ForecastIdentifiers> {
        Ok(ForecastIdentifiers::new(
            &self.project_id,
            &self.model_id,
            &self.iteration_id,
        )?)
    }

    /// Read one named array in full, returning `(shape, values)`.
    pub fn read_array(&self, name: &str) -> Result<(Vec<u64>, Vec<f32>)> {
        let array = Array::open(self.store.clone(), &format!("/{}", name))
            .map_err(|_| OutputError::MissingData(format!("array {}", name)))?;
        let shape = array.shape().to_vec();
        let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape.clone())
            .map_err(|e| OutputError::InvalidFormat(e.to_string()))?;
        let values = array
            .retrieve_array_subset_elements::<f32>(&subset)
            .map_err(|e| OutputError::InvalidFormat(e.to_string()))?;
        Ok((shape, values))
    }

    /// Read the 4-D block for one species.
    pub fn read_species(&self, species: &str) -> Result<(Vec<u64>, Vec<f32>)> {
        self.read_array(species)
    }

    /// Read the two 1-D flag arrays as `(forecast, data_assimilation)`.
    pub fn read_flags(&self) -> Result<(Vec<f32>, Vec<f32>)> {
        let (_, forecast) = self.read_array("forecast")?;
        let (_, data_assimilation) = self.read_array("data_assimilation")?;
        Ok((forecast, data_assimilation))
    }
}
