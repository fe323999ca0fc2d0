//! Integration test: write a forecast array container and read it back.
//!
//! 1. Build the reference scenario (30 days from 2001-03-04, depths
//!    [1, 3, 5], 10 ensemble members, both obs_flag values, two species)
//! 2. Write it to a Zarr V3 container
//! 3. Read it back and verify shapes, identifiers, values, and fill cells

use chrono::NaiveDate;

use forecast_core::{
    FlagSeries, ForecastDimensions, ForecastIdentifiers, ForecastTensor, ObsFlag, FILL_VALUE,
};
use forecast_output::{ContainerReader, ContainerWriter, OutputError};

fn reference_dims() -> ForecastDimensions {
    ForecastDimensions::new(
        ForecastDimensions::daily_time(NaiveDate::from_ymd_opt(2001, 3, 4).unwrap(), 30),
        vec![1.0, 3.0, 5.0],
        (1..=10).collect(),
        ObsFlag::both(),
        vec!["species_1".to_string(), "species_2".to_string()],
    )
    .unwrap()
}

/// Deterministic cell values so read-back can be verified exactly.
fn reference_tensor(dims: &ForecastDimensions) -> ForecastTensor {
    let mut tensor = ForecastTensor::filled(dims);
    for t in 0..30 {
        for d in 0..3 {
            for e in 0..10 {
                for o in 0..2 {
                    for s in 0..2 {
                        // Leave one structurally absent cell per species.
                        if t == 0 && d == 0 && e == 0 && o == 0 {
                            continue;
                        }
                        let value = (t * 10_000 + d * 1_000 + e * 10 + o * 5 + s) as f32;
                        tensor.set(t, d, e, o, s, value);
                    }
                }
            }
        }
    }
    tensor
}

fn reference_flags(dims: &ForecastDimensions) -> FlagSeries {
    let forecast: Vec<u32> = (0u32..30).map(|i| if i < 5 { 0 } else { i - 4 }).collect();
    let data_assimilation: Vec<u32> = (0u32..30).map(|i| if i < 5 { 1 } else { 0 }).collect();
    FlagSeries::new(dims.time.clone(), forecast, data_assimilation).unwrap()
}

#[test]
fn test_container_roundtrip() {
    let dims = reference_dims();
    let tensor = reference_tensor(&dims);
    let flags = reference_flags(&dims);
    let ids = ForecastIdentifiers::new("logistic-demo", "v0.1", "20010304T060000").unwrap();

    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("forecast.zarr");

    ContainerWriter::write_to_path(&path, &tensor, &dims, &flags, &ids, "number/meter^2")
        .expect("failed to write container");

    let reader = ContainerReader::open(&path).expect("failed to open container");

    // Global attributes round-trip as the identifiers.
    let read_ids = reader.identifiers().unwrap();
    assert_eq!(read_ids, ids);

    // Species arrays have the exact dimension-product shape.
    for (s, species) in dims.species.iter().enumerate() {
        let (shape, values) = reader.read_species(species).unwrap();
        assert_eq!(shape, vec![30, 3, 10, 2]);
        assert_eq!(values.len(), 30 * 3 * 10 * 2);
        assert_eq!(values, tensor.species_block(s));
    }

    // The unwritten cell reads back as the declared fill value.
    let (_, species_1) = reader.read_species("species_1").unwrap();
    assert_eq!(species_1[0], FILL_VALUE);
    // A written neighbor does not.
    assert_ne!(species_1[1], FILL_VALUE);

    // Flag arrays are 1-D over time.
    let (forecast, data_assimilation) = reader.read_flags().unwrap();
    assert_eq!(forecast.len(), 30);
    assert_eq!(data_assimilation.len(), 30);
    assert_eq!(forecast, flags.forecast_values());
    assert_eq!(data_assimilation, flags.data_assimilation_values());

    // Coordinate arrays are present and sized to their axes.
    let (time_shape, time_values) = reader.read_array("coord_time").unwrap();
    assert_eq!(time_shape, vec![30]);
    assert_eq!(time_values[0], 0.0);
    assert_eq!(time_values[29], 29.0);
    let (depth_shape, depth_values) = reader.read_array("coord_depth").unwrap();
    assert_eq!(depth_shape, vec![3]);
    assert_eq!(depth_values, vec![1.0, 3.0, 5.0]);
}

#[test]
fn test_misaligned_flags_fail_before_write() {
    let dims = reference_dims();
    let tensor = reference_tensor(&dims);
    let ids = ForecastIdentifiers::new("logistic-demo", "v0.1", "20010304T060000").unwrap();

    // Flags cover a different date range entirely.
    let other = ForecastDimensions::daily_time(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(), 30);
    let flags = FlagSeries::new(other, vec![0; 30], vec![0; 30]).unwrap();

    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("forecast.zarr");

    let err = ContainerWriter::write_to_path(&path, &tensor, &dims, &flags, &ids, "number/meter^2")
        .unwrap_err();
    assert!(matches!(err, OutputError::UnmatchedTime(_)));

    // Validation failed before any file was created.
    assert!(!path.exists());
}

#[test]
fn test_bad_species_unit_fails_before_write() {
    let dims = reference_dims();
    let tensor = reference_tensor(&dims);
    let flags = reference_flags(&dims);
    let ids = ForecastIdentifiers::new("logistic-demo", "v0.1", "20010304T060000").unwrap();

    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("forecast.zarr");

    let err = ContainerWriter::write_to_path(&path, &tensor, &dims, &flags, &ids, "metrez")
        .unwrap_err();
    assert!(matches!(err, OutputError::Core(_)));
    assert!(!path.exists());
}

#[test]
fn test_full_tabular_pipeline_row_counts() {
    use forecast_output::{EnsembleTable, SummaryTable};

    let dims = reference_dims();
    let tensor = reference_tensor(&dims);
    let flags = reference_flags(&dims);

    let table = EnsembleTable::from_tensor(&tensor, &dims, &flags).unwrap();
    assert_eq!(table.row_count(), 1800);

    let summary = SummaryTable::from_ensemble(&table);
    assert_eq!(summary.row_count(), 720);

    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let ensemble_path = temp_dir.path().join("forecast-ensemble.csv");
    let summary_path = temp_dir.path().join("forecast-summary.csv");

    table.write_csv(&ensemble_path).unwrap();
    summary.write_csv(&summary_path).unwrap();

    let ensemble_csv = std::fs::read_to_string(&ensemble_path).unwrap();
    let mut lines = ensemble_csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "time,depth,ensemble,obs_flag,species_1,species_2,forecast,data_assimilation"
    );
    assert_eq!(ensemble_csv.lines().count(), 1 + 1800);

    let summary_csv = std::fs::read_to_string(&summary_path).unwrap();
    assert_eq!(summary_csv.lines().count(), 1 + 720);
    assert!(summary_csv.contains("Conf_interv_02.5"));
    assert!(summary_csv.contains("Pred_interv_97.5"));
}
