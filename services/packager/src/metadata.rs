//! Metadata assembly for the demonstration forecast.

use chrono::NaiveDateTime;

use forecast_core::{ForecastDimensions, ForecastIdentifiers, FILL_VALUE_CODE};
use forecast_metadata::{
    AttributeDef, AttributeList, ColumnSpec, Coverage, DataTable, Dataset, ForecastMetadata,
    ForecastUncertainty, GeographicCoverage, MetadataRecord, MetadataResult, ModelDescription,
    NumberType, Party, Physical, Propagation, Taxon, TaxonomicCoverage, TemporalCoverage,
    UncertaintyClass, UncertaintyStatus,
};

/// Unit for the species population-density variables, in both the array
/// container and the attribute catalog.
pub const SPECIES_UNIT: &str = "number/meter^2";

/// Column specs matching the full-ensemble table's header.
pub fn ensemble_columns(dims: &ForecastDimensions) -> Vec<ColumnSpec> {
    let mut columns = vec![
        ColumnSpec::date("time"),
        ColumnSpec::real("depth"),
        ColumnSpec::integer("ensemble"),
        ColumnSpec::integer("obs_flag"),
    ];
    for species in &dims.species {
        columns.push(ColumnSpec::real(species.clone()));
    }
    columns.push(ColumnSpec::integer("forecast"));
    columns.push(ColumnSpec::integer("data_assimilation"));
    columns
}

/// One attribute descriptor per ensemble-table column.
fn ensemble_attributes(dims: &ForecastDimensions) -> AttributeList {
    let mut attributes = vec![
        AttributeDef::new("time", "[dimension]{time of the forecast step}")
            .with_format_string("YYYY-MM-DD"),
        AttributeDef::new("depth", "[dimension]{depth below surface}")
            .with_unit("meters")
            .with_number_type(NumberType::Real),
        AttributeDef::new("ensemble", "[dimension]{ensemble member id}")
            .with_unit("dimensionless")
            .with_number_type(NumberType::Natural),
        AttributeDef::new(
            "obs_flag",
            "[dimension]{1 = latent state, 2 = latent state plus observation error}",
        )
        .with_unit("dimensionless")
        .with_number_type(NumberType::Natural),
    ];
    for species in &dims.species {
        attributes.push(
            AttributeDef::new(
                species.clone(),
                format!("[variable]{{population density of {}}}", species),
            )
            .with_unit(SPECIES_UNIT)
            .with_number_type(NumberType::Real)
            .with_missing_value_code(FILL_VALUE_CODE),
        );
    }
    attributes.push(
        AttributeDef::new("forecast", "[flag]{0 = hindcast, >0 = forecast horizon in steps}")
            .with_unit("dimensionless")
            .with_number_type(NumberType::Whole),
    );
    attributes.push(
        AttributeDef::new(
            "data_assimilation",
            "[flag]{0 = free run, >0 = number of assimilated observations}",
        )
        .with_unit("dimensionless")
        .with_number_type(NumberType::Whole),
    );
    AttributeList::new(attributes)
}

/// The uncertainty classes the demonstration model actually represents.
fn uncertainty(ensemble_size: u32) -> ForecastUncertainty {
    ForecastUncertainty {
        initial_conditions: UncertaintyClass::with_status(UncertaintyStatus::Propagates)
            .complexity(2)
            .propagation(Propagation::ensemble(ensemble_size)),
        drivers: UncertaintyClass::absent(),
        parameters: UncertaintyClass::with_status(UncertaintyStatus::Present).complexity(5),
        random_effects: UncertaintyClass::absent(),
        process_error: UncertaintyClass::with_status(UncertaintyStatus::Propagates)
            .complexity(2)
            .covariance(false)
            .propagation(Propagation::ensemble(ensemble_size)),
        obs_error: UncertaintyClass::with_status(UncertaintyStatus::Present),
    }
}

/// Assemble the full metadata record for one demonstration iteration.
pub fn build_record(
    dims: &ForecastDimensions,
    ids: &ForecastIdentifiers,
    issue_time: NaiveDateTime,
    ensemble_object_name: &str,
) -> MetadataResult<MetadataRecord> {
    let begin = dims.time[0];
    let end = *dims.time.last().expect("non-empty time axis");

    let dataset = Dataset {
        title: "Two-species population forecast (demonstration)".to_string(),
        creator: Party::individual("A. Forecaster").with_email("forecaster@example.org"),
        contact: Party::individual("A. Forecaster").with_email("forecaster@example.org"),
        pub_date: begin,
        intellectual_rights: "https://creativecommons.org/licenses/by/4.0/".to_string(),
        abstract_text: format!(
            "{}-day ensemble forecast of a toy two-species competition model at {} depths.",
            dims.time.len(),
            dims.depth.len()
        ),
        data_table: DataTable {
            entity_name: "forecast-ensemble".to_string(),
            description: "Full-ensemble forecast output, one row per (time, depth, ensemble, obs_flag)"
                .to_string(),
            physical: Physical::csv(ensemble_object_name),
            attributes: ensemble_attributes(dims),
        },
        keywords: vec![
            "ecological forecast".to_string(),
            "population dynamics".to_string(),
            "ensemble".to_string(),
        ],
        coverage: Coverage {
            temporal: TemporalCoverage::new(begin, end)?,
            geographic: GeographicCoverage::new("demonstration lake", -89.5, -89.4, 45.3, 45.2)?,
            taxonomic: TaxonomicCoverage::new(vec![
                Taxon::new("Exemplarus", "unus"),
                Taxon::new("Exemplarus", "duo"),
            ]),
        },
    };

    let forecast = ForecastMetadata {
        timestep: "1 day".to_string(),
        forecast_horizon: format!("{} days", dims.time.len()),
        issue_time,
        identifiers: ids.clone(),
        model_description: ModelDescription {
            name: "discrete-time two-species competition".to_string(),
            model_type: "process-based".to_string(),
            repository: "https://github.com/yourorg/forecast-standards".to_string(),
        },
        uncertainty: uncertainty(dims.ensemble.len() as u32),
    };

    Ok(MetadataRecord::assemble(dataset, forecast))
}
