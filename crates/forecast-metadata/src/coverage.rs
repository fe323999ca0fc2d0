//! Temporal, geographic, and taxonomic coverage blocks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, MetadataResult};

/// Period the dataset covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalCoverage {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl TemporalCoverage {
    pub fn new(begin: NaiveDate, end: NaiveDate) -> MetadataResult<Self> {
        if end < begin {
            return Err(MetadataError::schema(
                "dataset/coverage/temporalCoverage",
                format!("end {} precedes begin {}", end, begin),
            ));
        }
        Ok(Self { begin, end })
    }
}

/// Bounding box the dataset covers, in decimal degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographicCoverage {
    pub description: String,
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

impl GeographicCoverage {
    pub fn new(
        description: impl Into<String>,
        west: f64,
        east: f64,
        north: f64,
        south: f64,
    ) -> MetadataResult<Self> {
        let field = "dataset/coverage/geographicCoverage";
        if !((-180.0..=180.0).contains(&west) && (-180.0..=180.0).contains(&east)) {
            return Err(MetadataError::schema(field, "longitude out of [-180, 180]"));
        }
        if !((-90.0..=90.0).contains(&south) && (-90.0..=90.0).contains(&north)) {
            return Err(MetadataError::schema(field, "latitude out of [-90, 90]"));
        }
        if east < west {
            return Err(MetadataError::schema(field, "east bound precedes west bound"));
        }
        if north < south {
            return Err(MetadataError::schema(field, "north bound precedes south bound"));
        }
        Ok(Self {
            description: description.into(),
            west,
            east,
            north,
            south,
        })
    }
}

/// One covered taxon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub genus: String,
    pub species: String,
}

impl Taxon {
    pub fn new(genus: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            genus: genus.into(),
            species: species.into(),
        }
    }
}

/// Ordered list of covered taxa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomicCoverage {
    pub taxa: Vec<Taxon>,
}

impl TaxonomicCoverage {
    pub fn new(taxa: Vec<Taxon>) -> Self {
        Self { taxa }
    }
}

/// The full coverage block of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coverage {
    pub temporal: TemporalCoverage,
    pub geographic: GeographicCoverage,
    pub taxonomic: TaxonomicCoverage,
}
