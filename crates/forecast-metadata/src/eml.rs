//! EML-style XML rendering of a validated metadata record.
//!
//! The document has two top-level sections: `dataset` (authorship,
//! coverage, the data table with its attribute catalog) and
//! `additionalMetadata` (the forecast extension block). Only
//! [`crate::ValidatedRecord`] exposes this renderer.

use crate::attributes::{AttributeDef, NumberType};
use crate::record::{MetadataRecord, Party};

/// Render the full exchange document.
pub(crate) fn render(record: &MetadataRecord) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<eml:eml xmlns:eml=\"https://eml.ecoinformatics.org/eml-2.2.0\" packageId=\"{}\" system=\"{}\">\n",
        escape(&record.package_id),
        escape(&record.id_system),
    ));

    render_dataset(&mut xml, record);
    render_additional_metadata(&mut xml, record);

    xml.push_str("</eml:eml>\n");
    xml
}

fn render_dataset(xml: &mut String, record: &MetadataRecord) {
    let dataset = &record.dataset;

    xml.push_str("  <dataset>\n");
    tag(xml, 4, "title", &dataset.title);
    render_party(xml, "creator", &dataset.creator);
    tag(xml, 4, "pubDate", &dataset.pub_date.format("%Y-%m-%d").to_string());
    tag(xml, 4, "intellectualRights", &dataset.intellectual_rights);
    xml.push_str("    <abstract>\n");
    tag(xml, 6, "para", &dataset.abstract_text);
    xml.push_str("    </abstract>\n");

    if !dataset.keywords.is_empty() {
        xml.push_str("    <keywordSet>\n");
        for keyword in &dataset.keywords {
            tag(xml, 6, "keyword", keyword);
        }
        xml.push_str("    </keywordSet>\n");
    }

    render_coverage(xml, record);
    render_contact(xml, &dataset.contact);
    render_data_table(xml, record);

    xml.push_str("  </dataset>\n");
}

fn render_party(xml: &mut String, role: &str, party: &Party) {
    xml.push_str(&format!("    <{}>\n", role));
    if let Some(individual) = &party.individual {
        xml.push_str("      <individualName>\n");
        tag(xml, 8, "surName", individual);
        xml.push_str("      </individualName>\n");
    }
    if let Some(organization) = &party.organization {
        tag(xml, 6, "organizationName", organization);
    }
    if let Some(email) = &party.email {
        tag(xml, 6, "electronicMailAddress", email);
    }
    if let Some(id) = &party.id {
        tag(xml, 6, "userId", id);
    }
    xml.push_str(&format!("    </{}>\n", role));
}

fn render_contact(xml: &mut String, contact: &Party) {
    render_party(xml, "contact", contact);
}

fn render_coverage(xml: &mut String, record: &MetadataRecord) {
    let coverage = &record.dataset.coverage;

    xml.push_str("    <coverage>\n");

    xml.push_str("      <temporalCoverage>\n        <rangeOfDates>\n");
    xml.push_str(&format!(
        "          <beginDate><calendarDate>{}</calendarDate></beginDate>\n",
        coverage.temporal.begin.format("%Y-%m-%d")
    ));
    xml.push_str(&format!(
        "          <endDate><calendarDate>{}</calendarDate></endDate>\n",
        coverage.temporal.end.format("%Y-%m-%d")
    ));
    xml.push_str("        </rangeOfDates>\n      </temporalCoverage>\n");

    xml.push_str("      <geographicCoverage>\n");
    tag(xml, 8, "geographicDescription", &coverage.geographic.description);
    xml.push_str("        <boundingCoordinates>\n");
    xml.push_str(&format!(
        "          <westBoundingCoordinate>{}</westBoundingCoordinate>\n",
        coverage.geographic.west
    ));
    xml.push_str(&format!(
        "          <eastBoundingCoordinate>{}</eastBoundingCoordinate>\n",
        coverage.geographic.east
    ));
    xml.push_str(&format!(
        "          <northBoundingCoordinate>{}</northBoundingCoordinate>\n",
        coverage.geographic.north
    ));
    xml.push_str(&format!(
        "          <southBoundingCoordinate>{}</southBoundingCoordinate>\n",
        coverage.geographic.south
    ));
    xml.push_str("        </boundingCoordinates>\n      </geographicCoverage>\n");

    xml.push_str("      <taxonomicCoverage>\n");
    for taxon in &coverage.taxonomic.taxa {
        xml.push_str("        <taxonomicClassification>\n");
        tag(xml, 10, "taxonRankName", "Genus");
        tag(xml, 10, "taxonRankValue", &taxon.genus);
        xml.push_str("          <taxonomicClassification>\n");
        tag(xml, 12, "taxonRankName", "Species");
        tag(xml, 12, "taxonRankValue", &taxon.species);
        xml.push_str("          </taxonomicClassification>\n");
        xml.push_str("        </taxonomicClassification>\n");
    }
    xml.push_str("      </taxonomicCoverage>\n");

    xml.push_str("    </coverage>\n");
}

fn render_data_table(xml: &mut String, record: &MetadataRecord) {
    let table = &record.dataset.data_table;

    xml.push_str("    <dataTable>\n");
    tag(xml, 6, "entityName", &table.entity_name);
    tag(xml, 6, "entityDescription", &table.description);

    xml.push_str("      <physical>\n");
    tag(xml, 8, "objectName", &table.physical.object_name);
    if let Some(size) = table.physical.size_bytes {
        xml.push_str(&format!("        <size unit=\"bytes\">{}</size>\n", size));
    }
    xml.push_str("        <dataFormat>\n          <textFormat>\n");
    xml.push_str(&format!(
        "            <numHeaderLines>{}</numHeaderLines>\n",
        table.physical.header_lines
    ));
    tag(xml, 12, "recordDelimiter", &table.physical.record_delimiter);
    xml.push_str("            <attributeOrientation>column</attributeOrientation>\n");
    xml.push_str("            <simpleDelimited>\n");
    tag(xml, 14, "fieldDelimiter", &table.physical.field_delimiter);
    xml.push_str("            </simpleDelimited>\n");
    xml.push_str("          </textFormat>\n        </dataFormat>\n");
    xml.push_str("      </physical>\n");

    xml.push_str("      <attributeList>\n");
    for attr in &table.attributes.attributes {
        render_attribute(xml, attr);
    }
    xml.push_str("      </attributeList>\n");

    xml.push_str("    </dataTable>\n");
}

fn render_attribute(xml: &mut String, attr: &AttributeDef) {
    xml.push_str("        <attribute>\n");
    tag(xml, 10, "attributeName", &attr.name);
    tag(xml, 10, "attributeDefinition", &attr.definition);
    if let Some(unit) = &attr.unit {
        tag(xml, 10, "unit", unit);
    }
    if let Some(fmt) = &attr.format_string {
        tag(xml, 10, "formatString", fmt);
    }
    if let Some(number_type) = attr.number_type {
        let name = match number_type {
            NumberType::Natural => "natural",
            NumberType::Whole => "whole",
            NumberType::Integer => "integer",
            NumberType::Real => "real",
        };
        tag(xml, 10, "numberType", name);
    }
    if let Some(code) = &attr.missing_value_code {
        tag(xml, 10, "missingValueCode", code);
    }
    xml.push_str("        </attribute>\n");
}

fn render_additional_metadata(xml: &mut String, record: &MetadataRecord) {
    let forecast = &record.forecast;

    xml.push_str("  <additionalMetadata>\n    <metadata>\n      <forecast>\n");
    tag(xml, 8, "timestep", &forecast.timestep);
    tag(xml, 8, "forecast_horizon", &forecast.forecast_horizon);
    tag(
        xml,
        8,
        "forecast_issue_time",
        &forecast.issue_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
    );
    tag(xml, 8, "forecast_project_id", &forecast.identifiers.project_id);
    tag(xml, 8, "forecast_model_id", &forecast.identifiers.model_id);
    tag(xml, 8, "forecast_iteration_id", &forecast.identifiers.iteration_id);

    xml.push_str("        <model_description>\n");
    tag(xml, 10, "name", &forecast.model_description.name);
    tag(xml, 10, "type", &forecast.model_description.model_type);
    tag(xml, 10, "repository", &forecast.model_description.repository);
    xml.push_str("        </model_description>\n");

    for (name, class) in forecast.uncertainty.classes() {
        xml.push_str(&format!("        <{}>\n", name));
        tag(xml, 10, "status", class.status.as_str());
        if let Some(complexity) = class.complexity {
            tag(xml, 10, "complexity", &complexity.to_string());
        }
        if let Some(covariance) = class.covariance {
            tag(xml, 10, "covariance", if covariance { "TRUE" } else { "FALSE" });
        }
        if let Some(propagation) = &class.propagation {
            xml.push_str("          <propagation>\n");
            let method = match propagation.method {
                crate::uncertainty::PropagationMethod::Ensemble => "ensemble",
                crate::uncertainty::PropagationMethod::Analytic => "analytic",
            };
            tag(xml, 12, "type", method);
            if let Some(size) = propagation.ensemble_size {
                tag(xml, 12, "size", &size.to_string());
            }
            xml.push_str("          </propagation>\n");
        }
        xml.push_str(&format!("        </{}>\n", name));
    }

    xml.push_str("      </forecast>\n    </metadata>\n  </additionalMetadata>\n");
}

/// Emit one indented element with escaped text content.
fn tag(xml: &mut String, indent: usize, name: &str, content: &str) {
    xml.push_str(&" ".repeat(indent));
    xml.push_str(&format!("<{}>{}</{}>\n", name, escape(content), name));
}

/// Escape XML text content.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & c"), "a &lt; b &amp; c");
    }
}
