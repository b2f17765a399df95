use log::{debug, info, warn};

use referendum_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use geo::MultiPolygon;
use plotters::drawing::DrawingAreaErrorKind;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::refmap::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_geojson;
mod render;

#[derive(Debug, Snafu)]
pub enum MapError {
    #[snafu(display("Could not open source file {path}"))]
    SourceNotFound {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not read the content of {path}"))]
    ReadingSource {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Malformed record in {path} at line {lineno}"))]
    MalformedRecord {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Could not parse the GeoJSON content of {path}"))]
    ParsingGeoJson {
        source: geojson::Error,
        path: String,
    },
    #[snafu(display("Malformed geometry in {path}: {message}"))]
    MalformedGeometry { path: String, message: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("{source}"))]
    Tally { source: TallyError },
    #[snafu(display("Could not draw the map to {path}"))]
    Rendering {
        source: DrawingAreaErrorKind<std::io::Error>,
        path: String,
    },
    #[snafu(display("Could not write the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between computed summary and reference summary {path}"))]
    ReferenceMismatch { path: String },
}

pub type MapResult<T> = Result<T, MapError>;

/// The results of a region, with the outline of the region.
pub type RegionMapEntry = RenderedRegionResult<MultiPolygon<f64>>;

fn results_to_json(rendered: &[RegionMapEntry]) -> Vec<JSValue> {
    rendered
        .iter()
        .map(|r| {
            let c = &r.result.counts;
            json!({
                "regionCode": r.result.region_code,
                "regionName": r.result.region_name,
                "registered": c.registered,
                "abstentions": c.abstentions,
                "null": c.nulls,
                "choiceA": c.choice_a,
                "choiceB": c.choice_b,
                "ratio": r.ratio,
            })
        })
        .collect()
}

fn build_summary_js(settings: &MapSettings, rendered: &[RegionMapEntry]) -> JSValue {
    let c = OutputConfig {
        title: settings.title.clone(),
        referendum: settings.sources.referendum.clone(),
        regions: settings.sources.regions.clone(),
        departments: settings.sources.departments.clone(),
        geometry: settings.sources.geometry.clone(),
    };
    json!({
        "config": c,
        "results": results_to_json(rendered) })
}

/// Prints the ratio of each region, in the order of the table.
fn print_ratios(rendered: &[RegionMapEntry]) {
    println!("{:<32} ratio", "region");
    for r in rendered.iter() {
        let ratio = match r.ratio {
            Some(x) => format!("{:.4}", x),
            None => "n/a".to_string(),
        };
        println!("{:<32} {}", r.result.region_name, ratio);
    }
}

fn write_summary(pretty_js: &str, out: &str) -> MapResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
        return Ok(());
    }
    info!("Writing summary to {:?}", out);
    fs::write(out, pretty_js).context(WritingSummarySnafu { path: out })
}

fn check_reference(pretty_js_stats: &str, reference_path: &str) -> MapResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("Summary matches the reference {:?}", reference_path);
    Ok(())
}

/// Runs the whole pipeline: loading, joins, aggregation, geometry join and outputs.
///
/// Nothing is drawn or written if any of the steps before fails.
pub fn run_referendum_map(settings: &MapSettings) -> MapResult<Vec<RegionMapEntry>> {
    info!("settings: {:?}", settings);
    let sources = &settings.sources;

    let ballots = io_csv::read_referendum(&sources.referendum)?;
    let regions = io_csv::read_regions(&sources.regions)?;
    let departments = io_csv::read_departments(&sources.departments)?;

    let results = run_region_tally(&regions, &departments, &ballots).context(TallySnafu)?;

    let geometries = io_geojson::read_region_geometries(&sources.geometry)?;
    let rendered = join_geometries(&results, &geometries).context(TallySnafu)?;
    info!("run_referendum_map: {} regions on the map", rendered.len());

    let summary_js = build_summary_js(settings, &rendered);
    let pretty_js_stats = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    // Checked before anything is written out.
    if let Some(reference_path) = &settings.reference_path {
        check_reference(&pretty_js_stats, reference_path)?;
    }

    print_ratios(&rendered);
    if let Some(out) = &settings.summary_path {
        write_summary(&pretty_js_stats, out)?;
    }
    // Drawn last, so that a failed run leaves no figure behind.
    if let Some(map_path) = &settings.map_path {
        render::render_map(&rendered, &settings.title, map_path)?;
    }

    Ok(rendered)
}
