use crate::args::Args;
use crate::refmap::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_REFERENDUM: &str = "data/referendum.csv";
pub const DEFAULT_REGIONS: &str = "data/regions.csv";
pub const DEFAULT_DEPARTMENTS: &str = "data/departments.csv";
pub const DEFAULT_GEOMETRY: &str = "data/regions.geojson";
pub const DEFAULT_MAP: &str = "referendum_map.svg";
pub const DEFAULT_TITLE: &str = "Choice A among expressed ballots";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub referendum: Option<String>,
    pub regions: Option<String>,
    pub departments: Option<String>,
    pub geometry: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "mapPath")]
    pub map_path: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
    pub render: Option<bool>,
}

/// The content of the JSON configuration file. All the fields are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    pub title: Option<String>,
    #[serde(rename = "dataSources", default)]
    pub data_sources: SourcesConfig,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
}

/// The configuration echoed in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub title: String,
    pub referendum: String,
    pub regions: String,
    pub departments: String,
    pub geometry: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DataSources {
    pub referendum: String,
    pub regions: String,
    pub departments: String,
    pub geometry: String,
}

/// Everything a run needs, after merging the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MapSettings {
    pub title: String,
    pub sources: DataSources,
    /// No map is drawn if empty.
    pub map_path: Option<String>,
    pub summary_path: Option<String>,
    pub reference_path: Option<String>,
}

pub fn read_config(path: &str) -> MapResult<MapConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Merges the command line arguments with the configuration file, if any.
///
/// The command line takes precedence. Relative paths from the configuration file
/// are resolved against the directory of the configuration file.
pub fn read_settings(args: &Args) -> MapResult<MapSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (MapConfig::default(), PathBuf::new()),
    };
    Ok(merge_settings(args, &config, &root))
}

fn resolve(root: &Path, path: &str) -> String {
    let p: PathBuf = [root, Path::new(path)].iter().collect();
    p.as_path().display().to_string()
}

fn pick(arg: &Option<String>, configured: &Option<String>, root: &Path, default: &str) -> String {
    match (arg, configured) {
        (Some(x), _) => x.clone(),
        (None, Some(x)) => resolve(root, x),
        (None, None) => default.to_string(),
    }
}

fn merge_settings(args: &Args, config: &MapConfig, root: &Path) -> MapSettings {
    let ds = &config.data_sources;
    let os = &config.output_settings;
    let render = !args.no_render && os.render.unwrap_or(true);
    let map_path = if render {
        Some(pick(&args.map, &os.map_path, root, DEFAULT_MAP))
    } else {
        None
    };
    let summary_path = match (&args.out, &os.summary_path) {
        (Some(x), _) => Some(x.clone()),
        (None, Some(x)) if x == "stdout" => Some(x.clone()),
        (None, Some(x)) => Some(resolve(root, x)),
        (None, None) => None,
    };
    MapSettings {
        title: config
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        sources: DataSources {
            referendum: pick(&args.referendum, &ds.referendum, root, DEFAULT_REFERENDUM),
            regions: pick(&args.regions, &ds.regions, root, DEFAULT_REGIONS),
            departments: pick(&args.departments, &ds.departments, root, DEFAULT_DEPARTMENTS),
            geometry: pick(&args.geometry, &ds.geometry, root, DEFAULT_GEOMETRY),
        },
        map_path,
        summary_path,
        reference_path: args.reference.clone(),
    }
}

/// Reads a summary previously written by a run, for comparison.
pub fn read_summary(path: &str) -> MapResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}
