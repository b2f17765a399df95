use clap::Parser;

/// Draws the results of a referendum on a map of the French regions.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the data sources and the outputs.
    /// Relative paths in this file are resolved against the directory of the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default data/referendum.csv) The results of the referendum, separated by semicolons.
    #[clap(long, value_parser)]
    pub referendum: Option<String>,

    /// (file path, default data/regions.csv) The list of the regions.
    #[clap(long, value_parser)]
    pub regions: Option<String>,

    /// (file path, default data/departments.csv) The list of the departments.
    #[clap(long, value_parser)]
    pub departments: Option<String>,

    /// (file path, default data/regions.geojson) The outlines of the regions.
    #[clap(long, value_parser)]
    pub geometry: Option<String>,

    /// (file path, default referendum_map.svg) Where to draw the map.
    #[clap(short, long, value_parser)]
    pub map: Option<String>,

    /// If passed as an argument, the map is not drawn.
    #[clap(long, takes_value = false)]
    pub no_render: bool,

    /// (file path, 'stdout' or empty) If specified, the summary of the results will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the summary of the results in JSON format. If provided, refmap will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
