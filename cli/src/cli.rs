use std::path::PathBuf;

use anyhow::Result;
use votemap::{Config, MapLevel, ViewState};

/// Vote-share map CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "votemap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON config file; missing fields take their defaults
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Village shapefile, overrides the config
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub shapefile: Option<PathBuf>,

    /// Sheet URL or CSV path, overrides the config
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    /// Village id field of the shapefile, overrides the config
    #[arg(long, global = true)]
    pub key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(shapefile) = &self.shapefile { config.shapefile = shapefile.clone() }
        if let Some(sheet) = &self.sheet { config.sheet = sheet.clone() }
        if let Some(key) = &self.key { config.shapefile_key = key.clone() }
        Ok(config)
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build the map document for one level (and optionally an SVG image)
    Render(RenderArgs),

    /// Write the summary table as CSV
    Summary(SummaryArgs),

    /// Save a snapshot of the remote sheet
    Fetch(FetchArgs),

    /// Describe the shapefile: records, geometry mix, attribute columns
    Inspect(InspectArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum Level {
    #[default]
    Village,
    Ac,
}

/// Level and grouping shared by `render` and `summary`.
#[derive(clap::Args, Debug)]
pub struct ViewArgs {
    /// Map level
    #[arg(short, long, value_enum, default_value_t = Level::Village)]
    pub level: Level,

    /// Group constituencies by the official AC name instead of the dummy AC
    #[arg(long)]
    pub official: bool,
}

impl ViewArgs {
    pub fn state(&self) -> ViewState {
        ViewState {
            level: match self.level {
                Level::Village => MapLevel::Village,
                Level::Ac => MapLevel::AssemblyConstituency,
            },
            use_dummy: !self.official,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output map document (JSON), defaults to "./map.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also draw an SVG choropleth to this path
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,

    /// Field coloured in the SVG, defaults to the first party's share
    #[arg(long)]
    pub field: Option<String>,

    /// Also write the summary table to this CSV path
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub summary: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output CSV file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Village rows to include, defaults to the config value
    #[arg(short, long)]
    pub rows: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Output CSV file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {}
