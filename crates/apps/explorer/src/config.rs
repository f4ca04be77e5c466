use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use foundation::ids::CountryId;
use scene::feature::{GeoJsonError, load_feature_collection};
use scene::framing::{OverrideTable, OverrideTableError};
use scene::selection::FeatureRef;
use scene::style::ColorMode;
use streaming::source::{CountryDataSource, FixtureError, HttpSource, MemorySource};
use thiserror::Error;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Country news explorer for the interactive globe")]
pub struct Args {
    /// Base URL of the news/analytics API
    #[arg(long, env = "EXPLORER_API_BASE", default_value = "http://127.0.0.1:8000")]
    pub api_base: String,

    /// GeoJSON FeatureCollection with country boundaries
    #[arg(long, env = "EXPLORER_COUNTRIES", default_value = "data/countries-110m.geojson")]
    pub countries: PathBuf,

    /// JSON camera override table replacing the built-in one
    #[arg(long, env = "EXPLORER_OVERRIDES")]
    pub overrides: Option<PathBuf>,

    /// Serve news/analytics from a JSON fixture file instead of the API
    #[arg(long, env = "EXPLORER_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ColorModeArg::Light)]
    pub color_mode: ColorModeArg,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every country's extent and camera pose
    Extents,

    /// Select one country and print its news panel
    Inspect {
        /// Country id, e.g. 356
        id: CountryId,
    },

    /// Drive the controller from a recorded pointer-event script
    Replay {
        /// JSON array of timestamped events
        script: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorModeArg {
    Light,
    Dark,
}

impl From<ColorModeArg> for ColorMode {
    fn from(arg: ColorModeArg) -> Self {
        match arg {
            ColorModeArg::Light => ColorMode::Light,
            ColorModeArg::Dark => ColorMode::Dark,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Countries(#[from] GeoJsonError),
    #[error("invalid override table")]
    Overrides(#[from] OverrideTableError),
    #[error(transparent)]
    Fixtures(#[from] FixtureError),
}

async fn read(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn load_features(path: &Path) -> Result<Vec<FeatureRef>, ConfigError> {
    let text = read(path).await?;
    let features = load_feature_collection(&text)?;
    info!(path = %path.display(), count = features.len(), "loaded countries");
    Ok(features.into_iter().map(Arc::new).collect())
}

/// Built-in table unless a file is given.
pub async fn load_overrides(path: Option<&Path>) -> Result<OverrideTable, ConfigError> {
    match path {
        Some(path) => {
            let table = OverrideTable::from_json(&read(path).await?)?;
            info!(path = %path.display(), entries = table.len(), "loaded camera overrides");
            Ok(table)
        }
        None => Ok(OverrideTable::builtin()),
    }
}

pub async fn build_source(args: &Args) -> Result<Arc<dyn CountryDataSource>, ConfigError> {
    match &args.fixtures {
        Some(path) => {
            info!(path = %path.display(), "serving country data from fixtures");
            Ok(Arc::new(MemorySource::from_json(&read(path).await?)?))
        }
        None => {
            info!(api = %args.api_base, "serving country data from API");
            Ok(Arc::new(HttpSource::new(args.api_base.clone())))
        }
    }
}

pub fn find_country<'a>(features: &'a [FeatureRef], id: &CountryId) -> Option<&'a FeatureRef> {
    features.iter().find(|f| f.id.as_ref() == Some(id))
}
