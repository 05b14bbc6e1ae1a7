//! Configuration file loading

use anyhow::{Context, Result};
use graph_sdl::TranspileOptions;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load transpile options from a TOML file.
///
/// Keys mirror [`TranspileOptions`]; anything left out keeps its default.
/// Unknown keys are an error so that typos don't go unnoticed.
pub fn load_config(path: &Path) -> Result<TranspileOptions> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let options: TranspileOptions = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    debug!(path = %path.display(), ?options, "loaded config");
    Ok(options)
}
