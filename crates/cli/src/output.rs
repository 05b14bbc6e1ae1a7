use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `sdl` to `path`, or to stdout when there is no path.
pub fn write_output(sdl: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => write_atomic(path, sdl),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(sdl.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write to stdout")
        }
    }
}

/// Replace `path` in one step: readers see either the old file or the new one.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    // the temp file has to live on the same filesystem as the target
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {:?}", file.path()))?;
    file.persist(path)
        .with_context(|| format!("Failed to write output file: {:?}", path))?;

    Ok(())
}
