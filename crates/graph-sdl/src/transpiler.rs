//! File-level entry points: collect inputs, build the model, emit SDL.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::emit;
use crate::input::{self, SourceDocument};
use crate::model::{ModelBuilder, SchemaModel};
use crate::options::TranspileOptions;
use crate::{Result, SdlError};

/// Collects input documents in order and turns them into SDL.
///
/// Nothing is produced until every input has been read, merged and
/// validated; any error leaves no partial output behind.
#[derive(Debug)]
pub struct Transpiler {
    options: TranspileOptions,
    builder: ModelBuilder,
    sources: Vec<PathBuf>,
}

impl Transpiler {
    pub fn new(options: TranspileOptions) -> Self {
        Self {
            options,
            builder: ModelBuilder::new(),
            sources: Vec::new(),
        }
    }

    pub fn options(&self) -> &TranspileOptions {
        &self.options
    }

    /// Read `path` and overlay it onto everything added before.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let doc = input::load_file(path.as_ref(), self.options.format)?;
        Ok(self.add_document(doc))
    }

    /// Parse `content` as if it had been read from `path`.
    pub fn add_str(&mut self, path: impl AsRef<Path>, content: &str) -> Result<&mut Self> {
        let doc = input::parse_str(path.as_ref(), content, self.options.format)?;
        Ok(self.add_document(doc))
    }

    pub fn add_document(&mut self, doc: SourceDocument) -> &mut Self {
        self.sources.push(doc.path.clone());
        self.builder.merge(doc);
        self
    }

    /// Resolve everything added so far into a [`SchemaModel`].
    pub fn build(self) -> Result<SchemaModel> {
        if self.sources.is_empty() {
            return Err(SdlError::NoInput);
        }
        self.builder.build(&self.options)
    }

    /// Build the model and emit it as SDL.
    pub fn render(self) -> Result<String> {
        let options = self.options.clone();
        let sources = self.sources.len();
        let model = self.build()?;
        let sdl = emit::emit(&model, &options)?;

        info!(
            sources,
            types = model.nodes.len(),
            relationships = model.nodes.iter().map(|n| n.relationships.len()).sum::<usize>(),
            "generated SDL"
        );
        Ok(sdl)
    }
}

/// Transpile `paths`, merged left to right, into SDL.
pub fn transpile_files<P: AsRef<Path>>(paths: &[P], options: TranspileOptions) -> Result<String> {
    let mut transpiler = Transpiler::new(options);
    for path in paths {
        transpiler.add_file(path)?;
    }
    transpiler.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input() {
        let err = Transpiler::new(TranspileOptions::default()).render().unwrap_err();
        assert!(matches!(err, SdlError::NoInput));
    }

    #[test]
    fn test_mixed_formats_merge() {
        let mut transpiler = Transpiler::new(TranspileOptions::default());
        transpiler
            .add_str(
                "schema.json",
                r#"{"schema": {"nodes": [{"labels": ["study"], "properties": [{"key": "study_id", "types": ["String"]}]}]}}"#,
            )
            .unwrap()
            .add_str("extra.yml", "Nodes:\n  study:\n    Props:\n      - phase\nPropDefinitions:\n  phase:\n    Type: integer\n")
            .unwrap();

        let model = transpiler.build().unwrap();
        let study = model.node("study").unwrap();
        let names: Vec<_> = study.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["study_id", "phase"]);
    }
}
