mod config;
mod output;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use graph_sdl::{FieldNaming, InputFormat, TranspileOptions, Transpiler};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "graph-sdl")]
#[command(about = "Generate GraphQL SDL from graph database schema descriptions", long_about = None)]
#[command(version)]
struct Cli {
    /// Introspection JSON or MDF YAML files, merged left to right
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Write SDL to FILE (atomic replace) instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Input format: auto, json or mdf [default: auto]
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<InputFormat>,

    /// Relationship field naming: edge or target [default: edge]
    #[arg(long, value_name = "STRATEGY")]
    naming: Option<FieldNaming>,

    /// Fail on properties without a definition
    #[arg(long)]
    strict: bool,

    /// Omit the FieldCount helper type
    #[arg(long)]
    no_helper_type: bool,

    /// Omit the comment header
    #[arg(long)]
    no_header: bool,

    /// TOML config file with defaults for the options above
    #[arg(short, long, env = "GRAPH_SDL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Config file values first, then whatever was given on the command line.
    fn transpile_options(&self) -> Result<TranspileOptions> {
        let mut options = match &self.config {
            Some(path) => config::load_config(path)?,
            None => TranspileOptions::default(),
        };

        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(naming) = self.naming {
            options.naming = naming;
        }
        if self.strict {
            options.strict = true;
        }
        if self.no_helper_type {
            options.helper_type = false;
        }
        if self.no_header {
            options.header = false;
        }

        Ok(options)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.transpile_options()?;
    debug!(?options, "resolved options");

    let mut transpiler = Transpiler::new(options);
    for input in &cli.inputs {
        transpiler
            .add_file(input)
            .with_context(|| format!("Failed to load {:?}", input))?;
    }
    let sdl = transpiler.render().context("Failed to generate SDL")?;

    output::write_output(&sdl, cli.output.as_deref())?;
    if let Some(path) = &cli.output {
        info!(path = %path.display(), "wrote SDL");
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "graph-sdl",
            "--config",
            "ignored.toml",
            "--format",
            "json",
            "--naming",
            "target",
            "--strict",
            "--no-helper-type",
            "--no-header",
            "schema.json",
        ]);
        let cli = Cli { config: None, ..cli };
        let options = cli.transpile_options().unwrap();

        assert_eq!(
            options,
            TranspileOptions {
                format: InputFormat::Json,
                naming: FieldNaming::Target,
                strict: true,
                helper_type: false,
                header: false,
            }
        );
    }

    #[test]
    fn test_no_flags_means_defaults() {
        let cli = Cli {
            config: None,
            ..Cli::parse_from(["graph-sdl", "a.yml", "b.yml"])
        };
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.transpile_options().unwrap(), TranspileOptions::default());
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Cli::try_parse_from(["graph-sdl"]).is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["graph-sdl", "--format", "xml", "a.yml"]).is_err());
    }
}
