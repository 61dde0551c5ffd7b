//! cssprite CLI - Host for build scripts
//!
//! Commands: run, check, defaults
//! Outputs JSON to stdout
//! Returns 2 on configuration errors, 1 on any other failure

use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use cssprite_core::{PipelineError, SpriteConfig, SpritePipeline};

#[derive(Parser)]
#[command(name = "cssprite-cli")]
#[command(about = "cssprite CLI - CSS Sprite Compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Partial JSON configuration, merged onto the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root for src.dir, dst.cssFile and dst.preloadFile
    #[arg(short, long, default_value = ".")]
    source_root: PathBuf,

    /// Root for dst.spriteFile and dst.extraSpriteFiles
    #[arg(short, long, default_value = "public")]
    output_root: PathBuf,

    /// Also print debug output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sprite, stylesheet and preload fragment
    Run,

    /// Validate the configuration and show the planned layout
    Check,

    /// Print the default configuration
    Defaults,
}

fn init_logger(verbose: bool) {
    let mut logger = env_logger::builder();
    logger.format_timestamp(None);
    logger.filter_level(LevelFilter::Warn);
    logger.filter_module(
        "cssprite_core",
        if verbose { LevelFilter::Debug } else { LevelFilter::Info },
    );
    logger.init();
}

fn print_json(value: &impl Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!(r#"{{"error": "Cannot serialize output: {}"}}"#, e);
            ExitCode::FAILURE
        }
    }
}

fn failure(error: &PipelineError) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", output);
    match error {
        PipelineError::Configuration(_) | PipelineError::Serialization(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SpriteConfig, PipelineError> {
    let Some(path) = path else {
        return Ok(SpriteConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.clone(),
        source,
    })?;
    SpriteConfig::from_json_override(&text)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => return failure(&e),
    };

    let pipeline = SpritePipeline::default();

    match cli.command {
        Commands::Run => match pipeline.run(&config, &cli.source_root, &cli.output_root) {
            Ok(report) => print_json(&serde_json::json!({
                "success": true,
                "report": report,
            })),
            Err(e) => failure(&e),
        },

        Commands::Check => match pipeline.plan(&config, &cli.source_root) {
            Ok(plan) => print_json(&serde_json::json!({
                "valid": true,
                "mode": plan.catalog.mode,
                "canvas": plan.layout.canvas,
                "icons": plan.catalog.icons(),
                "rects": plan.layout.rects,
                "warnings": plan.warnings,
            })),
            Err(e) => failure(&e),
        },

        Commands::Defaults => print_json(&SpriteConfig::default()),
    }
}
