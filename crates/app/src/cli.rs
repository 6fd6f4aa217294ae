use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::vision::{self, DetectArgs, DetectorArgs, ServeArgs, ServerConfig};

/// Webcam face counting with a live annotated stream.
#[derive(Debug, Parser)]
#[command(name = "facecount", version, about)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    /// Flags for the default `serve` command.
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web application (default).
    Serve(ServeArgs),
    /// Resolve the cascade classifier, downloading it when missing.
    FetchCascade(DetectorArgs),
    /// Detect faces in a still image and write an annotated copy.
    Detect(DetectArgs),
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Serve(cli.serve)) {
        Command::Serve(args) => {
            let config = ServerConfig::try_from(args)?;
            vision::serve(config)
        }
        Command::FetchCascade(args) => {
            let resolved = args
                .resolver()?
                .resolve()
                .context("Failed to obtain the cascade classifier")?;
            info!("Cascade ready ({:?})", resolved.source);
            println!("{}", resolved.path.display());
            Ok(())
        }
        Command::Detect(args) => {
            let report = vision::run_detect(args)?;
            println!("Found {} faces", report.faces.len());
            println!("Result saved to: {}", report.output.display());
            Ok(())
        }
    }
}
