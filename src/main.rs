//! Command-line front end: reads a report and prints its metrics and
//! category as JSON.
//!
//! ```bash
//! labscan report.txt --pretty
//! cat report.txt | labscan --backend-url http://localhost:8080
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use labscan::config::{APP_NAME, APP_VERSION, ENV_BACKEND_TIMEOUT_SECS, ENV_BACKEND_URL};
use labscan::{EngineConfig, ExtractionError, MetricExtractor};

#[derive(Parser, Debug)]
#[command(name = "labscan", version, about = "Extract clinical metrics from a medical report")]
struct Args {
    /// Report text file. Reads stdin when omitted.
    #[arg(value_name = "PATH")]
    input: Option<PathBuf>,

    /// Skip the entity backend and use pattern matching only.
    #[arg(long)]
    patterns_only: bool,

    /// Base URL of the entity recognition service.
    #[arg(long, value_name = "URL", env = ENV_BACKEND_URL)]
    backend_url: Option<String>,

    /// Seconds to wait for the entity backend.
    #[arg(long, value_name = "SECS", env = ENV_BACKEND_TIMEOUT_SECS)]
    timeout_secs: Option<u64>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>, ExtractionError> {
    if let Some(path) = path {
        return Ok(std::fs::read(path)?);
    }
    let mut bytes = Vec::new();
    std::io::stdin().read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn run(args: &Args) -> Result<String, ExtractionError> {
    let mut config = EngineConfig::from_env()?;
    if let Some(url) = &args.backend_url {
        config.backend_url = Some(url.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config.backend_timeout_secs = secs;
    }
    if args.patterns_only {
        config.backend_url = None;
    }

    let engine = MetricExtractor::from_config(config)?;
    tracing::info!(engine = ?engine, "{APP_NAME} v{APP_VERSION}");

    let bytes = read_input(args.input.as_ref())?;
    let analysis = engine.analyze_report_bytes(&bytes)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };
    Ok(json)
}

fn main() -> ExitCode {
    labscan::init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "extraction failed");
            eprintln!("{APP_NAME}: {e}");
            ExitCode::FAILURE
        }
    }
}
