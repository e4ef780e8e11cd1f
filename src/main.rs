use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use navic_monitor::analysis::{
    analyze_constellation, run_dop, AnalysisError, AnalysisStatus, HealthReport, Report,
};
use navic_monitor::config::{Config, ConfigError};
use navic_monitor::elements::{DirectorySource, GpHistorySource, SourceError};

#[derive(Parser)]
#[command(name = "navic-monitor")]
#[command(about = "NavIC constellation station-keeping and coverage analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
    /// Drift, maneuvers and health verdicts for every configured satellite
    Health {
        /// Uses the built-in NavIC defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory of 2LE/3LE files
        #[arg(long, required_unless_present = "gp_json", conflicts_with = "gp_json")]
        tle_dir: Option<PathBuf>,
        /// Saved Space-Track gp_history responses
        #[arg(long = "gp-json", num_args = 1..)]
        gp_json: Vec<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// DOP samples, coverage summaries and ground-track boxes
    Dop {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        tle_dir: PathBuf,
        /// RFC 3339 window start, e.g. 2024-01-01T12:00:00Z
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Health {
            config,
            tle_dir,
            gp_json,
            output,
        } => health(config.as_deref(), tle_dir, &gp_json, output.as_deref()).await,
        Commands::Dop {
            config,
            tle_dir,
            start,
            output,
        } => dop(config.as_deref(), tle_dir, start, output.as_deref()),
    }
}

fn validate(path: &Path) -> ExitCode {
    match Config::from_file(path) {
        Ok(config) => {
            println!(
                "Configuration is valid ({} satellites, {} ground points)",
                config.satellites.len(),
                config.ground_points.len()
            );
            for sat in &config.satellites {
                let state = if sat.active { "active" } else { "inactive" };
                println!("  {} ({}): {}", sat.name, sat.norad_id, state);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn health(
    config: Option<&Path>,
    tle_dir: Option<PathBuf>,
    gp_json: &[PathBuf],
    output: Option<&Path>,
) -> ExitCode {
    let config = match load_config(config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let ids: Vec<u32> = config.satellites.iter().map(|s| s.norad_id).collect();

    let reports = match tle_dir {
        Some(dir) => match directory_source(dir) {
            Ok(source) => analyze_constellation(Arc::new(source), config, ids).await,
            Err(e) => Err(AnalysisError::from(e)),
        },
        None => match gp_history_source(gp_json) {
            Ok(source) => analyze_constellation(Arc::new(source), config, ids).await,
            Err(e) => Err(AnalysisError::from(e)),
        },
    };

    let satellites = match reports {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let failed = satellites
        .iter()
        .filter(|s| s.status == AnalysisStatus::FetchFailed)
        .count();
    if failed > 0 {
        log::warn!("{} satellites could not be fetched", failed);
    }

    write_report(&Report::new(HealthReport { satellites }), output)
}

fn dop(
    config: Option<&Path>,
    tle_dir: PathBuf,
    start: Option<DateTime<Utc>>,
    output: Option<&Path>,
) -> ExitCode {
    let result = load_config(config)
        .map_err(AnalysisError::from)
        .and_then(|config| {
            let source = directory_source(tle_dir)?;
            run_dop(&source, &config, start)
        });

    match result {
        Ok(report) => write_report(&Report::new(report), output),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn directory_source(dir: PathBuf) -> Result<DirectorySource, SourceError> {
    let mut source = DirectorySource::new(dir);
    source.load_all()?;
    Ok(source)
}

fn gp_history_source(files: &[PathBuf]) -> Result<GpHistorySource, SourceError> {
    let mut source = GpHistorySource::new();
    for file in files {
        let count = source.load_file(file)?;
        log::info!("Loaded {} gp_history records from {}", count, file.display());
    }
    Ok(source)
}

fn write_report<T: Serialize>(report: &T, output: Option<&Path>) -> ExitCode {
    let json = match serde_json::to_string_pretty(report) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing report: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(path) => match fs::write(path, json) {
            Ok(()) => {
                log::info!("Report written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error writing {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        },
        None => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
    }
}
