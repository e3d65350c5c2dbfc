use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use copyguard::{
    compare_files, fingerprint_file, scanner_from_config, CopyguardConfig, Modality,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "copyguard", version, about = "Near-duplicate detection for posts")]
struct Cli {
    /// YAML configuration file; library defaults when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the fingerprint of a file as JSON
    Fingerprint {
        #[arg(value_enum)]
        kind: Kind,
        path: PathBuf,
    },

    /// Scan `source` against `candidate` and print the report as JSON
    Compare {
        #[arg(value_enum)]
        kind: Kind,
        source: PathBuf,
        candidate: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Text,
    Image,
    Video,
    Audio,
}

impl From<Kind> for Modality {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Text => Modality::Text,
            Kind::Image => Modality::Image,
            Kind::Video => Modality::Video,
            Kind::Audio => Modality::Audio,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match &cli.config {
        Some(path) => CopyguardConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CopyguardConfig::default(),
    };
    info!(
        config = config.name.as_deref().unwrap_or("default"),
        "copyguard_start"
    );
    let scanner = scanner_from_config(&config)?;

    let output = match cli.command {
        Command::Fingerprint { kind, path } => {
            let fingerprint = fingerprint_file(&scanner, kind.into(), &path)?;
            serde_json::to_string_pretty(&fingerprint)?
        }
        Command::Compare {
            kind,
            source,
            candidate,
        } => {
            let report = compare_files(&scanner, kind.into(), &source, &candidate)?;
            serde_json::to_string_pretty(&report)?
        }
    };
    println!("{output}");

    Ok(())
}
