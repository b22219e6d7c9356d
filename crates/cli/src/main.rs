//! UniSdk - generates a C# SDK from a reflected engine model

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unisdk_core::{Config, GenerationEvent, SdkFile};
use unisdk_output::SdkGenerator;

#[derive(Parser)]
#[command(name = "unisdk", version, about = "Generate a C# SDK from a reflected engine model")]
struct Args {
    /// Model file exported by the analyzer (JSON)
    model: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "sdk")]
    output: PathBuf,

    /// Generator configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the generation report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "unisdk=debug,unisdk_output=debug,unisdk_core=debug"
    } else {
        "unisdk=info,unisdk_output=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let mut sdk = SdkFile::load(&args.model)
        .with_context(|| format!("failed to load model {}", args.model.display()))?;
    info!("Loaded {} packages from {:?}", sdk.packages.len(), args.model);

    let mut generator = SdkGenerator::new(config)?;
    generator.subscribe(|event| match event {
        GenerationEvent::Progress {
            label,
            processed,
            remaining,
        } => debug!("[{}/{}] {}", processed + 1, processed + remaining, label),
        GenerationEvent::Status(text) => info!("{}", text),
    });

    let report = generator
        .generate(&mut sdk, &args.output)
        .context("SDK generation failed")?;

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    println!(
        "Generated {} of {} packages ({} enums, {} structs) into {}",
        report.generated_packages,
        report.packages,
        report.enums,
        report.structs,
        args.output.display()
    );
    for (package, depend) in &report.cycles {
        println!("  cycle: {} <-> {}", package, depend);
    }

    Ok(())
}
