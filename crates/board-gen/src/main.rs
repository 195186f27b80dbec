//! Board artifact generator.
//!
//! Reads every registered board definition, validates it and writes its
//! artifact to the output directory.

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod driver;
mod registry;
mod report;
mod sink;

use config::Config;
use registry::Registry;
use sink::{ArtifactSink, FileSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting board generation...");

    let registry = Registry::load(&config).context("failed to build board registry")?;
    if registry.is_empty() {
        warn!("No boards registered in {}", config.input_dir.display());
    }
    info!(
        "{} boards registered, writing to {}",
        registry.len(),
        config.output_dir.display()
    );

    let sink: Arc<dyn ArtifactSink> = Arc::new(FileSink::new(&config.output_dir));
    let report = driver::run(&registry, sink).await;

    if let Some(path) = &config.report {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("Run report written to {}", path.display());
    }

    if report.is_success() {
        info!("Generated {} artifacts", report.written());
        Ok(())
    } else {
        warn!(
            "{} of {} boards failed",
            report.failed(),
            report.boards.len()
        );
        anyhow::bail!("{} boards failed", report.failed())
    }
}
