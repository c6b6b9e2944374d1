// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Ummon exporter
//
//  Each scrape: GET /status, /tasks, / on ummon-server → metrics
//  Config:      optional YAML file + UMMON_* environment
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use ummon_core::ExporterConfig;
use ummon_server::AppState;
use ummon_translator::{HttpSource, SnapshotSource, Translator};

#[derive(Parser, Debug)]
#[command(name = "ummon-exporter", version, about = "Prometheus exporter for ummon-server")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Scrape once, print the document to stdout and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // ── Config ──
    if let Some(path) = &cli.config {
        info!(path = %path.display(), "Loading config file");
    }
    let config = ExporterConfig::load(cli.config.as_deref())?;
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %config.upstream.host,
        scheme = %config.upstream.scheme,
        mapping = ?config.mapping,
        "Ummon exporter starting"
    );

    // ── Translator ──
    let source: Arc<dyn SnapshotSource> = Arc::new(HttpSource::new(&config.upstream)?);
    let translator = Translator::new(source, config.mapping, config.upstream.host.clone());

    if cli.once {
        let document = translator.render().await?;
        print!("{document}");
        return Ok(());
    }

    let state = Arc::new(AppState {
        translator,
        upstream: config.upstream.host.clone(),
        metrics_path: config.server.metrics_path.clone(),
    });

    ummon_server::serve(&config.server, state).await
}
