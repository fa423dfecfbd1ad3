//! Glycosense: Diabetes class predictor
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glycosense::adapters::sanitize::SanitizingMakeWriter;
use glycosense::adapters::LinearClassifier;
use glycosense::config::AppConfig;
use glycosense::ports::Classifier;
use glycosense::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env();

    // Writing logs to the terminal would corrupt the TUI (alternate screen),
    // so an interactive session logs to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();
    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Glycosense...");

    // Refuse to start without a usable model; every prediction depends on it.
    let classifier = LinearClassifier::load(&config.model_path, config.model_sha256.as_deref())
        .with_context(|| {
            format!(
                "Failed to load model from {:?}. Set GLYCOSENSE_MODEL_PATH to a directory containing model.json.",
                config.model_path
            )
        })?;
    let classifier: Arc<dyn Classifier> = Arc::new(classifier);

    let mut app = App::new(classifier)?;
    app.run()?;

    tracing::info!("Glycosense shutdown complete.");
    Ok(())
}
