use std::error::Error;

use tracing_subscriber::EnvFilter;

use remedia::config;
use remedia::service::ServiceManager;

/// Built-in demonstration case, analyzed when no case file is given.
const SAMPLE_CASE: &str = "\
Patient presents with chronic headaches, worse in the morning, \
accompanied by anxiety and digestive issues. Symptoms worse from \
stress and better in open air. Patient is irritable and impatient.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let case_text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read case file {path}: {e}"))?,
        None => {
            tracing::info!("no case file given; analyzing the built-in sample case");
            SAMPLE_CASE.to_string()
        }
    };

    let manager = ServiceManager::with_defaults();
    let service = manager.get_instance().await?;

    if service.knowledge_base_empty() {
        tracing::warn!(
            corpus = %service.config().corpus_dir.display(),
            "knowledge corpus is empty; drop .txt or .md reference texts there and rerun"
        );
    }

    let report = service.analyze(&case_text);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
