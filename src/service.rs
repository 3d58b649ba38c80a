//! Service lifecycle: one expensive initialization (directory bootstrap
//! plus corpus indexing), then cheap read-only analysis calls.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::analysis::compose::{ReportComposer, TemplateComposer, ANALYSIS_SYSTEM_PROMPT};
use crate::analysis::remedies::remedy_info;
use crate::analysis::synthesizer::CaseSynthesizer;
use crate::analysis::AnalysisReport;
use crate::config::ServiceConfig;
use crate::embedding::{EmbeddingProvider, HashEmbedder};
use crate::index::chunker::OverlapChunker;
use crate::index::indexer::{CorpusIndexer, IndexedCorpus};
use crate::index::store::SqliteVectorIndex;
use crate::index::IndexError;
use crate::lexicon::Lexicon;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to prepare data directories: {0}")]
    Bootstrap(#[from] std::io::Error),
    #[error("indexing failed: {0}")]
    Index(#[from] IndexError),
    #[error("initialization task failed: {0}")]
    Init(#[from] tokio::task::JoinError),
}

/// A fully initialized analysis service: open vector index, indexed
/// corpus, embedding provider, and composition seam.
///
/// Construction does all the heavy lifting; every method afterwards is
/// read-only, so one instance can be shared behind an `Arc` across tasks.
pub struct CaseService {
    config: ServiceConfig,
    lexicon: Lexicon,
    embedder: Box<dyn EmbeddingProvider>,
    index: SqliteVectorIndex,
    composer: Box<dyn ReportComposer>,
    corpus: IndexedCorpus,
}

impl CaseService {
    /// Initialize with the default lexicon, offline embedder, and
    /// template composer.
    pub fn initialize(config: ServiceConfig) -> Result<Self, ServiceError> {
        Self::initialize_with(
            config,
            Lexicon::default(),
            Box::new(HashEmbedder::new()),
            Box::new(TemplateComposer),
        )
    }

    /// Initialize with explicit lexicon and provider implementations.
    /// This is the seam a practice extends its clinical terms through
    /// (e.g. `Lexicon::from_json`), and the one tests plug doubles into.
    pub fn initialize_with(
        config: ServiceConfig,
        lexicon: Lexicon,
        embedder: Box<dyn EmbeddingProvider>,
        composer: Box<dyn ReportComposer>,
    ) -> Result<Self, ServiceError> {
        tracing::info!(
            corpus = %config.corpus_dir.display(),
            index = %config.index_path.display(),
            "initializing case service"
        );
        config.bootstrap()?;

        let index = SqliteVectorIndex::open(&config.index_path)?;
        let chunker = OverlapChunker::new(config.chunk_size, config.chunk_overlap);
        let corpus =
            CorpusIndexer::new(chunker, &embedder, &index).index_corpus(&config.corpus_dir)?;

        if corpus.is_empty() {
            tracing::warn!("knowledge corpus is empty; analyses will use general principles only");
        }

        Ok(Self {
            config,
            lexicon,
            embedder,
            index,
            composer,
            corpus,
        })
    }

    /// Analyze one patient case. Infallible by contract: internal faults
    /// surface as an error-status report, never as `Err`.
    pub fn analyze(&self, patient_text: &str) -> AnalysisReport {
        CaseSynthesizer::new(
            &self.embedder,
            &self.index,
            self.composer.as_ref(),
            &self.lexicon,
            self.config.top_k,
        )
        .analyze(patient_text)
    }

    /// Informational sheet for a single remedy name.
    pub fn remedy_info(&self, remedy_name: &str) -> String {
        remedy_info(remedy_name)
    }

    /// The fixed analytical frame this service operates under.
    pub fn system_prompt(&self) -> &'static str {
        ANALYSIS_SYSTEM_PROMPT
    }

    pub fn corpus_summary(&self) -> &IndexedCorpus {
        &self.corpus
    }

    pub fn knowledge_base_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

type ServiceFactory = Arc<dyn Fn() -> Result<CaseService, ServiceError> + Send + Sync>;

/// Lazy single-flight holder for the shared [`CaseService`].
///
/// The slot mutex serializes initialization: concurrent `get_instance`
/// callers wait for the first to finish and then share its `Arc`. A
/// failed initialization leaves the slot empty, so the next call retries
/// instead of caching the failure.
pub struct ServiceManager {
    slot: Mutex<Option<Arc<CaseService>>>,
    factory: ServiceFactory,
}

impl ServiceManager {
    /// Manager over the user-level data directory (`~/Remedia`).
    pub fn with_defaults() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        Self::with_factory(move || CaseService::initialize(config.clone()))
    }

    /// Inject an arbitrary constructor, used by tests to count or fail
    /// initializations.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<CaseService, ServiceError> + Send + Sync + 'static,
    {
        Self {
            slot: Mutex::new(None),
            factory: Arc::new(factory),
        }
    }

    /// Get the shared service, initializing it on first use.
    ///
    /// Initialization does blocking filesystem and SQLite work, so it
    /// runs on the blocking pool; only the slot lock is held on the
    /// async executor, which is what serializes concurrent first calls.
    pub async fn get_instance(&self) -> Result<Arc<CaseService>, ServiceError> {
        let mut slot = self.slot.lock().await;
        if let Some(service) = slot.as_ref() {
            return Ok(Arc::clone(service));
        }

        let factory = Arc::clone(&self.factory);
        let service = Arc::new(tokio::task::spawn_blocking(move || factory()).await??);
        *slot = Some(Arc::clone(&service));
        tracing::info!("case service ready");
        Ok(service)
    }

    /// Drop the cached instance; the next `get_instance` reinitializes.
    pub async fn reset(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
        tracing::debug!("case service reset");
    }
}
