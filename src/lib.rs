//! Remedia — knowledge-grounded homeopathic case-analysis service.
//!
//! Given a free-text patient case, the service extracts clinical terms,
//! searches an embedded reference corpus, and synthesizes a structured
//! recommendation report. The expensive part (corpus indexing) runs once
//! behind a single-flight service lifecycle; analysis calls are read-only
//! and may run concurrently.

pub mod analysis;
pub mod config;
pub mod embedding;
pub mod index;
pub mod lexicon;
pub mod service;

pub use analysis::{AnalysisReport, ReportStatus};
pub use service::{CaseService, ServiceManager};
