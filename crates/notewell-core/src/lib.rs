//! Notewell Core - file import pipeline
//!
//! Turns a folder of text, markdown and PDF files into notes in a document
//! store:
//! - Directory discovery with extension and depth filters (walkdir)
//! - Text and PDF conversion (lopdf)
//! - File metadata and keyword tags
//! - URL and cross-note link annotation
//! - Conflict-safe note writing with YAML front matter
//! - Sequential, cancellable runs that end with a run log note

pub mod config;
pub mod content;
pub mod jobs;
pub mod links;
pub mod metadata;
pub mod nlp;
pub mod notes;
pub mod pdf;
pub mod scanner;
pub mod storage;

use regex::Regex;

pub use config::{ConfigError, ImportConfig, ImportSettings};
pub use jobs::{
    list_import_logs, ImportError, ImportPhase, ImportProgress, ImportSummary, Importer,
    NoOpEmitter, ProgressEmitter, RunIdentity,
};
pub use nlp::TagExtractor;
pub use storage::{DocumentStore, FsVault, StoreError};

/// Compile a built-in pattern. An invalid pattern degrades to one that never
/// matches instead of panicking at the call site.
pub(crate) fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(compile_err) => {
            tracing::error!(error = %compile_err, "Invalid regex pattern");
            match Regex::new(r"$^") {
                Ok(fallback) => fallback,
                Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
            }
        }
    }
}
