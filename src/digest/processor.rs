//! Run orchestration — documents in, composed digest out.
//!
//! Source documents are processed strictly sequentially: each one is
//! fully sliced and merged into the registry before the next begins, so
//! no partial registry state is ever observable. Anything that blocks
//! (fetching, sending) stays outside, behind the channel traits.

use tracing::{debug, info, warn};

use crate::config::DigestConfig;
use crate::digest::classify::SubjectClassifier;
use crate::digest::compose::{ComposedDigest, DigestComposer, Template};
use crate::digest::extract::FragmentExtractor;
use crate::digest::registry::PaperRegistry;
use crate::digest::sort::{priority_sort, record_keys};
use crate::digest::types::DigestStats;
use crate::document::Document;
use crate::error::PipelineError;

/// Subject stand-in for messages with a missing or unreadable header;
/// classifies as unknown rather than failing.
const NO_SUBJECT: &str = "(no subject)";

/// One source document paired with the subject line it arrived under.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub subject: Option<String>,
    pub document: Document,
}

impl SourceDocument {
    pub fn new(subject: Option<String>, document: Document) -> Self {
        Self { subject, document }
    }
}

/// Everything a run produces: the digest and its statistics.
#[derive(Debug)]
pub struct DigestOutcome {
    pub digest: ComposedDigest,
    pub stats: DigestStats,
}

/// Drives the whole pipeline over a batch of source documents.
pub struct DigestProcessor {
    classifier: SubjectClassifier,
    extractor: FragmentExtractor,
    show_source_documents: bool,
    show_template: bool,
}

impl DigestProcessor {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            classifier: SubjectClassifier::from_config(config),
            extractor: FragmentExtractor::from_config(config),
            show_source_documents: config.show_source_documents,
            show_template: config.show_template,
        }
    }

    /// Process a batch of source documents into one composed digest.
    ///
    /// The first document doubles as the layout template. A batch whose
    /// documents yield zero usable entries still composes an (empty)
    /// digest; callers decide whether an empty digest is worth sending.
    pub fn process(&self, documents: Vec<SourceDocument>) -> Result<DigestOutcome, PipelineError> {
        let first = documents.first().ok_or(PipelineError::NoSourceDocuments)?;
        let template =
            Template::from_document(first.document.clone()).map_err(PipelineError::Template)?;
        if self.show_template {
            debug!(template = %template.serialize(), "Emptied template document");
        }

        let mut stats = DigestStats {
            num_messages: documents.len(),
            ..DigestStats::default()
        };
        let mut registry = PaperRegistry::new();

        for source in &documents {
            if self.show_source_documents {
                debug!(document = %source.document.serialize(), "Source document");
            }

            let subject = source.subject.as_deref().unwrap_or(NO_SUBJECT);
            let entries = self.extractor.extract(&source.document);
            stats.num_entries += entries.len();

            for entry in entries {
                if let Err(e) = registry.add_entry(subject, entry) {
                    warn!(subject, error = %e, "Skipping entry");
                    stats.num_skipped += 1;
                }
            }
        }

        stats.num_unique = registry.len();

        let composer = DigestComposer::new(&self.classifier);
        let records = priority_sort(registry.into_records(), &record_keys(&self.classifier));
        for record in &records {
            info!(
                title = %record.title,
                subjects = %composer.subjects_line(record),
                "Paper"
            );
        }

        let digest = composer
            .compose(records, template)
            .map_err(PipelineError::Compose)?;
        stats.log_summary();

        Ok(DigestOutcome { digest, stats })
    }
}
