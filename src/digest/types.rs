//! Shared types for the digest pipeline.

use tracing::info;

use crate::document::Node;
use crate::error::DocumentError;

// ── Raw entry ───────────────────────────────────────────────────────

/// One alert occurrence: a fixed-length window of sibling nodes sliced
/// out of a source document.
///
/// The expected window shape is [title heading, author line, summary,
/// social links, separator]. Some alerts omit the summary; in that
/// variant the social-links fragment (recognizable by its image nodes)
/// slides into the third position.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub fragments: Vec<Node>,
}

impl RawEntry {
    pub fn new(fragments: Vec<Node>) -> Self {
        Self { fragments }
    }

    /// Derive the entry title: text of the first hyperlink in the first
    /// fragment. Absence is a structural error for this entry alone.
    pub fn title(&self) -> Result<String, DocumentError> {
        self.fragments
            .first()
            .and_then(|fragment| fragment.first_descendant("a"))
            .map(|link| link.text())
            .ok_or(DocumentError::MissingTitleLink)
    }

    /// Whether this entry carries a textual summary fragment.
    ///
    /// Detected by the absence of an image node in the third fragment
    /// position; an image there means the social-links block moved up.
    pub fn has_summary(&self) -> bool {
        self.fragments
            .get(2)
            .is_some_and(|fragment| !fragment.has_descendant("img"))
    }
}

// ── Paper record ────────────────────────────────────────────────────

/// One unique paper, merged across every alert message that mentioned it.
///
/// Owns the first raw entry seen for its title (the canonical body used
/// when composing) and every subject line it arrived under, duplicates
/// retained in arrival order.
#[derive(Debug, Clone)]
pub struct PaperRecord {
    pub title: String,
    pub entry: RawEntry,
    pub subjects: Vec<String>,
}

impl PaperRecord {
    pub fn new(title: String, entry: RawEntry) -> Self {
        Self {
            title,
            entry,
            subjects: Vec::new(),
        }
    }

    pub fn add_subject(&mut self, subject: &str) {
        self.subjects.push(subject.to_string());
    }
}

// ── Run statistics ──────────────────────────────────────────────────

/// Counters collected over one digest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestStats {
    /// Alert messages processed.
    pub num_messages: usize,
    /// Entries sliced out of all messages.
    pub num_entries: usize,
    /// Entries skipped because no title could be derived.
    pub num_skipped: usize,
    /// Unique papers after merging.
    pub num_unique: usize,
}

impl DigestStats {
    pub fn log_summary(&self) {
        info!(
            messages = self.num_messages,
            entries = self.num_entries,
            skipped = self.num_skipped,
            unique_papers = self.num_unique,
            "Processed scholar alerts"
        );
    }
}
