//! Configuration types.
//!
//! Digest behavior is driven by a YAML file (`~/.scholar-digest.yaml` by
//! default); every field has a sensible default so a missing file still
//! produces a usable configuration. Mail endpoints and credentials live in
//! environment variables (see `channels::email::EmailChannelConfig`), not in
//! the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// One subject category: a phrase matched case-insensitively against the
/// subject line, and the one-letter suffix appended to the extracted name.
///
/// The list is ordered by priority, highest first; the same ordering drives
/// both label derivation and the subject/record sort keys. Historical alert
/// templates disagree on which categories exist, so the list is
/// configuration rather than code.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    /// Phrase to look for in the subject line (e.g. "new articles").
    pub phrase: String,
    /// Suffix letter for the abbreviated label (e.g. 'a' → "Name(a)").
    pub suffix: char,
}

/// Digest configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Recipient (and sender) address for the digest email.
    pub email: String,
    /// Subject line of the outgoing digest.
    pub email_subject: String,
    /// Sender address that identifies alert messages in the mailbox.
    pub alert_sender: String,
    /// Authors whose subjects rank above everything but self-citations.
    /// Matched as case-sensitive substrings of the subject line.
    pub special_authors: Vec<String>,
    /// Exact subject line meaning "someone cited my own articles".
    pub self_citation_marker: String,
    /// Phrase marking a saved-query results alert; these subjects keep
    /// their topic verbatim instead of getting a category suffix.
    pub results_phrase: String,
    /// Subject categories in priority order, highest first.
    pub categories: Vec<CategoryRule>,
    /// Tag of the element that starts one alert entry.
    ///
    /// Together with `entry_length` this tracks an external, unversioned
    /// email template: one alert is assumed to occupy exactly
    /// `entry_length` consecutive sibling nodes starting at one anchor.
    /// If the template changes shape, extraction mis-slices — which is why
    /// window validation is on by default.
    pub entry_anchor: String,
    /// Number of consecutive sibling nodes per alert entry.
    pub entry_length: usize,
    /// Drop and report windows that are short or have no title hyperlink,
    /// instead of passing them downstream.
    pub validate_windows: bool,
    /// Actually send the digest email at the end of a run.
    pub send_email: bool,
    /// Mark processed alert messages as read.
    pub mark_read: bool,
    /// Dump each fetched source document at debug level.
    pub show_source_documents: bool,
    /// Dump the emptied template document at debug level.
    pub show_template: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            email_subject: "Google Scholar Summary!".to_string(),
            alert_sender: "scholaralerts-noreply@google.com".to_string(),
            special_authors: Vec::new(),
            self_citation_marker: "New citations to my articles".to_string(),
            results_phrase: "new results".to_string(),
            categories: vec![
                CategoryRule {
                    phrase: "new articles".to_string(),
                    suffix: 'a',
                },
                CategoryRule {
                    phrase: "new citations".to_string(),
                    suffix: 'c',
                },
                CategoryRule {
                    phrase: "new related research".to_string(),
                    suffix: 'r',
                },
            ],
            entry_anchor: "h3".to_string(),
            entry_length: 5,
            validate_windows: true,
            send_email: true,
            mark_read: true,
            show_source_documents: false,
            show_template: false,
        }
    }
}

impl DigestConfig {
    /// Default configuration file location: `~/.scholar-digest.yaml`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".scholar-digest.yaml")
    }

    /// Load and parse a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Reject values the pipeline cannot work with.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_length < 2 {
            return Err(ConfigError::InvalidValue {
                key: "entry_length".to_string(),
                message: format!(
                    "must be at least 2 (title and author fragments), got {}",
                    self.entry_length
                ),
            });
        }
        if self.entry_anchor.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "entry_anchor".to_string(),
                message: "must name an element tag".to_string(),
            });
        }
        Ok(())
    }
}
