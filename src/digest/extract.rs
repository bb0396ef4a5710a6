//! Fragment extraction — slicing alert entries out of a source document.
//!
//! One alert entry is assumed to occupy exactly `window_len` consecutive
//! sibling nodes under the content container, starting at one anchor
//! element. Both values track an external, unversioned email template and
//! come from configuration, never from code.

use tracing::{debug, warn};

use crate::config::DigestConfig;
use crate::digest::types::RawEntry;
use crate::document::Document;

/// Slices a parsed document into fixed-length windows of sibling nodes,
/// one window per anchor occurrence.
#[derive(Debug, Clone)]
pub struct FragmentExtractor {
    anchor: String,
    window_len: usize,
    validate: bool,
}

impl FragmentExtractor {
    pub fn new(anchor: &str, window_len: usize, validate: bool) -> Self {
        Self {
            anchor: anchor.to_string(),
            window_len,
            validate,
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(
            &config.entry_anchor,
            config.entry_length,
            config.validate_windows,
        )
    }

    /// Extract one entry per anchor among the content container's direct
    /// children, in document order.
    ///
    /// A missing container (malformed or unexpected document shape) yields
    /// an empty list: that document simply contributes nothing. With
    /// validation enabled, windows that run short of `window_len` or whose
    /// anchor fragment carries no hyperlink are dropped and reported
    /// instead of producing malformed records downstream.
    pub fn extract(&self, document: &Document) -> Vec<RawEntry> {
        let Some(container) = document.content_container() else {
            warn!("Document has no content container, skipping");
            return Vec::new();
        };

        let children = &container.children;
        let mut entries = Vec::new();

        for (index, child) in children.iter().enumerate() {
            if !child.is_element(&self.anchor) {
                continue;
            }

            let end = (index + self.window_len).min(children.len());
            let window = children[index..end].to_vec();

            if self.validate {
                if window.len() < self.window_len {
                    warn!(
                        index,
                        got = window.len(),
                        want = self.window_len,
                        "Entry window runs past end of container, dropped"
                    );
                    continue;
                }
                if !window[0].has_descendant("a") {
                    warn!(index, "Anchor fragment has no hyperlink, dropped");
                    continue;
                }
            }

            entries.push(RawEntry::new(window));
        }

        debug!(count = entries.len(), "Extracted entries");
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert_entry(title: &str) -> String {
        format!(
            "<h3><a href=\"http://x.org\">{title}</a></h3>\
             <div>authors</div><div>summary</div>\
             <div><img src=\"s.png\"></div><br>"
        )
    }

    fn document_with(entries: &str) -> Document {
        Document::parse(&format!("<html><body><div>{entries}</div></body></html>"))
    }

    #[test]
    fn one_entry_per_anchor_in_document_order() {
        let doc = document_with(&format!(
            "{}{}{}",
            alert_entry("First"),
            alert_entry("Second"),
            alert_entry("Third")
        ));
        let extractor = FragmentExtractor::new("h3", 5, true);
        let entries = extractor.extract(&doc);

        assert_eq!(entries.len(), 3);
        let titles: Vec<String> = entries.iter().map(|e| e.title().unwrap()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn windows_have_the_configured_length() {
        let doc = document_with(&format!("{}{}", alert_entry("A"), alert_entry("B")));
        let extractor = FragmentExtractor::new("h3", 5, true);
        for entry in extractor.extract(&doc) {
            assert_eq!(entry.fragments.len(), 5);
        }
    }

    #[test]
    fn missing_container_yields_no_entries() {
        let doc = Document::parse("<html><body><p>plain text body</p></body></html>");
        let extractor = FragmentExtractor::new("h3", 5, true);
        assert!(extractor.extract(&doc).is_empty());
    }

    #[test]
    fn empty_container_yields_no_entries() {
        let doc = document_with("");
        let extractor = FragmentExtractor::new("h3", 5, true);
        assert!(extractor.extract(&doc).is_empty());
    }

    #[test]
    fn validation_drops_short_trailing_window() {
        // Second anchor only has 2 of 5 sibling nodes left.
        let doc = document_with(&format!(
            "{}<h3><a href=\"u\">Tail</a></h3><div>authors</div>",
            alert_entry("Full")
        ));
        let extractor = FragmentExtractor::new("h3", 5, true);
        let entries = extractor.extract(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title().unwrap(), "Full");
    }

    #[test]
    fn permissive_mode_keeps_short_trailing_window() {
        let doc = document_with(&format!(
            "{}<h3><a href=\"u\">Tail</a></h3><div>authors</div>",
            alert_entry("Full")
        ));
        let extractor = FragmentExtractor::new("h3", 5, false);
        let entries = extractor.extract(&doc);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].fragments.len(), 2);
    }

    #[test]
    fn validation_drops_linkless_anchor() {
        let doc = document_with(
            "<h3>no link</h3><div>a</div><div>b</div><div>c</div><br>",
        );
        let extractor = FragmentExtractor::new("h3", 5, true);
        assert!(extractor.extract(&doc).is_empty());
    }

    #[test]
    fn anchor_tag_is_configurable() {
        let doc = document_with(
            "<h2><a href=\"u\">Other Template</a></h2><div>authors</div><br>",
        );
        let extractor = FragmentExtractor::new("h2", 3, true);
        let entries = extractor.extract(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title().unwrap(), "Other Template");
    }

    #[test]
    fn non_anchor_children_do_not_start_entries() {
        let doc = document_with(&format!("<div>preamble</div>{}", alert_entry("Only")));
        let extractor = FragmentExtractor::new("h3", 5, true);
        assert_eq!(extractor.extract(&doc).len(), 1);
    }
}
