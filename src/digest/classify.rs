//! Subject classification — mapping a free-text alert subject to an
//! abbreviated priority label.
//!
//! Evaluation order is fixed: the self-citation marker short-circuits
//! everything, saved-query results keep their topic verbatim, and every
//! other subject gets its leading name plus the suffix of the first
//! matching category rule. Unrecognized phrasing degrades to the `(u)`
//! suffix; there is no error path.

use regex::Regex;

use crate::config::{CategoryRule, DigestConfig};

/// Label used for subjects that match the self-citation marker exactly.
const SELF_CITATION_LABEL: &str = "me(c)";

/// Suffix for subjects no category rule recognizes.
const UNKNOWN_SUFFIX: char = 'u';

/// A category rule with its compiled case-insensitive matcher.
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    /// Human-readable phrase this matcher looks for.
    pub phrase: String,
    /// Suffix letter appended to the extracted name.
    pub suffix: char,
    regex: Regex,
}

impl CategoryMatcher {
    fn compile(rule: &CategoryRule) -> Self {
        Self {
            phrase: rule.phrase.clone(),
            suffix: rule.suffix,
            regex: phrase_regex(&rule.phrase),
        }
    }

    /// Whether the subject line mentions this category's phrase.
    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}

/// Classifies one subject line into an abbreviated label.
///
/// Pure: identical input and configuration always yield the same label.
#[derive(Debug, Clone)]
pub struct SubjectClassifier {
    self_citation_marker: String,
    special_authors: Vec<String>,
    results_regex: Regex,
    categories: Vec<CategoryMatcher>,
}

impl SubjectClassifier {
    pub fn from_config(config: &DigestConfig) -> Self {
        Self {
            self_citation_marker: config.self_citation_marker.clone(),
            special_authors: config.special_authors.clone(),
            results_regex: phrase_regex(&config.results_phrase),
            categories: config.categories.iter().map(CategoryMatcher::compile).collect(),
        }
    }

    /// Exact match against the self-citation marker.
    pub fn cites_me(&self, subject: &str) -> bool {
        subject == self.self_citation_marker
    }

    /// Case-sensitive substring match against the special-author list.
    ///
    /// Evaluated independently for ordering; it never changes label text.
    pub fn is_special(&self, subject: &str) -> bool {
        self.special_authors
            .iter()
            .any(|author| subject.contains(author.as_str()))
    }

    /// Whether the subject is a saved-query results alert.
    pub fn is_results(&self, subject: &str) -> bool {
        self.results_regex.is_match(subject)
    }

    /// The category rules, in priority order.
    pub fn categories(&self) -> &[CategoryMatcher] {
        &self.categories
    }

    /// Derive the abbreviated label for a subject line.
    pub fn abbreviate(&self, subject: &str) -> String {
        if self.cites_me(subject) {
            return SELF_CITATION_LABEL.to_string();
        }
        if self.is_results(subject) {
            // Results for general queries: topic only, no suffix.
            return leading_name(subject).to_string();
        }
        let name = leading_name(subject);
        for category in &self.categories {
            if category.is_match(subject) {
                return format!("{name}({})", category.suffix);
            }
        }
        format!("{name}({UNKNOWN_SUFFIX})")
    }
}

/// Case-insensitive substring matcher for a configured phrase.
fn phrase_regex(phrase: &str) -> Regex {
    // Escaped literal; cannot fail to compile.
    Regex::new(&format!("(?i){}", regex::escape(phrase))).expect("escaped literal regex")
}

/// The name or topic before the subject's trailing category phrase:
/// everything up to the last `-`, minus the space preceding it.
///
/// Subjects with no dash at all keep the whole line as the name.
fn leading_name(subject: &str) -> &str {
    match subject.rfind('-') {
        Some(idx) => {
            let head = &subject[..idx];
            head.strip_suffix(' ').unwrap_or(head)
        }
        None => subject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SubjectClassifier {
        SubjectClassifier::from_config(&DigestConfig::default())
    }

    fn classifier_with_special(authors: &[&str]) -> SubjectClassifier {
        let config = DigestConfig {
            special_authors: authors.iter().map(|s| s.to_string()).collect(),
            ..DigestConfig::default()
        };
        SubjectClassifier::from_config(&config)
    }

    #[test]
    fn self_citation_marker_wins() {
        assert_eq!(classifier().abbreviate("New citations to my articles"), "me(c)");
    }

    #[test]
    fn self_citation_is_exact_not_substring() {
        let label = classifier().abbreviate("RE: New citations to my articles - new citations");
        assert_ne!(label, "me(c)");
    }

    #[test]
    fn article_subject_gets_a_suffix() {
        assert_eq!(
            classifier().abbreviate("John Smith - new articles"),
            "John Smith(a)"
        );
    }

    #[test]
    fn citation_subject_gets_c_suffix() {
        assert_eq!(
            classifier().abbreviate("Jane Doe - new citations"),
            "Jane Doe(c)"
        );
    }

    #[test]
    fn related_subject_gets_r_suffix() {
        assert_eq!(
            classifier().abbreviate("Jane Doe - new related research"),
            "Jane Doe(r)"
        );
    }

    #[test]
    fn category_match_is_case_insensitive() {
        assert_eq!(
            classifier().abbreviate("Jane Doe - New Articles"),
            "Jane Doe(a)"
        );
    }

    #[test]
    fn results_subject_keeps_topic_verbatim() {
        assert_eq!(
            classifier().abbreviate("deep learning - new results"),
            "deep learning"
        );
    }

    #[test]
    fn unknown_phrasing_degrades_to_u_suffix() {
        assert_eq!(
            classifier().abbreviate("Jane Doe - something novel"),
            "Jane Doe(u)"
        );
    }

    #[test]
    fn dashless_subject_keeps_whole_line_as_name() {
        assert_eq!(classifier().abbreviate("completely unexpected"), "completely unexpected(u)");
    }

    #[test]
    fn name_extraction_uses_last_dash() {
        assert_eq!(
            classifier().abbreviate("Jean-Pierre Dupont - new citations"),
            "Jean-Pierre Dupont(c)"
        );
    }

    #[test]
    fn special_author_matching_is_case_sensitive() {
        let c = classifier_with_special(&["Jane Doe"]);
        assert!(c.is_special("Jane Doe - new articles"));
        assert!(!c.is_special("jane doe - new articles"));
        assert!(!c.is_special("John Smith - new articles"));
    }

    #[test]
    fn special_author_does_not_change_label() {
        let c = classifier_with_special(&["Jane Doe"]);
        assert_eq!(c.abbreviate("Jane Doe - new articles"), "Jane Doe(a)");
    }

    #[test]
    fn classification_is_pure() {
        let c = classifier();
        let subject = "Jane Doe - new citations";
        assert_eq!(c.abbreviate(subject), c.abbreviate(subject));
    }

    #[test]
    fn custom_category_list_is_respected() {
        let config = DigestConfig {
            categories: vec![CategoryRule {
                phrase: "fresh preprints".to_string(),
                suffix: 'p',
            }],
            ..DigestConfig::default()
        };
        let c = SubjectClassifier::from_config(&config);
        assert_eq!(c.abbreviate("Jane Doe - fresh preprints"), "Jane Doe(p)");
        // The default phrases are gone
        assert_eq!(c.abbreviate("Jane Doe - new articles"), "Jane Doe(u)");
    }
}
