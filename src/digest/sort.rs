//! Stable multi-key priority ordering.
//!
//! One generic sort serves both subjects within a record and records
//! within the digest; only the key lists differ, and both are derived
//! from the classifier so the rule set stays configuration-driven.

use crate::digest::classify::SubjectClassifier;
use crate::digest::types::PaperRecord;

/// A priority key: larger values rank higher. Booleans rank as 1/0.
pub type PriorityKey<'a, T> = Box<dyn Fn(&T) -> u64 + 'a>;

/// Order `items` by decreasing priority.
///
/// `keys` lists the key-extraction functions highest-priority first.
/// Elements compare lexicographically over the key list: one stable
/// ascending sort per key, applied in reverse priority order, then the
/// whole result reversed to put the highest-ranked elements first.
/// Stability across the passes is what makes the lexicographic
/// composition hold.
pub fn priority_sort<T>(mut items: Vec<T>, keys: &[PriorityKey<'_, T>]) -> Vec<T> {
    for key in keys.iter().rev() {
        items.sort_by(|a, b| key(a).cmp(&key(b)));
    }
    items.reverse();
    items
}

/// Key list for ordering subject lines within one record:
/// self-citations, then special authors, then the configured categories
/// in priority order.
pub fn subject_keys<'a>(classifier: &'a SubjectClassifier) -> Vec<PriorityKey<'a, String>> {
    let mut keys: Vec<PriorityKey<'a, String>> = vec![
        Box::new(move |s: &String| u64::from(classifier.cites_me(s))),
        Box::new(move |s: &String| u64::from(classifier.is_special(s))),
    ];
    for category in classifier.categories() {
        keys.push(Box::new(move |s: &String| u64::from(category.is_match(s))));
    }
    keys
}

/// Key list for ordering records within the digest: a record ranks by
/// whether *any* of its subjects matches each predicate, with the raw
/// subject count wedged between the special-author and category keys.
pub fn record_keys<'a>(classifier: &'a SubjectClassifier) -> Vec<PriorityKey<'a, PaperRecord>> {
    let mut keys: Vec<PriorityKey<'a, PaperRecord>> = vec![
        Box::new(move |p: &PaperRecord| {
            u64::from(p.subjects.iter().any(|s| classifier.cites_me(s)))
        }),
        Box::new(move |p: &PaperRecord| {
            u64::from(p.subjects.iter().any(|s| classifier.is_special(s)))
        }),
        Box::new(|p: &PaperRecord| p.subjects.len() as u64),
    ];
    for category in classifier.categories() {
        keys.push(Box::new(move |p: &PaperRecord| {
            u64::from(p.subjects.iter().any(|s| category.is_match(s)))
        }));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DigestConfig;
    use crate::digest::types::RawEntry;

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

    fn record(title: &str, subjects: &[&str]) -> PaperRecord {
        let mut record = PaperRecord::new(title.to_string(), RawEntry::new(Vec::new()));
        for subject in subjects {
            record.add_subject(subject);
        }
        record
    }

    #[test]
    fn single_key_orders_descending() {
        let keys: Vec<PriorityKey<'_, u64>> = vec![Box::new(|n: &u64| *n)];
        assert_eq!(priority_sort(vec![2, 9, 4, 1], &keys), vec![9, 4, 2, 1]);
    }

    #[test]
    fn lexicographic_composition_law() {
        // Elements are (primary, secondary); keys extract each in turn.
        let keys: Vec<PriorityKey<'_, (u64, u64)>> = vec![
            Box::new(|e: &(u64, u64)| e.0),
            Box::new(|e: &(u64, u64)| e.1),
        ];
        let sorted = priority_sort(vec![(1, 9), (2, 0), (1, 3), (2, 7)], &keys);
        // Primary key decides first; secondary breaks primary ties.
        assert_eq!(sorted, vec![(2, 7), (2, 0), (1, 9), (1, 3)]);
    }

    #[test]
    fn later_keys_never_override_earlier_ones() {
        let keys: Vec<PriorityKey<'_, (u64, u64)>> = vec![
            Box::new(|e: &(u64, u64)| e.0),
            Box::new(|e: &(u64, u64)| e.1),
        ];
        let sorted = priority_sort(vec![(0, 100), (1, 0)], &keys);
        assert_eq!(sorted, vec![(1, 0), (0, 100)]);
    }

    #[test]
    fn subjects_order_self_citation_first() {
        let c = classifier();
        let subjects = vec![
            "John Smith - new articles".to_string(),
            "New citations to my articles".to_string(),
        ];
        let sorted = priority_sort(subjects, &subject_keys(&c));
        assert_eq!(sorted[0], "New citations to my articles");
    }

    #[test]
    fn subjects_order_special_above_article() {
        let c = classifier_with_special(&["Jane Doe"]);
        let subjects = vec![
            "John Smith - new articles".to_string(),
            "Jane Doe - new related research".to_string(),
        ];
        let sorted = priority_sort(subjects, &subject_keys(&c));
        assert_eq!(sorted[0], "Jane Doe - new related research");
    }

    #[test]
    fn subjects_order_article_above_citation() {
        let c = classifier();
        let subjects = vec![
            "A - new citations".to_string(),
            "B - new articles".to_string(),
        ];
        let sorted = priority_sort(subjects, &subject_keys(&c));
        assert_eq!(sorted[0], "B - new articles");
    }

    #[test]
    fn records_self_citation_beats_subject_count() {
        let c = classifier();
        let a = record(
            "A",
            &[
                "X - new articles",
                "Y - new citations",
                "Z - new related research",
            ],
        );
        let b = record("B", &["New citations to my articles"]);
        let sorted = priority_sort(vec![a, b], &record_keys(&c));
        assert_eq!(sorted[0].title, "B");
        assert_eq!(sorted[1].title, "A");
    }

    #[test]
    fn records_subject_count_breaks_equal_flags() {
        let c = classifier();
        let once = record("Once", &["X - new articles"]);
        let twice = record("Twice", &["X - new articles", "Y - new articles"]);
        let sorted = priority_sort(vec![once, twice], &record_keys(&c));
        assert_eq!(sorted[0].title, "Twice");
    }

    #[test]
    fn records_special_author_beats_count() {
        let c = classifier_with_special(&["Jane Doe"]);
        let bulk = record("Bulk", &["X - new articles", "Y - new articles"]);
        let special = record("Special", &["Jane Doe - new citations"]);
        let sorted = priority_sort(vec![bulk, special], &record_keys(&c));
        assert_eq!(sorted[0].title, "Special");
    }

    #[test]
    fn empty_input_stays_empty() {
        let c = classifier();
        let keys = subject_keys(&c);
        let sorted = priority_sort(Vec::<String>::new(), &keys);
        assert!(sorted.is_empty());
    }
}
