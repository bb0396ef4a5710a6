//! Paper registry — merging alert entries that describe the same paper.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::digest::types::{PaperRecord, RawEntry};
use crate::error::DocumentError;

/// Title-keyed collection of paper records.
///
/// Titles are unique keys; once created a record is never removed, only
/// appended to. The first entry seen for a title becomes the record's
/// canonical body, and later duplicates only contribute their subject
/// line. Iteration for the sorter yields records in first-seen order so
/// the stable sort's final tiebreak is discovery order.
#[derive(Debug, Default)]
pub struct PaperRegistry {
    papers: HashMap<String, PaperRecord>,
    order: Vec<String>,
}

impl PaperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one raw entry under the subject line of its source message.
    ///
    /// Title derivation failure is a structural error for this single
    /// entry; the caller reports it and moves on — it never aborts the
    /// run.
    pub fn add_entry(&mut self, subject: &str, entry: RawEntry) -> Result<(), DocumentError> {
        let title = entry.title()?;

        let record = match self.papers.entry(title) {
            Entry::Occupied(existing) => {
                debug!(title = %existing.key(), "Merging duplicate entry");
                existing.into_mut()
            }
            Entry::Vacant(slot) => {
                let title = slot.key().clone();
                self.order.push(title.clone());
                slot.insert(PaperRecord::new(title, entry))
            }
        };
        record.add_subject(subject);
        Ok(())
    }

    /// Number of unique papers.
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Consume the registry, yielding records in first-seen order.
    pub fn into_records(mut self) -> Vec<PaperRecord> {
        self.order
            .iter()
            .filter_map(|title| self.papers.remove(title))
            .collect()
    }
}
