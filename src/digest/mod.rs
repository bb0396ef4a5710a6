//! The digest pipeline: extract → classify → merge → order → compose.

pub mod classify;
pub mod compose;
pub mod extract;
pub mod processor;
pub mod registry;
pub mod sort;
pub mod types;

pub use classify::SubjectClassifier;
pub use compose::{ComposedDigest, DigestComposer, Template};
pub use extract::FragmentExtractor;
pub use processor::{DigestOutcome, DigestProcessor, SourceDocument};
pub use registry::PaperRegistry;
pub use sort::{priority_sort, record_keys, subject_keys};
pub use types::{DigestStats, PaperRecord, RawEntry};
