//! Scholar Digest — merges repeated Scholar alert emails into one
//! deduplicated, priority-ordered digest.

pub mod channels;
pub mod config;
pub mod digest;
pub mod document;
pub mod error;
