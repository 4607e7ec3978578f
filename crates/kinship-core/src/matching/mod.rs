//! Identity normalization and confidence scoring for cross-tree matches
//!
//! Pure functions only. The engine's indexing job loads rows, calls these,
//! and writes the results.

pub mod normalize;
pub mod score;

pub use normalize::{birth_year, build_index_entry, normalize_name};
pub use score::{confidence_score, CandidateFilter, MatchPolicy};
