//! Candidate enrichment, filtering, scoring and selection.
//!
//! The pipeline for one request:
//! 1. every provider is queried concurrently ([`Selector`])
//! 2. series candidates are narrowed to the requested episode ([`episode`])
//! 3. attributes are extracted from text ([`extract`])
//! 4. hard policy is applied ([`filter`])
//! 5. survivors are scored and sorted ([`score`])

pub mod episode;
pub mod extract;
pub mod filter;
mod orchestrator;
pub mod score;
mod types;

pub use episode::EpisodeMatcher;
pub use extract::{enrich, Attributes};
pub use filter::filter_candidates;
pub use orchestrator::Selector;
pub use score::{rank, score, UNACCEPTABLE_FLOOR};
pub use types::*;
