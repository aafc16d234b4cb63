//! Review analysis.
//!
//! [`aggregator`] joins products with their reviews and computes the
//! summary statistics; [`sentiment`] provides the polarity scoring it uses.

pub mod aggregator;
pub mod sentiment;

pub use aggregator::*;
pub use sentiment::{LexiconScorer, PolarityScorer};
