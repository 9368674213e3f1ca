//! Assessment analysis.
//!
//! Pure computations over coach assessments: per-skill aggregation and
//! readiness classification.

pub mod aggregator;
pub mod readiness;

pub use aggregator::*;
pub use readiness::{classify_readiness, ReadinessTable};
