//! Discrete classifiers used for rendering hints and statistics.
//!
//! - Duration severity buckets (shared by spans and aggregates)
//! - Tree depth tiers

pub mod depth;
pub mod duration;

pub use depth::DepthTier;
pub use duration::{classify_duration, format_duration, DurationBucket};
