//! Trace Insight
//!
//! Trace hierarchy reconstruction and operation latency ranking for
//! traces stored in Jaeger.
//!
//! The core is a set of pure functions over in-memory spans:
//! - [`parser`] normalizes raw span records
//! - [`hierarchy`] rebuilds each trace's causal tree and orders it
//! - [`classify`] maps durations and tree depths to display tiers
//! - [`aggregator`] ranks operations by average latency across traces
//!
//! [`api`] and [`session`] fetch and load data; [`output`] renders it.
//!
//! ## Getting Started
//!
//! ```bash
//! cargo install trace-insight
//! trace-insight --help
//! ```

pub mod aggregator;
pub mod api;
pub mod classify;
pub mod commands;
pub mod hierarchy;
pub mod output;
pub mod parser;
pub mod session;
pub mod utils;
