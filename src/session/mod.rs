//! Dashboard load sessions.
//!
//! A load fetches every service's traces in parallel, joins them, and turns
//! them into one immutable `DashboardView`. Loads are cancellable through
//! their `LoadSession`.

pub mod cancel;
pub mod loader;

pub use cancel::{LoadSession, LoadToken};
pub use loader::{load_view, select_services, DashboardView, LoadError, LoadOptions, ServiceTraces};
