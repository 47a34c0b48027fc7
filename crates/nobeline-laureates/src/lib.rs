//! Nobeline Laureates - Nobel Prize API pipeline
//!
//! Pages through the laureates and nobelPrizes listings of the Nobel Prize
//! REST API, explodes each record into normalized tables keyed by laureate
//! id, award year and category, and writes every table to its own file.
//!
//! # Example
//!
//! ```no_run
//! use nobeline_core::ProgressContext;
//! use nobeline_laureates::{Config, Entity, run};
//!
//! let config = Config {
//!     entity: Entity::Laureates,
//!     max_records: Some(100),
//!     ..Default::default()
//! };
//!
//! let summary = run(&config, &ProgressContext::new()).expect("Pipeline failed");
//! println!("Wrote {} rows", summary.total_rows());
//! ```

pub mod api;
pub mod config;
pub mod flatten;
pub mod manifest;
pub mod runner;
pub mod schema;
pub mod state;
pub mod transform;

// Re-exports for convenience
pub use config::{Config, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, parse_filter};
pub use manifest::RunManifest;
pub use runner::{RunSummary, run};
pub use state::{Entity, Table};
pub use transform::Language;
