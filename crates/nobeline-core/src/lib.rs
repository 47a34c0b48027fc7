//! Nobeline Core - Common infrastructure for the laureate ETL pipeline
//!
//! This crate provides reusable components for fetching JSON pages over
//! HTTP, accumulating flattened rows into Arrow batches, and writing
//! tables to delimited or Parquet files.

pub mod accumulator;
pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod shutdown;
pub mod sink;

// Re-exports for convenience
pub use accumulator::{Accumulator, DEFAULT_BATCH_SIZE, flush_into};
pub use error::FetchError;
pub use http::{
    HttpConfig, SHARED_RUNTIME, StreamError, get_text, http_client, http_config, set_http_config,
};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, fmt_num, upgrade_to_bar};
pub use retry::retry_with_backoff;
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown, shutdown_flag};
pub use sink::{OutputFormat, SinkOptions, TableSink, cleanup_tmp_files, is_valid_parquet};
