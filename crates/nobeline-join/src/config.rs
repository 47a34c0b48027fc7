use std::path::{Path, PathBuf};

use nobeline_core::OutputFormat;

/// Configuration for the join pipeline.
#[derive(Debug, Clone)]
pub struct JoinConfig {
    /// Directory holding the laureate tables (laureates.*, laureate_prizes.*, ...)
    pub input_dir: PathBuf,
    /// Directory holding nobel_prizes.* and nobel_prize_laureates.*; defaults to `input_dir`
    pub prizes_dir: Option<PathBuf>,
    /// Output directory for joined tables
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// DuckDB memory limit (e.g. "1GB")
    pub memory_limit: String,
}

impl JoinConfig {
    pub fn prizes_dir(&self) -> &Path {
        self.prizes_dir.as_deref().unwrap_or(&self.input_dir)
    }
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("output/laureates"),
            prizes_dir: None,
            output_dir: PathBuf::from("output/joined"),
            format: OutputFormat::Csv,
            memory_limit: "1GB".to_string(),
        }
    }
}
