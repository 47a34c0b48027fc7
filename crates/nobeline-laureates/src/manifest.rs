//! Run manifest written next to the output tables

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::flatten::TableStats;

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "_manifest.json";

/// What a run fetched and wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub entity: String,
    /// Endpoint URL, or the raw dump path in offline mode
    pub source: String,
    /// UTC, RFC 3339
    pub fetched_at: String,
    pub format: String,
    pub language: String,
    pub records_fetched: usize,
    pub records_written: usize,
    pub parse_errors: usize,
    pub duplicates: usize,
    /// Table name → row count
    pub tables: BTreeMap<String, usize>,
}

impl RunManifest {
    pub fn table_rows(stats: &[TableStats]) -> BTreeMap<String, usize> {
        stats
            .iter()
            .map(|s| (s.table.name().to_string(), s.rows))
            .collect()
    }

    pub fn write(&self, output_dir: &Path) -> anyhow::Result<()> {
        let path = output_dir.join(MANIFEST_FILE);
        let file =
            File::create(&path).with_context(|| format!("Cannot create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn read(output_dir: &Path) -> anyhow::Result<Self> {
        let path = output_dir.join(MANIFEST_FILE);
        let file = File::open(&path).with_context(|| format!("Cannot open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid manifest {}", path.display()))
    }
}
