//! Pipeline orchestration: fetch → decode → flatten → write

use std::fs;
use std::time::Instant;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use nobeline_core::{ProgressContext, cleanup_tmp_files, fmt_num};
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::api::{fetch_all, load_raw, save_raw};
use crate::config::Config;
use crate::flatten::{LaureateTables, NobelPrizeTables, TableSet, TableStats};
use crate::manifest::RunManifest;
use crate::state::Entity;

/// Run the Nobel Prize pipeline for one entity
pub fn run(config: &Config, progress: &ProgressContext) -> anyhow::Result<RunSummary> {
    let start = Instant::now();

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Cannot create output directory {}", config.output_dir.display())
    })?;
    cleanup_tmp_files(&config.output_dir).context("Failed to clean stale tmp files")?;

    let fetched_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let (source, mut records, pages) = match &config.input {
        Some(path) => {
            let records = load_raw(path, config.entity.records_key())?;
            (path.display().to_string(), records, 0)
        }
        None => {
            let pb = progress.page_bar(config.entity.name());
            let outcome = fetch_all(config, &pb);
            pb.finish_and_clear();
            let outcome = outcome?;
            (config.endpoint_url(), outcome.records, outcome.pages)
        }
    };
    if let Some(max) = config.max_records {
        records.truncate(max);
    }
    let records_fetched = records.len();

    if config.save_raw && config.input.is_none() {
        save_raw(&config.raw_path(), &records)?;
    }

    let stage = progress.stage_line("flatten");
    stage.set_message(format!("{} records", fmt_num(records_fetched)));
    let flattened = match config.entity {
        Entity::Laureates => flatten(
            LaureateTables::new(&config.output_dir, &config.sink, config.language)
                .context("Failed to create output tables")?,
            records,
        ),
        Entity::NobelPrizes => flatten(
            NobelPrizeTables::new(&config.output_dir, &config.sink, config.language)
                .context("Failed to create output tables")?,
            records,
        ),
    };
    stage.finish_and_clear();
    let flattened = flattened?;

    let manifest = RunManifest {
        entity: config.entity.name().to_string(),
        source: source.clone(),
        fetched_at,
        format: config.sink.format.name().to_string(),
        language: config.language.code().to_string(),
        records_fetched,
        records_written: flattened.written,
        parse_errors: flattened.parse_errors,
        duplicates: flattened.duplicates,
        tables: RunManifest::table_rows(&flattened.tables),
    };
    manifest.write(&config.output_dir)?;

    let summary = RunSummary {
        entity: config.entity,
        source,
        pages,
        records_fetched,
        records_written: flattened.written,
        parse_errors: flattened.parse_errors,
        duplicates: flattened.duplicates,
        tables: flattened.tables,
        elapsed: start.elapsed(),
    };
    summary.log();
    Ok(summary)
}

struct Flattened {
    written: usize,
    parse_errors: usize,
    duplicates: usize,
    tables: Vec<TableStats>,
}

/// Decode each raw record on its own; bad ones are counted and skipped.
fn flatten<T: TableSet>(mut tables: T, records: Vec<Value>) -> anyhow::Result<Flattened> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut written = 0;
    let mut parse_errors = 0;
    let mut duplicates = 0;

    for (idx, value) in records.into_iter().enumerate() {
        let record: T::Record = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("record {idx}: {e}");
                parse_errors += 1;
                continue;
            }
        };
        if let Err(msg) = T::validate(&record) {
            log::warn!("record {idx}: {msg}");
            parse_errors += 1;
            continue;
        }
        if let Some(key) = T::dedup_key(&record) {
            if !seen.insert(key.clone()) {
                log::debug!("record {idx}: duplicate key {key}");
                duplicates += 1;
                continue;
            }
        }
        tables.push(record).context("Failed to write rows")?;
        written += 1;
    }

    let tables = tables.finish().context("Failed to finalize output tables")?;
    Ok(Flattened {
        written,
        parse_errors,
        duplicates,
        tables,
    })
}

/// Summary of pipeline run
#[derive(Debug)]
pub struct RunSummary {
    pub entity: Entity,
    pub source: String,
    /// Pages requested (0 in offline mode)
    pub pages: usize,
    pub records_fetched: usize,
    pub records_written: usize,
    pub parse_errors: usize,
    pub duplicates: usize,
    pub tables: Vec<TableStats>,
    pub elapsed: std::time::Duration,
}

impl RunSummary {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn log(&self) {
        log::info!("=== {} summary ===", self.entity);
        log::info!(
            "Records: {} written of {} fetched ({} parse errors, {} duplicates, {} pages)",
            fmt_num(self.records_written),
            fmt_num(self.records_fetched),
            self.parse_errors,
            self.duplicates,
            self.pages
        );
        for t in &self.tables {
            log::info!("  {:<24} {:>8} rows", t.table.name(), fmt_num(t.rows));
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Table;
    use std::path::PathBuf;

    #[test]
    fn run_summary_log_does_not_panic() {
        let summary = RunSummary {
            entity: Entity::Laureates,
            source: "fixture.json".into(),
            pages: 0,
            records_fetched: 3,
            records_written: 2,
            parse_errors: 1,
            duplicates: 0,
            tables: vec![TableStats {
                table: Table::Laureates,
                rows: 2,
                path: PathBuf::from("laureates.csv"),
            }],
            elapsed: std::time::Duration::from_secs(1),
        };
        assert_eq!(summary.total_rows(), 2);
        summary.log();
    }
}
