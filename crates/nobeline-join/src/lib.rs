//! nobeline-join: rebuild wide laureate/prize tables from the normalized ones
//!
//! Reads the tables written by `nobeline-laureates` (CSV, TSV or Parquet),
//! outer-joins every child table back onto its parent key with DuckDB, and
//! exports the denormalized results.

mod config;
mod sql;

pub use config::JoinConfig;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use duckdb::Connection;
use nobeline_laureates::Table;

/// Joined tables exported by [`run`], in creation order
pub const LAUREATE_OUTPUTS: [&str; 3] = ["laureate_awards", "award_affiliations", "award_residences"];
pub const PRIZE_OUTPUT: &str = "prize_laureate_details";

/// Summary statistics from the join operation.
#[derive(Debug)]
pub struct JoinSummary {
    pub laureates: u64,
    /// Rows of laureate_prizes (one per laureate and award)
    pub award_rows: u64,
    pub awards_with_affiliation: u64,
    pub laureates_without_prize: u64,
    /// Rows of prize_laureate_details, when the prize tables were present
    pub prize_detail_rows: Option<u64>,
}

fn pct(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Create one view per input table; required tables must exist on disk and
/// Parquet inputs must carry a footer.
fn create_views(conn: &Connection, dir: &Path, tables: &[Table], required: &[Table]) -> Result<()> {
    for &table in tables {
        let file = sql::find_table_file(dir, table);
        match &file {
            Some(path)
                if path.extension().is_some_and(|e| e == "parquet")
                    && !nobeline_core::is_valid_parquet(path) =>
            {
                bail!("Corrupt parquet file: {}", path.display())
            }
            Some(path) => log::debug!("{table}: {}", path.display()),
            None if required.contains(&table) => {
                bail!("Missing required table {table} in {}", dir.display())
            }
            None => log::warn!("{table}: not found in {}, using empty table", dir.display()),
        }
        let stmt = sql::source_view(table, file.as_deref());
        conn.execute_batch(&stmt)
            .with_context(|| format!("Failed to create view: {stmt}"))?;
    }
    Ok(())
}

/// Export through a tmp file so a failed COPY never leaves a partial output.
fn export(conn: &Connection, table: &str, config: &JoinConfig) -> Result<()> {
    let ext = config.format.name();
    let final_path = config.output_dir.join(format!("{table}.{ext}"));
    let tmp_path = config.output_dir.join(format!("{table}.{ext}.tmp"));

    log::info!("Exporting {table}.{ext}");
    conn.execute_batch(&sql::export_table(table, &tmp_path, config.format))
        .with_context(|| format!("Failed to export {table}"))?;
    fs::rename(&tmp_path, &final_path)
        .with_context(|| format!("Failed to rename {}", tmp_path.display()))?;
    Ok(())
}

/// Run the join pipeline.
pub fn run(config: &JoinConfig) -> Result<JoinSummary> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output dir: {}",
            config.output_dir.display()
        )
    })?;

    let conn =
        Connection::open_in_memory().context("Failed to open DuckDB in-memory connection")?;

    let temp_dir = std::env::temp_dir().join("duckdb_nobeline");
    conn.execute_batch(&format!(
        "SET memory_limit = '{}';
         SET temp_directory = {};
         SET threads = {};",
        config.memory_limit.replace('\'', "''"),
        sql::sql_path(&temp_dir),
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4),
    ))
    .context("Failed to configure DuckDB")?;

    log::info!("Creating source views from {}", config.input_dir.display());
    create_views(
        &conn,
        &config.input_dir,
        &[
            Table::Laureates,
            Table::LaureatePrizes,
            Table::PrizeAffiliations,
            Table::PrizeResidences,
        ],
        &[Table::Laureates, Table::LaureatePrizes],
    )?;

    // Prize tables are optional as a whole
    let prizes_dir = config.prizes_dir();
    let has_prizes = sql::find_table_file(prizes_dir, Table::NobelPrizes).is_some();
    if has_prizes {
        create_views(
            &conn,
            prizes_dir,
            &[Table::NobelPrizes, Table::NobelPrizeLaureates],
            &[Table::NobelPrizes],
        )?;
    } else {
        log::info!("No nobel_prizes table in {}, skipping {PRIZE_OUTPUT}", prizes_dir.display());
    }

    log::info!("Join 1/3: laureates + prizes");
    conn.execute_batch(sql::laureate_awards())
        .context("Failed: laureate_awards join")?;
    log::info!("Join 2/3: prizes + affiliations");
    conn.execute_batch(sql::award_affiliations())
        .context("Failed: award_affiliations join")?;
    log::info!("Join 3/3: prizes + residences");
    conn.execute_batch(sql::award_residences())
        .context("Failed: award_residences join")?;

    let prize_detail_rows = if has_prizes {
        log::info!("Join: nobel prizes + laureates");
        conn.execute_batch(sql::prize_laureate_details())
            .context("Failed: prize_laureate_details join")?;
        let n: i64 = conn
            .query_row(&sql::count_rows(PRIZE_OUTPUT), [], |row| row.get(0))
            .context("Failed to count prize_laureate_details")?;
        Some(n as u64)
    } else {
        None
    };

    log::info!("Collecting join summary");
    let summary = conn
        .query_row(sql::summary_query(), [], |row| {
            Ok(JoinSummary {
                laureates: row.get::<_, i64>(0)? as u64,
                award_rows: row.get::<_, i64>(1)? as u64,
                awards_with_affiliation: row.get::<_, i64>(2)? as u64,
                laureates_without_prize: row.get::<_, i64>(3)? as u64,
                prize_detail_rows,
            })
        })
        .context("Failed to query join summary")?;

    log::info!(
        "Join complete: {} laureates, {} awards, {} with affiliation ({:.1}%), {} laureates without prize",
        summary.laureates,
        summary.award_rows,
        summary.awards_with_affiliation,
        pct(summary.awards_with_affiliation, summary.award_rows),
        summary.laureates_without_prize,
    );

    for table in LAUREATE_OUTPUTS {
        export(&conn, table, config)?;
    }
    if has_prizes {
        export(&conn, PRIZE_OUTPUT, config)?;
    }

    log::info!("Done. Output: {}", config.output_dir.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_handles_empty() {
        assert_eq!(pct(1, 0), 0.0);
        assert_eq!(pct(1, 4), 25.0);
    }

    #[test]
    fn prizes_dir_defaults_to_input() {
        let config = JoinConfig::default();
        assert_eq!(config.prizes_dir(), config.input_dir.as_path());
        let config = JoinConfig {
            prizes_dir: Some("p".into()),
            ..Default::default()
        };
        assert_eq!(config.prizes_dir(), Path::new("p"));
    }
}
