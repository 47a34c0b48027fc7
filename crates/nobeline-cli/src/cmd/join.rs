//! Join subcommand - outer-join the normalized tables back together

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use nobeline_core::OutputFormat;
use nobeline_join::{JoinConfig, JoinSummary};

use super::{parse_format, print_summary};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Directory with laureates.* and laureate_prizes.* (CSV, TSV or Parquet)
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory with nobel_prizes.* (default: --input-dir)
    #[arg(long)]
    pub prizes_dir: Option<PathBuf>,

    /// Output directory for joined tables
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: csv or parquet
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// DuckDB memory limit (e.g. "1GB")
    #[arg(long, default_value = "1GB")]
    pub memory_limit: String,
}

fn pct(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

pub fn print_join_summary(summary: &JoinSummary) {
    let mut rows = vec![
        ("Laureates", summary.laureates.to_string()),
        ("Award rows", summary.award_rows.to_string()),
        (
            "With affiliation",
            format!(
                "{} ({:.1}%)",
                summary.awards_with_affiliation,
                pct(summary.awards_with_affiliation, summary.award_rows)
            ),
        ),
        ("Without prize", summary.laureates_without_prize.to_string()),
    ];
    if let Some(n) = summary.prize_detail_rows {
        rows.push(("Prize detail rows", n.to_string()));
    }
    print_summary("Join", &rows);
}

pub fn run(args: JoinArgs, config: &Config) -> Result<()> {
    let format = match args.format {
        Some(f) => f,
        None => parse_format(&config.output.format).map_err(anyhow::Error::msg)?,
    };
    let join_config = JoinConfig {
        input_dir: args.input_dir,
        prizes_dir: args.prizes_dir,
        output_dir: args
            .output
            .unwrap_or_else(|| config.output.default_dir.join("joined")),
        format,
        memory_limit: args.memory_limit,
    };

    let summary = nobeline_join::run(&join_config)?;
    print_join_summary(&summary);
    Ok(())
}
