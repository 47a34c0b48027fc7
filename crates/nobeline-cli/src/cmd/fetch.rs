//! Fetch subcommand - page through one API listing and write its tables

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use nobeline_core::{OutputFormat, ProgressContext, SinkOptions};
use nobeline_laureates::{Entity, Language, parse_filter};

use super::{parse_delimiter, parse_format, parse_language, print_run_summary};
use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: csv or parquet
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Field delimiter for CSV output (`tab` for TSV)
    #[arg(long, value_parser = parse_delimiter, default_value = ",")]
    pub delimiter: u8,

    /// Zstd compression level for Parquet output (1-22)
    #[arg(short, long)]
    pub zstd_level: Option<i32>,
}

impl OutputArgs {
    pub fn sink(&self, config: &Config) -> Result<SinkOptions> {
        let format = match self.format {
            Some(f) => f,
            None => parse_format(&config.output.format).map_err(anyhow::Error::msg)?,
        };
        Ok(SinkOptions {
            format,
            delimiter: self.delimiter,
            zstd_level: self.zstd_level.unwrap_or(config.output.compression_level),
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Records per page request
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Stop after this many records
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Language for localized text: en, se or no
    #[arg(long, value_parser = parse_language)]
    pub language: Option<Language>,

    /// Extra query parameter passed to the API (repeatable), e.g. nobelPrizeCategory=phy
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Also write the raw records as JSON
    #[arg(long)]
    pub save_raw: bool,
}

impl ApiArgs {
    /// Pipeline config for `entity`, writing into `output_dir`
    pub fn pipeline_config(
        &self,
        entity: Entity,
        output_dir: PathBuf,
        sink: SinkOptions,
        config: &Config,
    ) -> Result<nobeline_laureates::Config> {
        let language = match self.language {
            Some(l) => l,
            None => parse_language(&config.api.language).map_err(anyhow::Error::msg)?,
        };
        Ok(nobeline_laureates::Config {
            base_url: config.api.base_url.clone(),
            entity,
            output_dir,
            sink,
            page_size: self.page_size.unwrap_or(config.api.page_size),
            max_records: self.limit,
            language,
            filters: self.filters.clone(),
            save_raw: self.save_raw,
            input: None,
        })
    }
}

fn parse_entity(s: &str) -> Result<Entity, String> {
    Entity::from_name(s).ok_or_else(|| format!("unknown entity '{s}' (laureates, nobel-prizes)"))
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Listing to fetch: laureates or nobel-prizes
    #[arg(short, long, value_parser = parse_entity, default_value = "laureates")]
    pub entity: Entity,

    #[command(flatten)]
    pub out: OutputArgs,

    #[command(flatten)]
    pub api: ApiArgs,

    /// Flatten a saved raw dump instead of calling the API
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: FetchArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let output_dir = args
        .out
        .output
        .clone()
        .unwrap_or_else(|| config.output.default_dir.join(args.entity.name()));
    let sink = args.out.sink(config)?;
    let mut pipeline = args
        .api
        .pipeline_config(args.entity, output_dir.clone(), sink, config)?;
    pipeline.input = args.input;

    log::info!("Fetching {}", pipeline.entity);
    match &pipeline.input {
        Some(path) => log::info!("  Input: {}", path.display()),
        None => log::info!("  URL: {}", pipeline.endpoint_url()),
    }
    log::info!("  Output: {} ({})", output_dir.display(), sink.extension());

    let summary = nobeline_laureates::run(&pipeline, progress)?;
    print_run_summary(&summary);
    Ok(())
}
