//! `nobeline run` - fetch both listings, then join them

use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Args;

use nobeline_core::{ProgressContext, is_shutdown_requested};
use nobeline_join::JoinConfig;
use nobeline_laureates::Entity;

use super::fetch::{ApiArgs, OutputArgs};
use super::join::print_join_summary;
use super::print_run_summary;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub out: OutputArgs,

    #[command(flatten)]
    pub api: ApiArgs,

    /// Skip the join stage
    #[arg(long)]
    pub no_join: bool,

    /// DuckDB memory limit for the join (e.g. "1GB")
    #[arg(long, default_value = "1GB")]
    pub memory_limit: String,
}

/// Each entity gets its own subdirectory so manifests do not collide:
/// `{out}/laureates`, `{out}/nobel-prizes`, `{out}/joined`.
pub fn run(args: RunArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let start = Instant::now();
    let root = args
        .out
        .output
        .clone()
        .unwrap_or_else(|| config.output.default_dir.clone());
    let sink = args.out.sink(config)?;

    for entity in Entity::all() {
        if is_shutdown_requested() {
            bail!("Interrupted before {entity}");
        }
        let pipeline = args
            .api
            .pipeline_config(*entity, root.join(entity.name()), sink, config)?;
        let summary = nobeline_laureates::run(&pipeline, progress)
            .with_context(|| format!("{entity} stage failed"))?;
        print_run_summary(&summary);
    }

    if args.no_join {
        log::info!("Skipping join");
    } else {
        let join_config = JoinConfig {
            input_dir: root.join(Entity::Laureates.name()),
            prizes_dir: Some(root.join(Entity::NobelPrizes.name())),
            output_dir: root.join("joined"),
            format: sink.format,
            memory_limit: args.memory_limit,
        };
        let summary = nobeline_join::run(&join_config).context("join stage failed")?;
        print_join_summary(&summary);
    }

    log::info!(
        "Run complete in {:.1}s: {}",
        start.elapsed().as_secs_f64(),
        root.display()
    );
    Ok(())
}
