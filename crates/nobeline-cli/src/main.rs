//! nobeline - Nobel Prize API to normalized tables
//!
//! Pages through the Nobel Prize REST API, flattens laureates and prizes
//! into joinable tables, and outer-joins them back together.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "nobeline")]
#[command(about = "Flatten the Nobel Prize API into normalized tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./nobeline.toml or ~/.config/nobeline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    read_timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Milliseconds to wait between page requests
    #[arg(long, global = true)]
    page_delay_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one listing (laureates or nobel-prizes) and write its tables
    Fetch(cmd::fetch::FetchArgs),
    /// Outer-join previously written tables
    Join(cmd::join::JoinArgs),
    /// Fetch both listings, then join
    Run(cmd::run::RunArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = nobeline_core::install_signal_handlers() {
        eprintln!("warning: failed to install signal handlers: {e}");
    }

    let progress = nobeline_core::ProgressContext::new();

    // Logging:
    //   TTY:     quiet (warn) unless --debug, progress bars show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    nobeline_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Config file defaults, CLI overrides
    let http_config = nobeline_core::HttpConfig {
        read_timeout: std::time::Duration::from_secs(
            cli.read_timeout.unwrap_or(config.http.read_timeout),
        ),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
        page_delay: std::time::Duration::from_millis(
            cli.page_delay_ms.unwrap_or(config.http.page_delay_ms),
        ),
    };
    nobeline_core::set_http_config(http_config);

    match cli.command {
        Command::Fetch(args) => cmd::fetch::run(args, &config, &progress),
        Command::Join(args) => cmd::join::run(args, &config),
        Command::Run(args) => cmd::run::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Output directory",
                &config.output.default_dir.display().to_string(),
            ]);
            table.add_row(vec!["Output format", &config.output.format]);
            table.add_row(vec![
                "Compression level",
                &config.output.compression_level.to_string(),
            ]);
            table.add_row(vec!["API base URL", &config.api.base_url]);
            table.add_row(vec!["Page size", &config.api.page_size.to_string()]);
            table.add_row(vec!["Language", &config.api.language]);
            table.add_row(vec![
                "Read timeout",
                &format!("{}s", config.http.read_timeout),
            ]);
            table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);
            table.add_row(vec![
                "Page delay",
                &format!("{}ms", config.http.page_delay_ms),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
