//! Extractor CLI - one-shot extraction and maintenance

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use extractor_common::logging::{init_logging, LogConfig, LogLevel};
use extractor_cli::commands::{self, cursor, reannounce, run};
use extractor_server::{config::Config, extract};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(author, version, about = "Incremental dataset extractor")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one extraction and print the summary as JSON
    Run {
        /// Maximum number of records to request
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        n: u64,

        /// Partition label (defaults to today's UTC date)
        #[arg(long)]
        date: Option<String>,
    },

    /// Inspect or repair the resume cursor
    Cursor {
        #[command(subcommand)]
        action: CursorAction,
    },

    /// Publish jobs again for every stored chunk of a label
    Reannounce {
        /// Partition label whose chunks should be announced
        #[arg(long)]
        date: String,
    },
}

#[derive(Subcommand, Debug)]
enum CursorAction {
    /// Print the stored offset
    Show,

    /// Overwrite the stored offset
    Set {
        /// Next offset to fetch
        offset: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("extractor-cli")
        .filter_directives("aws_smithy_runtime=warn,aws_config=warn,lapin=warn")
        .build()
        .merge_env()?;

    init_logging(&log_config)?;

    let config = Config::load()?;
    let extractor = extract::build_extractor(&config)?;

    match cli.command {
        Command::Run { n, date } => {
            let label = commands::resolve_label(date.as_deref(), commands::today_utc())?;
            let summary = run::run(&extractor, n, label).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        },
        Command::Cursor { action } => {
            let store = extractor.cursor();
            match action {
                CursorAction::Show => match cursor::show(&store).await? {
                    Some(offset) => println!("{} {}", "Cursor:".cyan().bold(), offset),
                    None => println!(
                        "{} no usable value in '{}', next run starts at 0",
                        "Cursor:".cyan().bold(),
                        store.object()
                    ),
                },
                CursorAction::Set { offset } => {
                    let previous = cursor::set(&store, offset).await?;
                    let previous = previous.map_or_else(|| "none".to_string(), |p| p.to_string());
                    println!(
                        "{} {} -> {}",
                        "Cursor updated:".green().bold(),
                        previous,
                        offset
                    );
                },
            }
        },
        Command::Reannounce { date } => {
            let label = commands::resolve_label(Some(&date), commands::today_utc())?;
            let report = reannounce::run(&extractor, &label).await?;
            println!("{}", "Re-announcement:".cyan().bold());
            println!("  Chunks found: {}", report.found);
            println!("  Announced:    {}", report.announced.to_string().green());
            if report.failed > 0 {
                println!("  Failed:       {}", report.failed.to_string().red());
            }
        },
    }

    info!("Done");
    Ok(())
}
