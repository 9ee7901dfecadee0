/// Podcastr - terminal podcast player
mod config;
mod console;
mod error;
mod player;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crate::config::CliConfig;
use podcastr_playback::Queue;
use std::{path::Path, path::PathBuf, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "podcastr")]
#[command(about = "Podcastr terminal podcast player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PODCASTR_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the episodes of a catalog
    List {
        /// Episode catalog (JSON array)
        catalog: PathBuf,
    },
    /// Play a catalog interactively
    Play {
        /// Episode catalog (JSON array)
        catalog: PathBuf,
        /// Episode to start from
        #[arg(short, long, default_value_t = 0)]
        index: usize,
        /// Start with shuffle enabled
        #[arg(long)]
        shuffle: bool,
        /// Start with loop enabled
        #[arg(long = "loop")]
        looping: bool,
        /// Override the device clock tick, in milliseconds
        #[arg(long)]
        tick_millis: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::List { catalog } => {
            let queue = load_catalog(&catalog)
                .with_context(|| format!("failed to load catalog {:?}", catalog))?;
            for (index, episode) in queue.iter().enumerate() {
                println!(
                    "{}",
                    console::describe_catalog_entry(
                        index,
                        &episode.title,
                        &episode.members,
                        episode.duration_seconds
                    )
                );
            }
        }
        Commands::Play {
            catalog,
            index,
            shuffle,
            looping,
            tick_millis,
        } => {
            let queue = load_catalog(&catalog)
                .with_context(|| format!("failed to load catalog {:?}", catalog))?;
            if queue.is_empty() {
                anyhow::bail!("catalog {:?} has no episodes", catalog);
            }

            let tick_millis = tick_millis.unwrap_or(config.tick_millis);
            if tick_millis == 0 {
                anyhow::bail!("--tick-millis must be greater than zero");
            }

            let options = player::PlayOptions {
                index,
                looping: looping || config.start_looping,
                shuffling: shuffle || config.start_shuffling,
                tick: Duration::from_millis(tick_millis),
            };

            tracing::info!(catalog = ?catalog, episodes = queue.len(), "Loaded catalog");
            player::run(queue, options).await?;
        }
    }

    Ok(())
}

fn load_catalog(path: &Path) -> error::Result<Queue> {
    let json = std::fs::read_to_string(path)?;
    Ok(Queue::from_json(&json)?)
}
