// VCT scout entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout carries only results)
// 2. Load config (copying defaults on first run)
// 3. Load reference data, mappings, and the optional stats scrape
// 4. Run the requested subcommand

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use vct_scout::config;
use vct_scout::loader::DirectorySource;
use vct_scout::prompt;
use vct_scout::session::Session;

#[derive(Parser)]
#[command(
    name = "vct-scout",
    about = "Link VCT match data to players and teams, and answer questions about them",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory containing config/ (and defaults/ for first-run setup)
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every match with its teams, players, tournament, and league
    Link {
        /// Emit JSON instead of text lines
        #[arg(long)]
        json: bool,
    },

    /// Look up the player or team a question refers to
    Ask {
        /// The question, e.g. "who is tenz"
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Print the full model prompt for a question
    Prompt {
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize tracing
    init_tracing()?;

    // 2. Load config
    let config = config::load_config_in(&cli.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: data dir {}, threshold {}",
        config.data_dir().display(),
        config.matching.threshold
    );

    // 3. Load data
    let source = DirectorySource::from_config(&config);
    let session = Session::open(config, &source).context("failed to load data")?;

    // 4. Run the subcommand
    match cli.command {
        Commands::Link { json } => {
            let linked = session.linked();
            if json {
                let text = serde_json::to_string_pretty(&linked)
                    .context("failed to serialize linked records")?;
                println!("{text}");
            } else {
                print!("{}", prompt::format_linked_records(&linked, linked.len()));
            }
        }
        Commands::Ask { text } => {
            println!("{}", session.answer(&text.join(" ")));
        }
        Commands::Prompt { text } => {
            println!("{}", session.prompt(&text.join(" ")));
        }
    }

    Ok(())
}

/// Initialize tracing to stderr without colour codes.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vct_scout=info,vct_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
