//! Petal CLI - classify flower photos with a pre-trained image model.
//!
//! Petal takes one photo, resizes it to the model's input, runs the
//! classifier and prints the most likely flower with its confidence.
//!
//! # Usage
//!
//! ```bash
//! # Classify a photo
//! petal classify rose.jpg
//!
//! # Classify from stdin, JSON output with every class score
//! cat rose.jpg | petal classify - --format json --scores
//!
//! # Menu-driven screen (also the default on a terminal)
//! petal interactive
//!
//! # Check that the model and label table agree
//! petal models check
//! ```

use std::io::IsTerminal;

use clap::{CommandFactory, Parser, Subcommand};

mod cli;
mod logging;

/// Petal - classify flower photos with a pre-trained image model.
#[derive(Parser, Debug)]
#[command(name = "petal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a single photo
    Classify(cli::classify::ClassifyArgs),

    /// Open the menu-driven classification screen
    Interactive,

    /// Inspect the classifier model and label table
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match petal_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `petal config path`."
            );
            petal_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Petal v{}", petal_core::VERSION);

    match cli.command {
        Some(Commands::Classify(args)) => cli::classify::execute(args, config).await,
        Some(Commands::Interactive) => cli::interactive::run(config).await,
        Some(Commands::Models(args)) => cli::models::execute(args, &config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => {
            if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
                cli::interactive::run(config).await
            } else {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}
