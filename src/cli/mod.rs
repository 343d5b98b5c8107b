pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{LoggingConfig, DEFAULT_CONFIG_FILE};
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "security-feed")]
#[command(about = "Aggregates security news feeds, translates English articles and publishes RSS/Atom/JSON feeds")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a sample configuration file
    Init {
        /// Where to write the configuration
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Fetch, translate and publish all feeds
    Generate {
        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip translation even when a gateway is configured
        #[arg(long)]
        no_translate: bool,

        /// Do not read or write the translation cache file
        #[arg(long)]
        no_cache: bool,
    },

    /// List the configured feed sources
    ListSources,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init { path, force } => {
                let _guard = commands::init_logging(self.debug, self.verbose, &LoggingConfig::default())?;
                commands::init(path, force).await
            }
            Commands::Generate {
                output_dir,
                no_translate,
                no_cache,
            } => {
                let config = commands::load_config(self.config)?;
                let _guard = commands::init_logging(self.debug, self.verbose, &config.logging)?;
                commands::generate(config, output_dir, no_translate, no_cache).await
            }
            Commands::ListSources => {
                let config = commands::load_config(self.config)?;
                let _guard = commands::init_logging(self.debug, self.verbose, &config.logging)?;
                commands::list_sources(&config);
                Ok(())
            }
            Commands::Completions { shell } => {
                commands::generate_completions(shell);
                Ok(())
            }
        }
    }
}
