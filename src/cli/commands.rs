use clap::CommandFactory;
use clap_complete::Shell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::Cli;
use crate::config::{Config, LoggingConfig, SAMPLE_CONFIG};
use crate::error::{Error, Result};
use crate::feed::Category;
use crate::pipeline::{Pipeline, RunOptions};

/// Write the sample configuration to `path`
pub async fn init(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Invalid(format!(
            "Configuration file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&path, SAMPLE_CONFIG).await?;
    info!("Created configuration: {}", path.display());

    println!("✅ Configuration written to {}", path.display());
    println!("");
    println!("Next steps:");
    println!("   1. Set LLM_GATEWAY_API_KEY and LLM_GATEWAY_BASE_URL to enable translation");
    println!("   2. Generate feeds: security-feed --config {} generate", path.display());

    Ok(())
}

/// Load the configuration from `path`, or from the default location
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    Config::load_with_env(&path)
}

/// Fetch, translate and publish every configured source
pub async fn generate(
    mut config: Config,
    output_dir: Option<PathBuf>,
    no_translate: bool,
    no_cache: bool,
) -> Result<()> {
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }

    let options = RunOptions {
        translate: !no_translate,
        use_cache: !no_cache,
    };
    let pipeline = Pipeline::from_config(&config, options)?;
    let output = pipeline.run(&config.sources).await?;

    println!("📊 Generation Summary:");
    println!("   📰 Sources: {}", config.sources.len());
    println!("   📄 Articles: {}", output.articles.len());
    match output.translation {
        Some(report) => {
            println!(
                "   🌐 Translated: {} (cached: {}, failed: {}, skipped: {})",
                report.translated, report.cache_hits, report.failed, report.skipped
            );
        }
        None => println!("   🌐 Translation: skipped"),
    }
    println!("   💾 Files written: {} under {}", output.written.len(), config.output.dir.display());

    Ok(())
}

/// Print the configured sources grouped by category
pub fn list_sources(config: &Config) {
    if config.sources.is_empty() {
        println!("📋 No sources configured yet.");
        return;
    }

    println!("📋 Configured Sources ({}):", config.sources.len());
    println!("========================");
    for category in Category::ALL {
        let sources: Vec<_> = config.sources.iter().filter(|s| s.category == category).collect();
        if sources.is_empty() {
            continue;
        }

        println!("\n{} ({})", category.label(), category);
        for source in sources {
            println!("   📰 {}", source.name);
            println!("      Feed: {}", source.feed_url);
            println!("      Home: {}", source.homepage_url);
        }
    }
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    write_completions(shell, &mut io::stdout());
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

/// Initialize logging based on verbosity flags and the `[logging]` section.
///
/// The returned guard flushes the log file and must live until exit.
pub fn init_logging(debug: bool, verbose: bool, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let console = if logging.json_format {
        fmt::layer().json().with_writer(io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(debug)
            .with_line_number(debug)
            .with_writer(io::stderr)
            .boxed()
    };

    let (file, guard) = if logging.log_to_file {
        let (dir, name) = split_log_path(&logging.log_file)?;
        std::fs::create_dir_all(&dir)?;
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        let layer = if logging.json_format { layer.json().boxed() } else { layer.boxed() };
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized");
    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("Invalid log file path: {}", path.display())))?;
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, PathBuf::from(name)))
}
