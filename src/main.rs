//! SigComp CLI
//!
//! Command-line interface for the signature dataset:
//! - Download and extract the archives
//! - Build or load the cached index
//! - Classify individual file names
//! - Manage the cache and config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sigcomp::cache::CacheFile;
use sigcomp::{ensure_data_available, load_index_with, Config, FilenameClassifier, LoggingConfig};
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "sigcomp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SigComp 2011 signature dataset acquisition and indexing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download and extract missing archives
    Fetch,

    /// Load the dataset index, building it on first use
    Index {
        /// Discard the cached index and rebuild it
        #[arg(long)]
        rebuild: bool,
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show how file names are classified
    Classify {
        /// File names or paths
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Delete the cached index
    ClearCache,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config loading logs through a default subscriber until the configured one is known
    let startup = build_subscriber(&LoggingConfig::default(), std::io::stderr);
    let config =
        tracing::subscriber::with_default(startup, || load_config(cli.config.as_deref()))?;

    build_subscriber(&config.logging, std::io::stderr).init();

    match cli.command {
        Commands::Fetch => {
            let fetched = ensure_data_available(&config.acquisition, &config.dataset)
                .context("Dataset acquisition failed")?;

            if fetched.is_empty() {
                println!("All archives already present in {}", config.dataset.root);
            } else {
                for archive in &fetched {
                    println!("Fetched {}", archive.display());
                }
            }
        }

        Commands::Index { rebuild, format } => {
            if rebuild {
                CacheFile::new(config.cache.path())
                    .invalidate()
                    .context("Failed to remove cached index")?;
            }

            let index = load_index_with(&config.dataset, &config.cache)
                .context("Failed to load dataset index")?;

            match format.as_str() {
                "json" => {
                    let output = serde_json::json!({
                        "summary": index.summary(),
                        "class_names": index.class_names(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                _ => {
                    println!("{}", index.summary());
                    for id in index.author_ids() {
                        if let Some(entry) = index.author(id) {
                            println!(
                                "  {:<6} genuine={:<4} forged={}",
                                id,
                                entry.genuine.len(),
                                entry.forgeries.len()
                            );
                        }
                    }
                }
            }
        }

        Commands::Classify { paths } => {
            let classifier = FilenameClassifier::new(config.dataset.extensions.as_slice())
                .context("Invalid extension configuration")?;

            for path in &paths {
                match classifier.classify(path) {
                    Some(label) => println!(
                        "{}\t{}\tsigner={}\tforger={}\tsample={}",
                        path.display(),
                        label.kind,
                        label.signer,
                        label.forger.as_deref().unwrap_or("-"),
                        label.sample
                    ),
                    None => println!("{}\tunrecognized", path.display()),
                }
            }
        }

        Commands::ClearCache => {
            let cache = CacheFile::new(config.cache.path());
            if cache.invalidate().context("Failed to remove cached index")? {
                println!("Removed {}", cache.path().display());
            } else {
                println!("No cache at {}", cache.path().display());
            }
        }

        Commands::Config { output } => {
            let content = sigcomp::config::generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load_default()),
    }
}

/// Build the tracing subscriber. `RUST_LOG` takes precedence over the configured level.
fn build_subscriber<W>(logging: &LoggingConfig, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sigcomp={}", logging.level)));

    let json = logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(writer.clone())))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(writer)))
}
