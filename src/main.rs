use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hayabusa::cache::{CacheControl, Fingerprint, KeyFormat};
use hayabusa::config::Config;

/// Hayabusa - serving core of an HTTP caching reverse proxy
#[derive(Parser, Debug)]
#[command(name = "hayabusa")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test configuration and exit
    Check,

    /// Print the cache key for a request
    Fingerprint {
        #[arg(short, long, default_value = "GET")]
        method: String,
        host: String,
        /// Path and query, e.g. /index.html?v=1
        uri: String,
    },

    /// Evaluate a Cache-Control header value
    Ttl { cache_control: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        Config::from_file(&args.config)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load {}", args.config.display()))?
    } else if matches!(args.command, Command::Check) {
        bail!("Configuration file {} not found", args.config.display());
    } else {
        Config::default()
    };

    hayabusa::logging::init_subscriber(&config.logging)
        .context("Failed to initialize logging subsystem")?;

    match args.command {
        Command::Check => {
            config
                .validate()
                .map_err(anyhow::Error::msg)
                .context("Configuration is invalid")?;
            tracing::info!(
                config_file = %args.config.display(),
                max_size_bytes = config.cache.max_size_bytes,
                compress_min_length = config.cache.compress_min_length,
                key_format = ?config.cache.key_format,
                pass_rules = config.cache.pass.len(),
                "Configuration loaded successfully"
            );
            let effective = serde_json::to_string_pretty(&config)
                .context("Failed to render configuration")?;
            println!("{}", effective);
        }
        Command::Fingerprint { method, host, uri } => {
            let key = Fingerprint::with_format(
                config.cache.key_format,
                method.to_ascii_uppercase().as_bytes(),
                host.as_bytes(),
                uri.as_bytes(),
            );
            match config.cache.key_format {
                KeyFormat::Concat => println!("{}", key),
                KeyFormat::LengthPrefixed => println!("{:?}", key.as_bytes()),
            }
        }
        Command::Ttl { cache_control } => {
            let parsed = CacheControl::parse(&cache_control);
            tracing::debug!(?parsed, "Parsed Cache-Control");
            println!("{}", parsed.ttl_seconds());
        }
    }

    Ok(())
}
