//! toolcache - Local tool cache for CI runners
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use toolcache::cli::{commands, Cli, Commands};
use toolcache::config::{Config, ConfigManager, ToolCacheSettings};
use toolcache::error::ToolCacheResult;
use toolcache::ToolCache;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> ToolCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // A broken config file must not block `config init --force`
    let config = match config_manager.load() {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Config(_)) => {
            eprintln!("{} {}", style("Warning:").yellow(), e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    let mut settings = ToolCacheSettings::from_config(&config);
    if let Some(root) = cli.cache_root {
        settings = settings.with_cache_root(root);
    }
    if let Some(dir) = cli.temp_dir {
        settings = settings.with_temp_dir(dir);
    }
    if let Some(naming) = cli.arch_naming {
        settings = settings.with_arch_naming(naming);
    }
    debug!(
        "Cache root {}, download dir {}",
        settings.cache_root.display(),
        settings.temp_dir.display()
    );

    let cache = ToolCache::new(settings);

    match cli.command {
        Commands::Find(args) => commands::find(args, &cache),
        Commands::List(args) => commands::list(args, &cache),
        Commands::CacheFile(args) => commands::cache_file(args, &cache),
        Commands::CacheDir(args) => commands::cache_dir(args, &cache),
        Commands::Download(args) => commands::download(args, &cache),
        Commands::Get(args) => commands::get(args, &cache),
        Commands::Info => commands::info(&cache, &config_manager),
        Commands::Config(args) => commands::config(args, &config, &config_manager),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; logs go to stderr so stdout stays parseable
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("toolcache=warn"),
        1 => EnvFilter::new("toolcache=info"),
        _ => EnvFilter::new("toolcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
