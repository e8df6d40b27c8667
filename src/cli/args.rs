//! CLI argument definitions using clap derive

use crate::platform::ArchNaming;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// toolcache - Local tool cache for CI runners
///
/// Caches tool binaries by name, version and architecture, resolves
/// version ranges against the cache and downloads on a miss.
#[derive(Parser, Debug)]
#[command(name = "toolcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TOOLCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root (overrides config and RUNNER_TOOL_CACHE)
    #[arg(long, global = true)]
    pub cache_root: Option<PathBuf>,

    /// Download directory (overrides config and RUNNER_TEMP)
    #[arg(long, global = true)]
    pub temp_dir: Option<PathBuf>,

    /// Naming scheme for the default architecture: node or native
    #[arg(long, global = true)]
    pub arch_naming: Option<ArchNaming>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the path of the best cached version matching a range
    Find(FindArgs),

    /// List cached versions of a tool
    List(ListArgs),

    /// Cache a single file
    CacheFile(CacheFileArgs),

    /// Cache the contents of a directory
    CacheDir(CacheDirArgs),

    /// Download a URL into the download directory
    Download(DownloadArgs),

    /// Print a cached tool, downloading and caching it on a miss
    Get(GetArgs),

    /// Show resolved cache locations and host identifiers
    Info,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the find command
#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Tool name
    pub tool: String,

    /// Version range, e.g. ~1.205, ^2.0.0, "*"
    #[arg(id = "version_req", value_name = "VERSION")]
    pub version: String,

    /// Architecture (any when omitted)
    #[arg(short, long)]
    pub arch: Option<String>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Tool name
    pub tool: String,

    /// Architecture (any when omitted)
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Key of the entry to write
#[derive(Parser, Debug)]
pub struct EntryArgs {
    /// Tool name
    pub tool: String,

    /// Exact version (a leading =v is stripped)
    #[arg(id = "version_req", value_name = "VERSION")]
    pub version: String,

    /// Architecture (defaults to the host architecture)
    #[arg(short, long)]
    pub arch: Option<String>,
}

/// Arguments for the cache-file command
#[derive(Parser, Debug)]
pub struct CacheFileArgs {
    /// File to cache
    pub source: PathBuf,

    #[command(flatten)]
    pub entry: EntryArgs,

    /// Name inside the entry (defaults to the tool name)
    #[arg(long)]
    pub target: Option<String>,
}

/// Arguments for the cache-dir command
#[derive(Parser, Debug)]
pub struct CacheDirArgs {
    /// Directory whose contents are cached
    pub source: PathBuf,

    #[command(flatten)]
    pub entry: EntryArgs,
}

/// Arguments for the download command
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// URL to download
    pub url: String,

    /// Destination file (must not exist)
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Octal permission bits for the downloaded file, e.g. 755
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<u32>,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Tool name (also the file name inside the cache entry)
    pub tool: String,

    /// Version to look up and to cache under
    #[arg(id = "version_req", value_name = "VERSION")]
    pub version: String,

    /// URL to download on a cache miss
    pub url: String,

    /// Architecture (defaults to the host architecture)
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Octal permission bits for a fresh download, e.g. 755
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<u32>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Parse octal permission bits such as `755` or `0o755`
fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| format!("invalid octal mode '{s}', expected e.g. 755"))?;
    if mode > 0o7777 {
        return Err(format!("mode '{s}' is out of range"));
    }
    Ok(mode)
}
