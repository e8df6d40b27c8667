//! Get command - cached tool path, downloading on a miss

use crate::cache::CacheOptions;
use crate::cli::args::GetArgs;
use crate::download::DownloadOptions;
use crate::error::ToolCacheResult;
use crate::toolcache::ToolCache;

/// Execute the get command
pub fn execute(args: GetArgs, cache: &ToolCache) -> ToolCacheResult<()> {
    let mut options = CacheOptions::new(args.tool, args.version);
    options.arch = args.arch;

    let download = match args.mode {
        Some(mode) => DownloadOptions::default().with_permissions(mode),
        None => DownloadOptions::default(),
    };

    let path = cache.get_cached_tool_or_download(&options, &download, &args.url)?;
    println!("{}", path.display());
    Ok(())
}
