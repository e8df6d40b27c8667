//! Download command - fetch a URL into the download directory

use crate::cli::args::DownloadArgs;
use crate::download::DownloadOptions;
use crate::error::ToolCacheResult;
use crate::toolcache::ToolCache;

/// Execute the download command
pub fn execute(args: DownloadArgs, cache: &ToolCache) -> ToolCacheResult<()> {
    let mut options = match args.dest {
        Some(dest) => DownloadOptions::to(dest),
        None => DownloadOptions::default(),
    };
    if let Some(mode) = args.mode {
        options = options.with_permissions(mode);
    }

    let path = cache.download_tool(&args.url, &options)?;
    println!("{}", path.display());
    Ok(())
}
