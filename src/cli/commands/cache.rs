//! Cache commands - store a file or a directory as a cache entry

use crate::cache::CacheOptions;
use crate::cli::args::{CacheDirArgs, CacheFileArgs, EntryArgs};
use crate::error::ToolCacheResult;
use crate::toolcache::ToolCache;
use tracing::info;

fn options(entry: &EntryArgs) -> CacheOptions {
    let options = CacheOptions::new(&entry.tool, &entry.version);
    match entry.arch.as_deref() {
        Some(arch) => options.with_arch(arch),
        None => options,
    }
}

/// Execute the cache-file command
pub fn execute_file(args: CacheFileArgs, cache: &ToolCache) -> ToolCacheResult<()> {
    let target = args.target.as_deref().unwrap_or(&args.entry.tool);
    let entry = cache.cache_file(&args.source, target, &options(&args.entry))?;

    info!("Cached {} as {}", args.source.display(), target);
    println!("{}", entry.display());
    Ok(())
}

/// Execute the cache-dir command
pub fn execute_dir(args: CacheDirArgs, cache: &ToolCache) -> ToolCacheResult<()> {
    let entry = cache.cache_directory(&args.source, &options(&args.entry))?;

    info!("Cached contents of {}", args.source.display());
    println!("{}", entry.display());
    Ok(())
}
