//! Find command - resolve a version range against the cache

use crate::cache::VersionQuery;
use crate::cli::args::FindArgs;
use crate::error::ToolCacheResult;
use crate::toolcache::ToolCache;

/// Execute the find command
pub fn execute(args: FindArgs, cache: &ToolCache) -> ToolCacheResult<()> {
    let mut query = VersionQuery::new(args.tool, args.version);
    query.arch = args.arch;

    let entry = cache.find_version(&query)?;
    println!("{}", entry.display());
    Ok(())
}
