//! Info command - show resolved locations and host identifiers

use crate::config::ConfigManager;
use crate::error::ToolCacheResult;
use crate::platform::{host_arch, host_platform};
use crate::toolcache::ToolCache;
use crate::ui::{self, UiContext};

/// Execute the info command
pub fn execute(cache: &ToolCache, manager: &ConfigManager) -> ToolCacheResult<()> {
    let ctx = UiContext::detect();
    let settings = cache.settings();
    let config_path = manager.path();
    let config_state = if config_path.exists() {
        config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", config_path.display())
    };

    ui::section(&ctx, "Locations");
    ui::key_value(&ctx, "Cache root", &settings.cache_root.display().to_string());
    ui::key_value(&ctx, "Download dir", &settings.temp_dir.display().to_string());
    ui::key_value(&ctx, "Config", &config_state);

    println!();
    ui::section(&ctx, "Host");
    ui::key_value(&ctx, "Arch naming", &settings.arch_naming.to_string());
    ui::key_value(&ctx, "Arch", host_arch(settings.arch_naming));
    ui::key_value(&ctx, "Platform", host_platform(settings.arch_naming));
    ui::key_value(
        &ctx,
        "Lock timeout",
        &format!("{}s", settings.lock_timeout.as_secs()),
    );

    Ok(())
}
