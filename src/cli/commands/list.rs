//! List command - show cached versions of a tool

use crate::cli::args::{ListArgs, OutputFormat};
use crate::error::ToolCacheResult;
use crate::toolcache::ToolCache;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct ListedVersion<'a> {
    tool: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    arch: Option<&'a str>,
}

/// Execute the list command
pub fn execute(args: ListArgs, cache: &ToolCache) -> ToolCacheResult<()> {
    let versions = cache.list_cached_versions(&args.tool, args.arch.as_deref());

    if versions.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_warn(&ctx, &format!("No cached versions of {}", args.tool));
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&args, &versions),
        OutputFormat::Json => print_json(&args, &versions)?,
        OutputFormat::Plain => print_plain(&versions),
    }

    Ok(())
}

fn print_table(args: &ListArgs, versions: &[String]) {
    let ctx = UiContext::detect();
    let title = match args.arch.as_deref() {
        Some(arch) => format!("{} ({})", args.tool, arch),
        None => args.tool.clone(),
    };
    ui::section(&ctx, &title);

    println!("{}", style("VERSION").bold());
    println!("{}", "-".repeat(20));
    for version in versions {
        println!("{}", version);
    }

    println!();
    println!("{} version(s)", versions.len());
}

fn print_json(args: &ListArgs, versions: &[String]) -> ToolCacheResult<()> {
    let listed: Vec<_> = versions
        .iter()
        .map(|version| ListedVersion {
            tool: &args.tool,
            version,
            arch: args.arch.as_deref(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&listed)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(versions: &[String]) {
    for version in versions {
        println!("{}", version);
    }
}
