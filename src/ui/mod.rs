//! Human-facing output for the CLI
//!
//! Machine-readable results (paths, JSON) go to stdout unstyled; status lines
//! go through these helpers, which drop colors in CI and when piped.

mod context;
mod output;

pub use context::UiContext;
pub use output::{key_value, section, step_ok_detail, step_warn, step_warn_hint};
