//! CLI command implementations

pub mod cache;
pub mod config;
pub mod download;
pub mod find;
pub mod get;
pub mod info;
pub mod list;

pub use cache::{execute_dir as cache_dir, execute_file as cache_file};
pub use config::execute as config;
pub use download::execute as download;
pub use find::execute as find;
pub use get::execute as get;
pub use info::execute as info;
pub use list::execute as list;
