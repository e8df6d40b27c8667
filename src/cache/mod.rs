//! On-disk tool cache
//!
//! Tools are cached per `{tool, version, arch}` under a cache root, using the
//! same layout as the hosted CI runners so existing caches stay readable:
//!
//! ```text
//! <root>/<tool>/<version>/<arch>/...files
//! <root>/<tool>/<version>/<arch>.complete
//! ```
//!
//! # Entry States
//!
//! | State | On disk | Reader sees |
//! |-------|---------|-------------|
//! | Miss | no directory | miss |
//! | Building | directory, no marker | miss |
//! | Complete | directory and marker | hit |
//!
//! Writers serialize on a per-entry lock; readers only trust complete entries.

pub mod key;
pub mod lock;
pub mod resolver;
pub mod walk;
pub mod writer;

pub use key::{is_complete, sanitize_subpath, CacheKey, CacheOptions};
pub use lock::EntryLock;
pub use resolver::{find_version, list_cached_versions, VersionQuery};
pub use walk::{SourceFile, SourceFiles};
pub use writer::{cache, cache_directory, cache_file, WriterSettings};
