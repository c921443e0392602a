//! Inkpress - static blog build and deploy pipeline
//!
//! Inkpress wraps a Markdown blog's external static-site generator: it runs
//! the generator into a clean output directory, copies the custom-domain
//! marker in, then mirrors the output into a separate deploy repository and
//! pushes it with a timestamped commit.

pub mod config;
pub mod content;
pub mod error;
pub mod fsutil;
pub mod generate;
pub mod publish;
pub mod watcher;

// Re-exports for convenience
pub use config::{Config, ConfigWarning};
pub use content::{extract_front_matter, scan_posts, FrontMatter, Post};
pub use error::{InkpressError, InkpressResult};
pub use generate::{build_site, BuildOptions, BuildSummary};
pub use publish::{deploy_timestamp, publish, PublishSummary};
pub use watcher::{watch, WatchEvent, WatchOptions};
