//! # Autolink Configuration
//!
//! Typed configuration for the autolinking engine: the enable switch, case
//! folding, engine selection, the name denylist, the link URL prefix and the
//! soft deadline of a single autolinking pass.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autolink_config::AutolinkConfig;
//!
//! let config = AutolinkConfig::load("autolink.toml")?;
//! assert!(config.validate().is_ok());
//! # Ok::<(), autolink_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod autolink;
mod error;
mod loader;

pub use autolink::*;
pub use error::*;
