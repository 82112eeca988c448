//! Configuration for hkgraph graphs.
//!
//! Engine settings (dispatch mode, event policy, worker thread naming and
//! log filtering) live in a small TOML file, by default
//! `graph.toml` in the platform config directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use hkgraph_config::{GraphConfig, default_config_path};
//!
//! let config = GraphConfig::load_or_default(default_config_path()).unwrap();
//! let graph = config.build_graph();
//! println!("{}", graph.stats());
//! ```

mod error;
mod graph_config;

/// Platform-specific configuration paths.
pub mod paths;

pub use error::ConfigError;
pub use graph_config::GraphConfig;
pub use paths::{CONFIG_FILE_NAME, default_config_path, ensure_user_config_dir, user_config_dir};
