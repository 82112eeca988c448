//! Graph configuration file format.

use std::path::Path;

use hkgraph_core::{DEFAULT_WORKER_THREAD_NAME, DispatchMode, Graph, GraphOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;
use crate::paths::ensure_dir;

/// Engine settings read from a TOML file.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// ```toml
/// dispatch = "worker"
/// notify_additions = false
/// worker_thread_name = "hkgraph-dispatch"
/// log_filter = "hkgraph_core=debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Where dispatch steps and listener notifications run.
    pub dispatch: DispatchMode,

    /// Whether node and edge additions are announced to listeners.
    pub notify_additions: bool,

    /// Name given to dispatch worker threads.
    pub worker_thread_name: String,

    /// Tracing filter directive for hosts that install a subscriber.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::default(),
            notify_additions: false,
            worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_owned(),
            log_filter: None,
        }
    }
}

impl GraphConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), dispatch = %config.dispatch, "config loaded");
        Ok(config)
    }

    /// Load from `path` if the file exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load a configuration from a TOML string.
    ///
    /// Fails with [`ConfigError::InvalidValue`] if `worker_thread_name`
    /// contains a NUL byte.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_thread_name.contains('\0') {
            return Err(ConfigError::InvalidValue {
                field: "worker_thread_name",
                reason: "contains a NUL byte",
            });
        }
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Engine options described by this configuration.
    pub fn to_options(&self) -> GraphOptions {
        GraphOptions {
            mode: self.dispatch,
            notify_additions: self.notify_additions,
            worker_thread_name: self.worker_thread_name.clone(),
        }
    }

    /// An empty graph configured accordingly.
    pub fn build_graph(&self) -> Graph {
        Graph::with_options(self.to_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.dispatch, DispatchMode::Worker);
        assert!(!config.notify_additions);
        assert_eq!(config.worker_thread_name, DEFAULT_WORKER_THREAD_NAME);
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = GraphConfig::from_toml(
            r#"
            dispatch = "inline"
            notify_additions = true
            worker_thread_name = "patch-worker"
            log_filter = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch, DispatchMode::Inline);
        assert!(config.notify_additions);
        assert_eq!(config.worker_thread_name, "patch-worker");
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GraphConfig::from_toml("notify_additions = true").unwrap();
        assert_eq!(config.dispatch, DispatchMode::Worker);
        assert!(config.notify_additions);

        let empty = GraphConfig::from_toml("").unwrap();
        assert_eq!(empty, GraphConfig::default());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = GraphConfig::from_toml(r#"dispatch = "async""#).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_nul_in_worker_name_rejected() {
        let err = GraphConfig::from_toml(r#"worker_thread_name = "x\u0000y""#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "worker_thread_name",
                ..
            }
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("graph.toml");

        let config = GraphConfig {
            dispatch: DispatchMode::Inline,
            log_filter: Some("hkgraph_core=trace".into()),
            ..GraphConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = GraphConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_none_filter_not_written() {
        let text = GraphConfig::default().to_toml().unwrap();
        assert!(!text.contains("log_filter"));
        assert!(text.contains(r#"dispatch = "worker""#));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = GraphConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));

        let config = GraphConfig::load_or_default(&path).unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn test_build_graph() {
        let config = GraphConfig {
            dispatch: DispatchMode::Inline,
            notify_additions: true,
            worker_thread_name: "w".into(),
            log_filter: None,
        };
        let options = config.to_options();
        assert_eq!(options.mode, DispatchMode::Inline);
        assert!(options.notify_additions);
        assert_eq!(options.worker_thread_name, "w");

        let graph = config.build_graph();
        assert_eq!(graph.dispatch_mode(), DispatchMode::Inline);
        assert_eq!(graph.node_count(), 0);
    }
}
