//! Shell configuration
//!
//! Configuration is a camelCase JSON document. Every field is optional and a
//! missing file yields the defaults.
//!
//! ```json
//! {
//!   "initialRoute": "/orders",
//!   "accessDeniedMessage": "Acesso negado",
//!   "seedDemoData": true,
//!   "logFilter": "info,app_ui=debug"
//! }
//! ```

use app_ui::{Route, RouteParams, RouteState, Router, ShellOptions};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The file is not valid configuration JSON
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    /// Route shown at startup: a path (`/orders/7`) or a route name (`orders`)
    pub initial_route: String,
    /// Toast text for routes the user's role may not open
    pub access_denied_message: String,
    /// Register the demo accounts at startup
    pub seed_demo_data: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            initial_route: "home".to_string(),
            access_denied_message: ShellOptions::default().access_denied_message,
            seed_demo_data: true,
            log_filter: "info".to_string(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Options for the shell
    pub fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            access_denied_message: self.access_denied_message.clone(),
        }
    }

    /// Router state for `initial_route`
    pub fn initial_route_state(&self, router: &Router) -> RouteState {
        let (route, params) = if self.initial_route.starts_with('/') {
            router.match_path(&self.initial_route)
        } else {
            (Route::from_name(&self.initial_route), RouteParams::new())
        };
        RouteState::new(route, params)
    }
}
