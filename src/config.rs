//! Configuration for the admission controller.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use chrono::NaiveTime;

use crate::error::{GatehouseError, Result};
use crate::request::{Method, Role};

/// Top-level admission policy configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Which requests are subject to admission control
    #[serde(default)]
    pub routes: RouteConfig,

    /// Sliding-window rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Allowed wall-clock interval, if any
    #[serde(default)]
    pub time_gate: Option<TimeGateConfig>,

    /// Role requirements for unsafe methods, if any
    #[serde(default)]
    pub role_gate: Option<RoleGateConfig>,
}

impl AdmissionConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading admission configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            GatehouseError::Config(format!("Failed to parse admission config: {}", e))
        })
    }
}

/// Routes the admission stages apply to.
///
/// A request is in scope when its method is in `methods` and its path
/// starts with one of `path_prefixes`. An empty list matches everything,
/// so two empty lists subject all traffic to the stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Methods subject to admission control
    #[serde(default = "default_methods")]
    pub methods: Vec<Method>,

    /// Path prefixes subject to admission control
    #[serde(default = "default_path_prefixes")]
    pub path_prefixes: Vec<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            path_prefixes: default_path_prefixes(),
        }
    }
}

fn default_methods() -> Vec<Method> {
    vec![Method::Post]
}

fn default_path_prefixes() -> Vec<String> {
    vec!["/api/messages".to_string(), "/chats".to_string()]
}

/// Sliding-window rate limit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per client within the window
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Sliding window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Tracked-client count above which fully expired windows are swept
    #[serde(default = "default_max_tracked_clients")]
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_seconds: default_window_seconds(),
            max_tracked_clients: default_max_tracked_clients(),
        }
    }
}

fn default_limit() -> usize {
    5
}

fn default_window_seconds() -> u64 {
    60
}

fn default_max_tracked_clients() -> usize {
    10_000
}

/// Inclusive wall-clock interval during which requests are admitted.
///
/// A gate whose `start` is later than its `end` spans midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeGateConfig {
    /// Start of the allowed interval, e.g. "18:00:00"
    pub start: NaiveTime,
    /// End of the allowed interval, inclusive, e.g. "21:00:00"
    pub end: NaiveTime,
}

/// Roles permitted to make unsafe requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGateConfig {
    /// Roles allowed through the gate
    #[serde(default = "default_allowed_roles")]
    pub allowed_roles: Vec<Role>,
}

impl Default for RoleGateConfig {
    fn default() -> Self {
        Self {
            allowed_roles: default_allowed_roles(),
        }
    }
}

fn default_allowed_roles() -> Vec<Role> {
    vec![Role::Admin]
}
