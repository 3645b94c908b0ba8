//! Runtime configuration for the routing client and the coordinator.
//!
//! # Environment Variables
//!
//! - `WAYMAP_API_URL`: base URL of the routing service (default `http://localhost:8000`)
//! - `WAYMAP_REQUEST_TIMEOUT_SECS`: request timeout in seconds (unset: wait indefinitely)

use std::env;
use std::time::Duration;

use serde::Serialize;

use crate::client::SearchStrategy;
use crate::error::{Error, Result};

pub const API_URL_ENV: &str = "WAYMAP_API_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "WAYMAP_REQUEST_TIMEOUT_SECS";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Highway tags requested when loading the road network.
pub const ACCEPTED_ROAD_TYPES: &[&str] = &[
    "residential",
    "unclassified",
    "track",
    "service",
    "tertiary",
    "road",
    "secondary",
    "primary",
    "trunk",
    "primary_link",
    "trunk_link",
    "tertiary_link",
    "secondary_link",
    "highway",
];

/// Owned copy of [`ACCEPTED_ROAD_TYPES`].
pub fn default_road_tags() -> Vec<String> {
    ACCEPTED_ROAD_TYPES.iter().map(|tag| tag.to_string()).collect()
}

/// Connection settings for the routing service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` leaves requests pending until the service answers.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            user_agent: format!("waymap-lib/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config = config.with_base_url(url);
            }
        }

        if let Ok(raw) = env::var(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| Error::InvalidConfig {
                message: format!("{REQUEST_TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Absolute URL for an endpoint path such as `/paths_bfs`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Tunables for the interaction coordinator.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorConfig {
    /// Above this many in-view nodes the node layer is clustered.
    pub node_cluster_threshold: usize,
    /// Cells per viewport side when clustering.
    pub cluster_grid: usize,
    /// Make every path of a fresh result set visible on arrival.
    pub reveal_new_paths: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            node_cluster_threshold: 5_000,
            cluster_grid: 64,
            reveal_new_paths: true,
        }
    }
}

/// User-editable parameters of the next route request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteSettings {
    /// Desired route length in meters.
    pub target_distance: f64,
    /// Number of candidate routes to ask for.
    pub amount: u32,
    pub strategy: SearchStrategy,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            target_distance: 1_000.0,
            amount: 3,
            strategy: SearchStrategy::BreadthFirst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let config = ClientConfig::default().with_base_url("http://example.test:8000/");
        assert_eq!(
            config.endpoint_url("/ways_by_tags"),
            "http://example.test:8000/ways_by_tags"
        );
        assert_eq!(
            config.endpoint_url("paths_dfs"),
            "http://example.test:8000/paths_dfs"
        );
    }

    #[test]
    fn default_client_has_no_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn road_tags_cover_main_highway_classes() {
        let tags = default_road_tags();
        assert_eq!(tags.len(), 14);
        assert!(tags.iter().any(|tag| tag == "residential"));
        assert!(tags.iter().any(|tag| tag == "trunk_link"));
    }

    #[test]
    fn route_settings_default() {
        let settings = RouteSettings::default();
        assert_eq!(settings.amount, 3);
        assert_eq!(settings.strategy, SearchStrategy::BreadthFirst);
    }
}
