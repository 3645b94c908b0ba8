//! HTTP client for the remote routing service.
//!
//! The service exposes one endpoint for the road network and one endpoint per
//! search strategy. Every call here is a single blocking request: there is no
//! retry and no de-duplication, and the caller decides which thread waits on it.

use std::fmt;
use std::str::FromStr;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::model::{Marker, Path, Way};

const WAYS_ENDPOINT: &str = "/ways_by_tags";

/// Route search strategies offered by the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Breadth-first search.
    #[default]
    BreadthFirst,
    /// Depth-first search.
    DepthFirst,
    /// Dijkstra variant steering towards a target distance.
    DistanceTargeted,
}

impl SearchStrategy {
    pub const ALL: [SearchStrategy; 3] = [
        SearchStrategy::BreadthFirst,
        SearchStrategy::DepthFirst,
        SearchStrategy::DistanceTargeted,
    ];

    /// Endpoint path serving this strategy.
    pub fn endpoint(self) -> &'static str {
        match self {
            SearchStrategy::BreadthFirst => "/paths_bfs",
            SearchStrategy::DepthFirst => "/paths_dfs",
            SearchStrategy::DistanceTargeted => "/paths_special_dijkstra",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchStrategy::BreadthFirst => "breadth_first",
            SearchStrategy::DepthFirst => "depth_first",
            SearchStrategy::DistanceTargeted => "distance_targeted",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "breadth_first" | "bfs" => Ok(SearchStrategy::BreadthFirst),
            "depth_first" | "dfs" => Ok(SearchStrategy::DepthFirst),
            "distance_targeted" | "dijkstra" | "special_dijkstra" => {
                Ok(SearchStrategy::DistanceTargeted)
            }
            other => Err(Error::InvalidConfig {
                message: format!("unknown search strategy {other:?}"),
            }),
        }
    }
}

/// Body of a path request, in the service's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathQuery {
    pub start_lat: f64,
    pub start_lon: f64,
    pub goal_lat: f64,
    pub goal_lon: f64,
    pub target_distance: f64,
    pub amount: u32,
}

impl PathQuery {
    pub fn new(start: Marker, goal: Marker, target_distance: f64, amount: u32) -> Self {
        Self {
            start_lat: start.lat,
            start_lon: start.lon,
            goal_lat: goal.lat,
            goal_lon: goal.lon,
            target_distance,
            amount,
        }
    }

    pub fn start(&self) -> Marker {
        Marker::new(self.start_lat, self.start_lon)
    }

    pub fn goal(&self) -> Marker {
        Marker::new(self.goal_lat, self.goal_lon)
    }
}

#[derive(Debug, Serialize)]
struct TagsRequest<'a> {
    tags: &'a [String],
}

/// Remote operations the engine depends on.
pub trait RoutingBackend {
    /// Fetch every way whose highway tag is in `tags`.
    fn fetch_ways(&self, tags: &[String]) -> Result<Vec<Way>>;

    /// Ask `strategy` for candidate paths.
    fn fetch_paths(&self, strategy: SearchStrategy, query: &PathQuery) -> Result<Vec<Path>>;
}

impl<B: RoutingBackend + ?Sized> RoutingBackend for &B {
    fn fetch_ways(&self, tags: &[String]) -> Result<Vec<Way>> {
        (**self).fetch_ways(tags)
    }

    fn fetch_paths(&self, strategy: SearchStrategy, query: &PathQuery) -> Result<Vec<Path>> {
        (**self).fetch_paths(strategy, query)
    }
}

/// [`RoutingBackend`] talking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint_url(endpoint);
        debug!(url = %url, "sending request");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "routing service rejected request");
            return Err(Error::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                reason: Some(text).filter(|t| !t.trim().is_empty()),
            });
        }

        serde_json::from_str(&text).map_err(|source| Error::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

impl RoutingBackend for HttpBackend {
    fn fetch_ways(&self, tags: &[String]) -> Result<Vec<Way>> {
        self.post_json(WAYS_ENDPOINT, &TagsRequest { tags })
    }

    fn fetch_paths(&self, strategy: SearchStrategy, query: &PathQuery) -> Result<Vec<Path>> {
        self.post_json(strategy.endpoint(), query)
    }
}

fn build_client(config: &ClientConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(Error::Http)
}
