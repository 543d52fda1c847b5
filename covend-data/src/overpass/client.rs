//! Road network service backed by the Overpass API.
//!
//! [`OverpassRoadNetwork`] sends an Overpass QL `around:` query for the
//! `highway` ways near a point, together with their nodes, and assembles
//! the routable graph from the JSON answer.
//!
//! # Architecture
//!
//! The [`RoadNetworkService`] trait is synchronous so the core library stays
//! embeddable in synchronous contexts. This service bridges the async HTTP
//! call to the sync interface by blocking on a Tokio runtime it owns.

use std::time::Duration;

use covend_core::{Quota, RoadGraph, RoadNetworkError, RoadNetworkService};
use geo::Coord;
use log::{debug, info};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::response::InterpreterResponse;
use crate::osm::SearchArea;

/// Error type for [`OverpassRoadNetwork`] construction failures.
#[derive(Debug, Error)]
pub enum OverpassBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Public Overpass API endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api";

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "covend-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`OverpassRoadNetwork`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassConfig {
    /// Base URL of the Overpass API, without the `/interpreter` suffix.
    pub base_url: String,
    /// Request timeout, also sent to the server as the query timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OVERPASS_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OverpassConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Drive graph fetched from an Overpass API instance.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the service blocks on its own stored runtime.
/// Inside a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which may deadlock if the caller's runtime
/// drives IO this request depends on.
pub struct OverpassRoadNetwork {
    client: Client,
    config: OverpassConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OverpassRoadNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassRoadNetwork")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OverpassRoadNetwork {
    /// Create a service with default settings against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, OverpassBuildError> {
        Self::with_config(OverpassConfig::new(base_url))
    }

    /// Create a service with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OverpassConfig) -> Result<Self, OverpassBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(OverpassBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(OverpassBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OverpassConfig {
        &self.config
    }

    fn interpreter_url(&self) -> String {
        format!("{}/interpreter", self.config.base_url.trim_end_matches('/'))
    }

    /// Overpass QL for every highway way around the centre plus its nodes.
    fn build_query(&self, area: &SearchArea) -> String {
        let center = area.center();
        format!(
            "[out:json][timeout:{}];way[\"highway\"](around:{},{},{});(._;>;);out body;",
            self.config.timeout.as_secs().max(1),
            area.radius_m(),
            center.y,
            center.x
        )
    }

    async fn fetch_async(&self, area: &SearchArea) -> Result<InterpreterResponse, RoadNetworkError> {
        let url = self.interpreter_url();
        let query = self.build_query(area);

        let response = self
            .client
            .post(&url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|err| self.unavailable(&err, &url))?
            .error_for_status()
            .map_err(|err| self.unavailable(&err, &url))?;

        response
            .json::<InterpreterResponse>()
            .await
            .map_err(|err| RoadNetworkError::NetworkUnavailable {
                message: format!("malformed Overpass response from {url}: {err}"),
            })
    }

    fn unavailable(&self, error: &reqwest::Error, url: &str) -> RoadNetworkError {
        let message = if error.is_timeout() {
            format!(
                "Overpass request to {url} timed out after {}s",
                self.config.timeout.as_secs()
            )
        } else if let Some(status) = error.status() {
            format!("Overpass at {url} answered HTTP {}", status.as_u16())
        } else {
            format!("Overpass request to {url} failed: {error}")
        };
        RoadNetworkError::NetworkUnavailable { message }
    }

    fn fetch(&self, area: &SearchArea) -> Result<InterpreterResponse, RoadNetworkError> {
        let future = self.fetch_async(area);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl RoadNetworkService for OverpassRoadNetwork {
    fn build_graph(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError> {
        let area = SearchArea::new(center, radius_m)?;
        if quota.is_reached() {
            return Err(RoadNetworkError::Cancelled);
        }
        info!(
            "fetching road network within {radius_m}m of ({}, {}) from {}",
            center.y, center.x, self.config.base_url
        );
        let response = self.fetch(&area)?;
        if let Some(remark) = response.runtime_error() {
            return Err(RoadNetworkError::NetworkUnavailable {
                message: format!("Overpass runtime error: {remark}"),
            });
        }
        let extract = response.into_extract();
        debug!(
            "Overpass returned {} nodes and {} routable ways",
            extract.node_count(),
            extract.way_count()
        );
        extract.into_graph(&area, quota)
    }
}
