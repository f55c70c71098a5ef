// src/api_client.rs
//
// HTTP adapter for the dashboard backend. One typed fetch per endpoint,
// one tagged error per failure mode. Every call completes boundedly: the
// client carries the configured timeout, so the scheduler never waits on
// a hung request. Nothing here panics on a bad response — callers get a
// Result and decide what a failed cycle means.

use crate::types::{
    AnalyticsSnapshot, LaneSignalState, PerLane, ServerConfig,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub const TRAFFIC_DATA_PATH: &str = "/api/traffic-data";
pub const TRAFFIC_STATES_PATH: &str = "/traffic_states";
pub const VEHICLE_COUNTS_PATH: &str = "/vehicle_counts";
pub const AMBULANCE_STATUS_PATH: &str = "/ambulance_status";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network unreachable, connection refused, timeout, or a failed body
    /// read. The request never produced a usable response.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// The body arrived but is not the JSON shape this endpoint promises.
    #[error("malformed payload: {0}")]
    Decode(#[source] serde_json::Error),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ServerConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Analytics aggregate: sample window, vehicle-type breakdown, and the
    /// confusion matrix, all from one poll cycle.
    pub async fn fetch_analytics(&self) -> Result<AnalyticsSnapshot, FetchError> {
        self.get_json(TRAFFIC_DATA_PATH).await
    }

    pub async fn fetch_traffic_states(&self) -> Result<PerLane<LaneSignalState>, FetchError> {
        let keyed: BTreeMap<String, LaneSignalState> = self.get_json(TRAFFIC_STATES_PATH).await?;
        Ok(PerLane::from_keyed(keyed))
    }

    pub async fn fetch_vehicle_counts(&self) -> Result<PerLane<u32>, FetchError> {
        let keyed: BTreeMap<String, u32> = self.get_json(VEHICLE_COUNTS_PATH).await?;
        Ok(PerLane::from_keyed(keyed))
    }

    pub async fn fetch_ambulance_status(&self) -> Result<PerLane<bool>, FetchError> {
        let keyed: BTreeMap<String, bool> = self.get_json(AMBULANCE_STATUS_PATH).await?;
        Ok(PerLane::from_keyed(keyed))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = resp.text().await.map_err(FetchError::Transport)?;
        decode_payload(&body)
    }
}

/// Decode a response body, tagging failures as `Decode`. Split out from the
/// request path so the decode half of the taxonomy is testable offline.
pub(crate) fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(FetchError::Decode)
}
