//! DataMall HTTP client.
//!
//! Provides async methods for querying the LTA DataMall API. Handles
//! authentication, timeouts, and status/JSON error mapping.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::StopCode;

use super::DataMallApi;
use super::error::DataMallError;
use super::types::{BusArrivalResponse, BusRouteRecord, BusStopRecord, Page, TrainAlertResponse};

/// Default base URL for the DataMall API.
const DEFAULT_BASE_URL: &str = "http://datamall2.mytransport.sg/ltaodataservice";

/// Default time allowed to establish a connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed between reads of the response.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the DataMall client.
#[derive(Debug, Clone)]
pub struct DataMallConfig {
    /// AccountKey issued by DataMall
    pub account_key: String,
    /// Base URL for the API (defaults to production DataMall)
    pub base_url: String,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Read timeout
    pub read_timeout: Duration,
}

impl DataMallConfig {
    /// Create a new config with the given AccountKey.
    pub fn new(account_key: impl Into<String>) -> Self {
        Self {
            account_key: account_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set connect and read timeouts.
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }
}

/// DataMall API client.
#[derive(Debug, Clone)]
pub struct DataMallClient {
    http: reqwest::Client,
    base_url: String,
}

impl DataMallClient {
    /// Create a new DataMall client with the given configuration.
    pub fn new(config: DataMallConfig) -> Result<Self, DataMallError> {
        let mut headers = HeaderMap::new();

        // DataMall authenticates with an "AccountKey" header
        let account_key =
            HeaderValue::from_str(&config.account_key).map_err(|_| DataMallError::Api {
                status: 0,
                message: "Invalid AccountKey format".to_string(),
            })?;
        headers.insert(HeaderName::from_static("accountkey"), account_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// GET `{base_url}/{path}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataMallError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, ?query, "DataMall request");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DataMallError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataMallError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| DataMallError::json(e, &body))
    }
}

impl DataMallApi for DataMallClient {
    async fn bus_stops_page(&self, skip: usize) -> Result<Vec<BusStopRecord>, DataMallError> {
        let page: Page<BusStopRecord> = self
            .get_json("BusStops", &[("$skip", skip.to_string())])
            .await?;
        Ok(page.value)
    }

    async fn bus_routes_page(&self, skip: usize) -> Result<Vec<BusRouteRecord>, DataMallError> {
        let page: Page<BusRouteRecord> = self
            .get_json("BusRoutes", &[("$skip", skip.to_string())])
            .await?;
        Ok(page.value)
    }

    async fn bus_arrivals(&self, stop: StopCode) -> Result<BusArrivalResponse, DataMallError> {
        self.get_json("BusArrivalv2", &[("BusStopCode", stop.to_string())])
            .await
    }

    async fn train_alerts(&self) -> Result<TrainAlertResponse, DataMallError> {
        self.get_json("TrainServiceAlerts", &[]).await
    }
}
