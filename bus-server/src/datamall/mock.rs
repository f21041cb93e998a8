//! Mock DataMall client for testing without API access.
//!
//! Serves stops, routes, arrivals and alerts from memory, optionally loaded
//! from a directory of JSON files shaped like the live responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::de::DeserializeOwned;

use crate::domain::StopCode;

use super::error::{DataMallError, ErrorKind};
use super::types::{
    BusArrivalResponse, BusRouteRecord, BusStopRecord, Page, TrainAlertResponse, TrainAlertValue,
};
use super::{DataMallApi, PAGE_SIZE};

#[derive(Debug, Default)]
struct CallCounts {
    stop_pages: AtomicUsize,
    route_pages: AtomicUsize,
    arrivals: AtomicUsize,
    alerts: AtomicUsize,
}

/// Mock DataMall client.
///
/// Listing endpoints are paged exactly like DataMall: `PAGE_SIZE` records per
/// call, then an empty page. Calls are counted so tests can assert on them.
#[derive(Debug, Clone, Default)]
pub struct MockDataMall {
    stops: Arc<Vec<BusStopRecord>>,
    routes: Arc<Vec<BusRouteRecord>>,
    arrivals: Arc<HashMap<StopCode, BusArrivalResponse>>,
    alerts: Option<Arc<TrainAlertResponse>>,
    /// `BusStops` pages at or beyond this offset fail with the given kind.
    fail_stops_from: Option<(usize, ErrorKind)>,
    /// Same for `BusRoutes`.
    fail_routes_from: Option<(usize, ErrorKind)>,
    /// Every arrival and alert call fails with the given kind.
    fail_live: Option<ErrorKind>,
    calls: Arc<CallCounts>,
}

impl MockDataMall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load mock data from a directory.
    ///
    /// Expects `bus_stops.json` and `bus_routes.json` (shaped like a listing
    /// page), `train_alerts.json`, and `arrivals/{code}.json` per stop. Any
    /// missing file yields empty data.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, DataMallError> {
        let data_dir = data_dir.as_ref();
        if !data_dir.is_dir() {
            return Err(DataMallError::Api {
                status: 0,
                message: format!("Mock data directory not found: {:?}", data_dir),
            });
        }

        let stops: Option<Page<BusStopRecord>> = read_json(&data_dir.join("bus_stops.json"))?;
        let routes: Option<Page<BusRouteRecord>> = read_json(&data_dir.join("bus_routes.json"))?;
        let alerts: Option<TrainAlertResponse> = read_json(&data_dir.join("train_alerts.json"))?;

        let mut arrivals = HashMap::new();
        let arrivals_dir = data_dir.join("arrivals");
        if arrivals_dir.is_dir() {
            let entries = std::fs::read_dir(&arrivals_dir).map_err(|e| DataMallError::Api {
                status: 0,
                message: format!("Failed to read {:?}: {}", arrivals_dir, e),
            })?;

            for entry in entries {
                let entry = entry.map_err(|e| DataMallError::Api {
                    status: 0,
                    message: format!("Failed to read directory entry: {}", e),
                })?;

                let path = entry.path();
                if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                    continue;
                }

                // "01012.json" -> "01012"
                let stop = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| StopCode::parse(s).ok())
                    .ok_or_else(|| DataMallError::Api {
                        status: 0,
                        message: format!("Invalid stop code in filename: {:?}", path),
                    })?;

                if let Some(response) = read_json::<BusArrivalResponse>(&path)? {
                    arrivals.insert(stop, response);
                }
            }
        }

        Ok(Self {
            stops: Arc::new(stops.map(|p| p.value).unwrap_or_default()),
            routes: Arc::new(routes.map(|p| p.value).unwrap_or_default()),
            arrivals: Arc::new(arrivals),
            alerts: alerts.map(Arc::new),
            ..Self::default()
        })
    }

    pub fn with_stops(mut self, stops: Vec<BusStopRecord>) -> Self {
        self.stops = Arc::new(stops);
        self
    }

    pub fn with_routes(mut self, routes: Vec<BusRouteRecord>) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    pub fn with_arrivals(mut self, stop: StopCode, response: BusArrivalResponse) -> Self {
        Arc::make_mut(&mut self.arrivals).insert(stop, response);
        self
    }

    pub fn with_alerts(mut self, alerts: TrainAlertResponse) -> Self {
        self.alerts = Some(Arc::new(alerts));
        self
    }

    /// Make pages of both listings starting at `skip` or later fail.
    pub fn failing_pages_from(self, skip: usize, kind: ErrorKind) -> Self {
        self.failing_stop_pages_from(skip, kind)
            .failing_route_pages_from(skip, kind)
    }

    /// Make `BusStops` pages starting at `skip` or later fail.
    pub fn failing_stop_pages_from(mut self, skip: usize, kind: ErrorKind) -> Self {
        self.fail_stops_from = Some((skip, kind));
        self
    }

    /// Make `BusRoutes` pages starting at `skip` or later fail.
    pub fn failing_route_pages_from(mut self, skip: usize, kind: ErrorKind) -> Self {
        self.fail_routes_from = Some((skip, kind));
        self
    }

    /// Make arrival and alert calls fail.
    pub fn failing_live(mut self, kind: ErrorKind) -> Self {
        self.fail_live = Some(kind);
        self
    }

    pub fn stop_page_calls(&self) -> usize {
        self.calls.stop_pages.load(Ordering::SeqCst)
    }

    pub fn route_page_calls(&self) -> usize {
        self.calls.route_pages.load(Ordering::SeqCst)
    }

    pub fn arrival_calls(&self) -> usize {
        self.calls.arrivals.load(Ordering::SeqCst)
    }

    pub fn alert_calls(&self) -> usize {
        self.calls.alerts.load(Ordering::SeqCst)
    }
}

impl DataMallApi for MockDataMall {
    async fn bus_stops_page(&self, skip: usize) -> Result<Vec<BusStopRecord>, DataMallError> {
        self.calls.stop_pages.fetch_add(1, Ordering::SeqCst);
        page(&self.stops, skip, self.fail_stops_from)
    }

    async fn bus_routes_page(&self, skip: usize) -> Result<Vec<BusRouteRecord>, DataMallError> {
        self.calls.route_pages.fetch_add(1, Ordering::SeqCst);
        page(&self.routes, skip, self.fail_routes_from)
    }

    async fn bus_arrivals(&self, stop: StopCode) -> Result<BusArrivalResponse, DataMallError> {
        self.calls.arrivals.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.fail_live {
            return Err(injected_error(kind));
        }

        // DataMall answers unknown stops with an empty service list
        Ok(self
            .arrivals
            .get(&stop)
            .cloned()
            .unwrap_or_else(|| BusArrivalResponse {
                bus_stop_code: stop.to_string(),
                services: Vec::new(),
            }))
    }

    async fn train_alerts(&self) -> Result<TrainAlertResponse, DataMallError> {
        self.calls.alerts.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.fail_live {
            return Err(injected_error(kind));
        }

        Ok(self
            .alerts
            .as_deref()
            .cloned()
            .unwrap_or(TrainAlertResponse {
                value: TrainAlertValue {
                    status: 1,
                    affected_segments: Vec::new(),
                },
            }))
    }
}

/// One listing page, the way DataMall slices it.
fn page<T: Clone>(
    records: &[T],
    skip: usize,
    fail_from: Option<(usize, ErrorKind)>,
) -> Result<Vec<T>, DataMallError> {
    if let Some((fail_skip, kind)) = fail_from
        && skip >= fail_skip
    {
        return Err(injected_error(kind));
    }

    let start = skip.min(records.len());
    let end = (skip + PAGE_SIZE).min(records.len());
    Ok(records[start..end].to_vec())
}

fn injected_error(kind: ErrorKind) -> DataMallError {
    match kind {
        ErrorKind::Transport => DataMallError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        },
        ErrorKind::Parse => {
            let body = "<html>upstream error</html>";
            match serde_json::from_str::<serde_json::Value>(body) {
                Err(e) => DataMallError::json(e, body),
                Ok(_) => DataMallError::Json {
                    message: "unexpected body".to_string(),
                    body: Some(body.to_string()),
                },
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DataMallError> {
    if !path.exists() {
        return Ok(None);
    }

    let json = std::fs::read_to_string(path).map_err(|e| DataMallError::Api {
        status: 0,
        message: format!("Failed to read {:?}: {}", path, e),
    })?;

    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| DataMallError::json(e, &json))
}
