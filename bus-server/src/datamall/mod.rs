//! LTA DataMall client.
//!
//! This module provides an HTTP client for the DataMall open-data API,
//! which serves bus stops, bus routes, live bus arrivals, and train
//! service alerts.
//!
//! Key characteristics of DataMall:
//! - Listing endpoints return at most 500 records per call and are paged
//!   with a `$skip` offset; an empty `value` array marks the end
//! - Arrival estimates are ISO-8601 timestamps with a `+08:00` offset
//! - Empty strings stand in for missing values

mod client;
mod error;
mod mock;
mod types;

use std::future::Future;

pub use client::{DataMallClient, DataMallConfig};
pub use error::{DataMallError, ErrorKind};
pub use mock::MockDataMall;
pub use types::{
    AffectedSegment, BusArrivalResponse, BusRouteRecord, BusStopRecord, NextBusDto, Page,
    ServiceArrivalDto, TrainAlertResponse, TrainAlertValue,
};

use crate::domain::StopCode;

/// Number of records DataMall returns per page of a listing endpoint.
pub const PAGE_SIZE: usize = 500;

/// The DataMall operations this service depends on.
///
/// Implemented by the live [`DataMallClient`] and by [`MockDataMall`].
pub trait DataMallApi: Send + Sync {
    /// One page of the `BusStops` listing starting at `skip`.
    fn bus_stops_page(
        &self,
        skip: usize,
    ) -> impl Future<Output = Result<Vec<BusStopRecord>, DataMallError>> + Send;

    /// One page of the `BusRoutes` listing starting at `skip`.
    fn bus_routes_page(
        &self,
        skip: usize,
    ) -> impl Future<Output = Result<Vec<BusRouteRecord>, DataMallError>> + Send;

    /// Live arrivals at a stop.
    fn bus_arrivals(
        &self,
        stop: StopCode,
    ) -> impl Future<Output = Result<BusArrivalResponse, DataMallError>> + Send;

    /// Current train service status.
    fn train_alerts(&self) -> impl Future<Output = Result<TrainAlertResponse, DataMallError>> + Send;
}

/// A result that may be partial.
///
/// `error` is set when the operation was cut short; `data` then holds
/// whatever was gathered before the failure.
#[derive(Debug)]
pub struct Fetched<T> {
    pub data: T,
    pub error: Option<DataMallError>,
}

impl<T> Fetched<T> {
    pub fn complete(data: T) -> Self {
        Self { data, error: None }
    }

    pub fn partial(data: T, error: DataMallError) -> Self {
        Self {
            data,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            error: self.error,
        }
    }
}
