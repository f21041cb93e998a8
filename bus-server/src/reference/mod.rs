//! Reference data: bus stops and route schedules.
//!
//! Both tables are built by paging through DataMall listing endpoints and
//! are rebuilt wholesale when the long-lived cache expires.

mod fetch;
mod routes;
mod stops;

use futures::future::join;

pub use fetch::{Paged, paginate};
pub use routes::{RouteSchedules, fetch_routes};
pub use stops::{BusStop, BusStops, fetch_stops};

use crate::datamall::{DataMallApi, Fetched};

/// The two lookup tables the stop board needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceData {
    pub stops: BusStops,
    pub routes: RouteSchedules,
    /// Every `BusStops` page was fetched.
    pub stops_complete: bool,
    /// Every `BusRoutes` page was fetched.
    pub routes_complete: bool,
}

impl ReferenceData {
    pub fn is_complete(&self) -> bool {
        self.stops_complete && self.routes_complete
    }
}

/// Fetch stops and routes concurrently.
///
/// If either listing fails part-way, the partial tables are returned with
/// the first error encountered (stops before routes). Each table records
/// whether its own listing finished.
pub async fn load_reference_data<A: DataMallApi>(api: &A) -> Fetched<ReferenceData> {
    let (stops, routes) = join(fetch_stops(api), fetch_routes(api)).await;

    let data = ReferenceData {
        stops_complete: stops.is_complete(),
        routes_complete: routes.is_complete(),
        stops: stops.data,
        routes: routes.data,
    };

    match stops.error.or(routes.error) {
        Some(e) => Fetched::partial(data, e),
        None => Fetched::complete(data),
    }
}
