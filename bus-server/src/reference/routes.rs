//! Per-service, per-stop operating windows.

use std::collections::HashMap;

use tracing::debug;

use crate::datamall::{BusRouteRecord, DataMallApi, Fetched};
use crate::domain::{OperatingWindow, StopCode, WeeklySchedule};

use super::fetch::paginate;

/// Service number → stop code → weekly schedule.
///
/// A service that calls at the same stop in both directions keeps the last
/// record seen for that stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSchedules {
    by_service: HashMap<String, HashMap<StopCode, WeeklySchedule>>,
}

impl RouteSchedules {
    pub fn from_records(records: impl IntoIterator<Item = BusRouteRecord>) -> Self {
        let mut by_service: HashMap<String, HashMap<StopCode, WeeklySchedule>> = HashMap::new();

        for r in records {
            let Ok(stop) = StopCode::parse(&r.bus_stop_code) else {
                debug!(service = %r.service_no, code = %r.bus_stop_code, "Skipping route record");
                continue;
            };

            let schedule = WeeklySchedule {
                weekday: OperatingWindow::new(r.wd_first_bus, r.wd_last_bus),
                saturday: OperatingWindow::new(r.sat_first_bus, r.sat_last_bus),
                sunday: OperatingWindow::new(r.sun_first_bus, r.sun_last_bus),
            };

            by_service
                .entry(r.service_no)
                .or_default()
                .insert(stop, schedule);
        }

        Self { by_service }
    }

    /// The schedule of `service_no` at `stop`, if the service calls there.
    pub fn get(&self, service_no: &str, stop: &StopCode) -> Option<&WeeklySchedule> {
        self.by_service.get(service_no)?.get(stop)
    }

    /// Number of distinct services.
    pub fn service_count(&self) -> usize {
        self.by_service.len()
    }

    /// Number of (service, stop) entries.
    pub fn len(&self) -> usize {
        self.by_service.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_service.is_empty()
    }
}

/// Fetch every bus route record from DataMall.
pub async fn fetch_routes<A: DataMallApi>(api: &A) -> Fetched<RouteSchedules> {
    paginate("BusRoutes", move |skip| api.bus_routes_page(skip))
        .await
        .map(|paged| RouteSchedules::from_records(paged.records))
}
