//! Stop board: everything shown for one stop code.
//!
//! Validates the requested code, looks the stop up in the reference data,
//! fetches and transforms live arrivals, and falls back to the operating
//! schedule for services without a live estimate.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::arrivals::{ArrivalError, BusEstimate, Crowding, DeckType, ServiceArrivals, transform};
use crate::cache::CachedDataMall;
use crate::datamall::{DataMallApi, DataMallError, ErrorKind};
use crate::domain::{InvalidStopCode, StopCode};
use crate::operating::is_operating;
use crate::reference::{BusStop, ReferenceData};

/// Shown for any upstream or parse failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, an error occurred. Please try again.";

/// Shown when the input is not exactly 5 digits.
pub const INVALID_STOP_MESSAGE: &str = "Please provide a 5 digit bus stop code.";

/// Shown when the code is well-formed but no such stop exists.
pub const STOP_NOT_FOUND_MESSAGE: &str = "Bus stop not found. Please try again.";

/// Per-request inputs that would otherwise be ambient.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// The instant the request is evaluated at, in local transit time.
    pub now: DateTime<FixedOffset>,
}

impl RequestContext {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// A context for the current instant in the given offset.
    pub fn now_in(offset: FixedOffset) -> Self {
        Self::new(Utc::now().with_timezone(&offset))
    }
}

/// Why a stop board could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidStopCode(#[from] InvalidStopCode),

    #[error("bus stop {0} not found")]
    StopNotFound(StopCode),

    #[error("upstream error: {0}")]
    Upstream(#[from] DataMallError),

    #[error("arrival data error: {0}")]
    Arrival(#[from] ArrivalError),
}

impl LookupError {
    /// The message to show the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::InvalidStopCode(_) => INVALID_STOP_MESSAGE,
            LookupError::StopNotFound(_) => STOP_NOT_FOUND_MESSAGE,
            LookupError::Upstream(_) | LookupError::Arrival(_) => GENERIC_ERROR_MESSAGE,
        }
    }

    /// Transport/parse kind for upstream failures; `None` for problems with
    /// the request itself.
    pub fn upstream_kind(&self) -> Option<ErrorKind> {
        match self {
            LookupError::Upstream(e) => Some(e.kind()),
            LookupError::Arrival(_) => Some(ErrorKind::Parse),
            _ => None,
        }
    }
}

/// What to say about one upcoming bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "minutes", rename_all = "snake_case")]
pub enum BusStatus {
    ArrivingNow,
    Missed,
    Minutes(i64),
}

impl BusStatus {
    pub fn from_minutes(minutes: i64) -> Self {
        match minutes {
            0 => BusStatus::ArrivingNow,
            m if m < 0 => BusStatus::Missed,
            m => BusStatus::Minutes(m),
        }
    }
}

/// One upcoming bus line in a service panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusLine {
    pub status: BusStatus,
    pub deck: DeckType,
    pub load: Crowding,
}

impl BusLine {
    fn from_estimate(estimate: &BusEstimate) -> Self {
        Self {
            status: BusStatus::from_minutes(estimate.minutes),
            deck: estimate.deck,
            load: estimate.load,
        }
    }

    pub fn message(&self) -> String {
        match self.status {
            BusStatus::ArrivingNow => {
                format!("Bus is here! {} {}", self.deck.label(), self.load.label())
            }
            BusStatus::Missed => "Oops, you just missed the bus.".to_string(),
            BusStatus::Minutes(m) => {
                format!("{} mins. {} {}", m, self.deck.label(), self.load.label())
            }
        }
    }
}

/// Headline status of a service at the stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "minutes", rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Next bus in this many minutes.
    Eta(i64),
    /// Scheduled to be running, but DataMall has no estimate.
    NoEstimate,
    /// Outside the service's operating window.
    NotInOperation,
}

impl ServiceStatus {
    pub fn summary(&self) -> String {
        match self {
            ServiceStatus::Eta(0) => "arriving now".to_string(),
            ServiceStatus::Eta(m) => format!("in {} mins", m),
            ServiceStatus::NoEstimate => "no estimate available".to_string(),
            ServiceStatus::NotInOperation => "not in operation".to_string(),
        }
    }
}

/// One expandable service panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePanel {
    pub service_no: String,
    pub status: ServiceStatus,
    /// Buses with a live estimate; slots without one are left out.
    pub buses: Vec<BusLine>,
}

/// The board for one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopBoard {
    pub stop: BusStop,
    pub label: String,
    /// Panels ordered by next arrival, services without an ETA last.
    pub services: Vec<ServicePanel>,
    /// False when the reference tables could only be partially loaded.
    pub reference_complete: bool,
}

/// Status of a service with no live estimate.
///
/// A schedule that was never fetched says nothing about whether the service
/// runs, so it only rules a service out when the routes table is complete.
fn fallback_status(
    reference: &ReferenceData,
    service_no: &str,
    stop: &StopCode,
    ctx: &RequestContext,
) -> ServiceStatus {
    let routes = &reference.routes;
    if !reference.routes_complete && routes.get(service_no, stop).is_none() {
        return ServiceStatus::NoEstimate;
    }

    if is_operating(routes, service_no, stop, &ctx.now) {
        ServiceStatus::NoEstimate
    } else {
        ServiceStatus::NotInOperation
    }
}

/// Assemble the board from transformed arrivals.
pub fn build_board(
    stop: &BusStop,
    reference: &ReferenceData,
    arrivals: Vec<ServiceArrivals>,
    ctx: &RequestContext,
) -> StopBoard {
    let services = arrivals
        .into_iter()
        .map(|service| {
            let status = match service.first_eta() {
                Some(minutes) => ServiceStatus::Eta(minutes),
                None => fallback_status(reference, &service.service_no, &stop.code, ctx),
            };

            let buses = service
                .buses
                .iter()
                .flatten()
                .map(BusLine::from_estimate)
                .collect();

            ServicePanel {
                service_no: service.service_no,
                status,
                buses,
            }
        })
        .collect();

    StopBoard {
        stop: stop.clone(),
        label: stop.label(),
        services,
        reference_complete: reference.is_complete(),
    }
}

/// Produce the board for a user-entered stop code.
///
/// Input validation and the stop lookup happen before any arrival request.
pub async fn lookup<A: DataMallApi>(
    datamall: &CachedDataMall<A>,
    input: &str,
    ctx: &RequestContext,
) -> Result<StopBoard, LookupError> {
    let code = StopCode::parse_input(input)?;

    let reference = datamall.reference_data().await;

    let Some(stop) = reference.data.stops.get(&code) else {
        // A miss against a partial stops table may just be a stop we never got to
        return Err(match reference.error {
            Some(e) if !reference.data.stops_complete => LookupError::Upstream(e),
            _ => LookupError::StopNotFound(code),
        });
    };

    if let Some(e) = &reference.error {
        warn!(%code, error = %e, "Serving board from partial reference data");
    }

    let response = datamall.bus_arrivals(code).await?;
    let arrivals = transform(&response, ctx.now)?;
    debug!(%code, services = arrivals.len(), "Transformed arrivals");

    Ok(build_board(stop, &reference.data, arrivals, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::datamall::{
        BusArrivalResponse, BusRouteRecord, BusStopRecord, MockDataMall, NextBusDto,
        ServiceArrivalDto,
    };
    use chrono::{Duration, TimeZone};

    /// Friday 2024-03-15 at the given local time.
    fn friday(hour: u32, minute: u32) -> RequestContext {
        RequestContext::new(
            FixedOffset::east_opt(8 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 15, hour, minute, 0)
                .unwrap(),
        )
    }

    fn route(service: &str, first: &str, last: &str) -> BusRouteRecord {
        BusRouteRecord {
            service_no: service.to_string(),
            bus_stop_code: "01012".to_string(),
            wd_first_bus: first.to_string(),
            wd_last_bus: last.to_string(),
            sat_first_bus: first.to_string(),
            sat_last_bus: last.to_string(),
            sun_first_bus: first.to_string(),
            sun_last_bus: last.to_string(),
        }
    }

    fn slot(ctx: &RequestContext, offset: Option<Duration>) -> NextBusDto {
        offset
            .map(|d| NextBusDto {
                estimated_arrival: (ctx.now + d).to_rfc3339(),
                bus_type: "SD".to_string(),
                load: "SEA".to_string(),
            })
            .unwrap_or_default()
    }

    fn service(ctx: &RequestContext, no: &str, offsets: [Option<Duration>; 3]) -> ServiceArrivalDto {
        let [a, b, c] = offsets;
        ServiceArrivalDto {
            service_no: no.to_string(),
            operator: "SBST".to_string(),
            next_bus: slot(ctx, a),
            next_bus_2: slot(ctx, b),
            next_bus_3: slot(ctx, c),
        }
    }

    fn mock(ctx: &RequestContext) -> MockDataMall {
        let stop = StopCode::parse("01012").unwrap();
        MockDataMall::new()
            .with_stops(vec![BusStopRecord {
                bus_stop_code: "01012".to_string(),
                description: "HOTEL GRAND PACIFIC".to_string(),
                road_name: "Victoria St".to_string(),
            }])
            .with_routes(vec![
                route("15", "0500", "2300"),
                route("7", "0500", "2300"),
                route("NR1", "2330", "0230"),
            ])
            .with_arrivals(
                stop,
                BusArrivalResponse {
                    bus_stop_code: "01012".to_string(),
                    services: vec![
                        service(ctx, "NR1", [None, None, None]),
                        service(
                            ctx,
                            "15",
                            [
                                Some(Duration::seconds(-70)),
                                Some(Duration::seconds(190)),
                                None,
                            ],
                        ),
                        service(ctx, "7", [None, None, None]),
                        service(ctx, "12", [Some(Duration::seconds(10)), None, None]),
                    ],
                },
            )
    }

    fn cached(api: MockDataMall) -> CachedDataMall<MockDataMall> {
        CachedDataMall::new(api, &CacheConfig::default())
    }

    #[test]
    fn bus_status_boundaries() {
        assert_eq!(BusStatus::from_minutes(0), BusStatus::ArrivingNow);
        assert_eq!(BusStatus::from_minutes(-1), BusStatus::Missed);
        assert_eq!(BusStatus::from_minutes(4), BusStatus::Minutes(4));
    }

    #[test]
    fn bus_line_messages() {
        let line = |status| BusLine {
            status,
            deck: DeckType::Double,
            load: Crowding::StandingOnly,
        };
        assert_eq!(
            line(BusStatus::ArrivingNow).message(),
            "Bus is here! Double Deck with standing only."
        );
        assert_eq!(
            line(BusStatus::Missed).message(),
            "Oops, you just missed the bus."
        );
        assert_eq!(
            line(BusStatus::Minutes(3)).message(),
            "3 mins. Double Deck with standing only."
        );
    }

    #[test]
    fn service_summaries() {
        assert_eq!(ServiceStatus::Eta(0).summary(), "arriving now");
        assert_eq!(ServiceStatus::Eta(7).summary(), "in 7 mins");
        assert_eq!(ServiceStatus::NoEstimate.summary(), "no estimate available");
        assert_eq!(ServiceStatus::NotInOperation.summary(), "not in operation");
    }

    #[tokio::test]
    async fn builds_board_in_eta_order() {
        let ctx = friday(12, 0);
        let datamall = cached(mock(&ctx));

        let board = lookup(&datamall, "01012", &ctx).await.unwrap();

        assert_eq!(board.label, "Hotel Grand Pacific along Victoria St");
        assert!(board.reference_complete);

        let order: Vec<&str> = board.services.iter().map(|s| s.service_no.as_str()).collect();
        assert_eq!(order, vec!["12", "15", "NR1", "7"]);

        assert_eq!(board.services[0].status, ServiceStatus::Eta(0));
        assert_eq!(board.services[0].buses[0].status, BusStatus::ArrivingNow);

        // 15: first bus missed, second in 3 mins
        assert_eq!(board.services[1].status, ServiceStatus::Eta(3));
        assert_eq!(board.services[1].buses.len(), 2);
        assert_eq!(board.services[1].buses[0].status, BusStatus::Missed);
        assert_eq!(board.services[1].buses[1].status, BusStatus::Minutes(3));
    }

    #[tokio::test]
    async fn no_estimate_uses_operating_window() {
        let ctx = friday(12, 0);
        let datamall = cached(mock(&ctx));

        let board = lookup(&datamall, "01012", &ctx).await.unwrap();
        let status = |no: &str| {
            board
                .services
                .iter()
                .find(|s| s.service_no == no)
                .map(|s| s.status)
        };

        // 7 runs 0500-2300: no live estimate at noon
        assert_eq!(status("7"), Some(ServiceStatus::NoEstimate));
        // NR1 runs 2330-0230: asleep at noon
        assert_eq!(status("NR1"), Some(ServiceStatus::NotInOperation));
    }

    #[tokio::test]
    async fn night_service_after_midnight() {
        let ctx = friday(1, 0);
        let datamall = cached(mock(&ctx));

        let board = lookup(&datamall, "01012", &ctx).await.unwrap();
        let nr1 = board.services.iter().find(|s| s.service_no == "NR1").unwrap();
        let seven = board.services.iter().find(|s| s.service_no == "7").unwrap();

        assert_eq!(nr1.status, ServiceStatus::NoEstimate);
        assert_eq!(seven.status, ServiceStatus::NotInOperation);
    }

    #[tokio::test]
    async fn invalid_input_makes_no_calls() {
        let ctx = friday(12, 0);
        let datamall = cached(mock(&ctx));

        for input in ["", "1012", "010123", "0101A", "bus 7"] {
            let err = lookup(&datamall, input, &ctx).await.unwrap_err();
            assert!(matches!(err, LookupError::InvalidStopCode(_)));
            assert_eq!(err.user_message(), INVALID_STOP_MESSAGE);
            assert_eq!(err.upstream_kind(), None);
        }

        assert_eq!(datamall.api().stop_page_calls(), 0);
        assert_eq!(datamall.api().arrival_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_stop_skips_arrivals() {
        let ctx = friday(12, 0);
        let datamall = cached(mock(&ctx));

        let err = lookup(&datamall, "99999", &ctx).await.unwrap_err();

        assert!(matches!(err, LookupError::StopNotFound(_)));
        assert_eq!(err.user_message(), STOP_NOT_FOUND_MESSAGE);
        assert_eq!(datamall.api().arrival_calls(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_generic() {
        let ctx = friday(12, 0);
        let datamall = cached(mock(&ctx).failing_live(ErrorKind::Transport));

        let err = lookup(&datamall, "01012", &ctx).await.unwrap_err();

        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.upstream_kind(), Some(ErrorKind::Transport));
    }

    #[tokio::test]
    async fn miss_against_partial_reference_is_upstream_error() {
        let ctx = friday(12, 0);
        let datamall = cached(mock(&ctx).failing_pages_from(0, ErrorKind::Parse));

        let err = lookup(&datamall, "01012", &ctx).await.unwrap_err();

        assert!(matches!(err, LookupError::Upstream(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn miss_against_complete_stops_is_not_found() {
        let ctx = friday(12, 0);
        let api = mock(&ctx).failing_route_pages_from(0, ErrorKind::Transport);
        let datamall = cached(api);

        let err = lookup(&datamall, "99999", &ctx).await.unwrap_err();

        assert!(matches!(err, LookupError::StopNotFound(_)));
        assert_eq!(err.user_message(), STOP_NOT_FOUND_MESSAGE);
        assert_eq!(datamall.api().arrival_calls(), 0);
    }

    #[tokio::test]
    async fn missing_routes_never_claim_not_in_operation() {
        let ctx = friday(12, 0);
        let api = mock(&ctx).failing_route_pages_from(0, ErrorKind::Transport);
        let datamall = cached(api);

        let board = lookup(&datamall, "01012", &ctx).await.unwrap();
        let status = |no: &str| {
            board
                .services
                .iter()
                .find(|s| s.service_no == no)
                .map(|s| s.status)
        };

        assert!(!board.reference_complete);
        assert_eq!(status("12"), Some(ServiceStatus::Eta(0)));
        assert_eq!(status("15"), Some(ServiceStatus::Eta(3)));
        // NR1 would be asleep at noon, but its schedule was never fetched
        assert_eq!(status("NR1"), Some(ServiceStatus::NoEstimate));
        assert_eq!(status("7"), Some(ServiceStatus::NoEstimate));
    }

    #[tokio::test]
    async fn unknown_bus_type_is_generic_error() {
        let ctx = friday(12, 0);
        let stop = StopCode::parse("01012").unwrap();
        let mut bad = service(&ctx, "15", [Some(Duration::minutes(2)), None, None]);
        bad.next_bus.bus_type = "TD".to_string();
        let api = mock(&ctx).with_arrivals(
            stop,
            BusArrivalResponse {
                bus_stop_code: "01012".to_string(),
                services: vec![bad],
            },
        );
        let datamall = cached(api);

        let err = lookup(&datamall, "01012", &ctx).await.unwrap_err();

        assert!(matches!(err, LookupError::Arrival(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn input_whitespace_is_ignored() {
        let ctx = friday(12, 0);
        let datamall = cached(mock(&ctx));
        assert!(lookup(&datamall, " 01012 ", &ctx).await.is_ok());
    }
}
