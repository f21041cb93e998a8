//! Operating-window checks.
//!
//! Decides whether a service should currently be running at a stop, which
//! separates "no estimate available" from "not in operation" when DataMall
//! has no live arrival for a service.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime};
use tracing::debug;

use crate::domain::{DayType, OperatingWindow, StopCode};
use crate::reference::RouteSchedules;

/// Whether `service_no` is operating at `stop` at `now`.
///
/// `now` is read in its own offset, so it should be in local transit time.
/// A service with no schedule at the stop, or with an unparseable window,
/// is not operating.
pub fn is_operating(
    routes: &RouteSchedules,
    service_no: &str,
    stop: &StopCode,
    now: &DateTime<FixedOffset>,
) -> bool {
    let Some(schedule) = routes.get(service_no, stop) else {
        debug!(service = service_no, %stop, "No schedule for service at stop");
        return false;
    };

    let day = DayType::from_weekday(now.weekday());
    window_is_open(schedule.window(day), now.time())
}

/// Whether `time` falls inside `window`.
///
/// Before the first bus, the window is only open if the last bus is
/// published as an early-morning hour (leading "0"), i.e. the previous
/// evening's service is still running, and `time` is before it. From the
/// first bus onwards, the window is open up to and including the last bus.
///
/// This is an approximation: a window such as 0600-0030 reads as closed at
/// 23:00, and a last bus of e.g. "0930" that does not cross midnight still
/// counts as after midnight.
pub fn window_is_open(window: &OperatingWindow, time: NaiveTime) -> bool {
    let (Ok(first), Ok(last)) = (window.first_bus_time(), window.last_bus_time()) else {
        debug!(
            first = %window.first_bus,
            last = %window.last_bus,
            "Unparseable operating window"
        );
        return false;
    };

    if time < first {
        window.last_bus_after_midnight() && time < last
    } else {
        first <= time && time <= last
    }
}
