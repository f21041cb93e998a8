//! Live arrival transformation.
//!
//! Turns a raw `BusArrivalv2` response into per-service ETAs in minutes,
//! with deck type and crowding for each upcoming bus, ordered so the
//! service arriving soonest comes first.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::datamall::{BusArrivalResponse, NextBusDto, ServiceArrivalDto};

/// Error while interpreting an arrival response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrivalError {
    #[error("unknown bus type code: {0:?}")]
    UnknownDeckType(String),

    #[error("unknown bus load code: {0:?}")]
    UnknownLoad(String),

    #[error("invalid arrival timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}

/// Physical bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckType {
    Single,
    Double,
    Bendy,
}

impl DeckType {
    pub fn from_code(code: &str) -> Result<Self, ArrivalError> {
        match code {
            "SD" => Ok(DeckType::Single),
            "DD" => Ok(DeckType::Double),
            "BD" => Ok(DeckType::Bendy),
            other => Err(ArrivalError::UnknownDeckType(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeckType::Single => "Single Deck",
            DeckType::Double => "Double Deck",
            DeckType::Bendy => "Bendy bus",
        }
    }
}

/// How full an arriving bus is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Crowding {
    SeatsAvailable,
    StandingOnly,
    AlmostFull,
}

impl Crowding {
    pub fn from_code(code: &str) -> Result<Self, ArrivalError> {
        match code {
            "SEA" => Ok(Crowding::SeatsAvailable),
            "SDA" => Ok(Crowding::StandingOnly),
            "LSD" => Ok(Crowding::AlmostFull),
            other => Err(ArrivalError::UnknownLoad(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Crowding::SeatsAvailable => "with seats.",
            Crowding::StandingOnly => "with standing only.",
            Crowding::AlmostFull => "almost full.",
        }
    }
}

/// One upcoming bus with a live estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusEstimate {
    /// Minutes until arrival; negative once the bus has passed.
    pub minutes: i64,
    pub deck: DeckType,
    pub load: Crowding,
}

/// Arrivals for one service at a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceArrivals {
    pub service_no: String,
    /// One entry per "next bus" slot, `None` where DataMall has no estimate.
    pub buses: Vec<Option<BusEstimate>>,
    /// Non-negative ETAs in slot order.
    pub etas: Vec<i64>,
}

impl ServiceArrivals {
    /// The sort key: the first non-negative ETA.
    pub fn first_eta(&self) -> Option<i64> {
        self.etas.first().copied()
    }
}

/// Minutes from `now` until `arrival`, rounded half to even.
pub fn minutes_until(arrival: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> i64 {
    let seconds = (arrival - now).num_milliseconds() as f64 / 1000.0;
    (seconds / 60.0).round_ties_even() as i64
}

/// Transform a raw arrival response.
///
/// Every service in the response appears exactly once in the output, sorted
/// by first non-negative ETA. Services with no such ETA go last, in the
/// order DataMall listed them.
pub fn transform(
    response: &BusArrivalResponse,
    now: DateTime<FixedOffset>,
) -> Result<Vec<ServiceArrivals>, ArrivalError> {
    let mut services = response
        .services
        .iter()
        .map(|service| read_service(service, now))
        .collect::<Result<Vec<_>, _>>()?;

    services.sort_by_key(|s| s.first_eta().unwrap_or(i64::MAX));

    Ok(services)
}

fn read_service(
    service: &ServiceArrivalDto,
    now: DateTime<FixedOffset>,
) -> Result<ServiceArrivals, ArrivalError> {
    let buses = service
        .slots()
        .into_iter()
        .map(|slot| read_slot(slot, now))
        .collect::<Result<Vec<_>, _>>()?;

    let etas = buses
        .iter()
        .flatten()
        .map(|bus| bus.minutes)
        .filter(|&minutes| minutes >= 0)
        .collect();

    Ok(ServiceArrivals {
        service_no: service.service_no.clone(),
        buses,
        etas,
    })
}

fn read_slot(
    slot: &NextBusDto,
    now: DateTime<FixedOffset>,
) -> Result<Option<BusEstimate>, ArrivalError> {
    if slot.estimated_arrival.is_empty() {
        return Ok(None);
    }

    let arrival = DateTime::parse_from_rfc3339(&slot.estimated_arrival).map_err(|source| {
        ArrivalError::InvalidTimestamp {
            value: slot.estimated_arrival.clone(),
            source,
        }
    })?;

    Ok(Some(BusEstimate {
        minutes: minutes_until(arrival, now),
        deck: DeckType::from_code(&slot.bus_type)?,
        load: Crowding::from_code(&slot.load)?,
    }))
}
