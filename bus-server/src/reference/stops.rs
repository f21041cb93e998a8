//! Bus stop lookup table.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::datamall::{BusStopRecord, DataMallApi, Fetched};
use crate::domain::StopCode;

use super::fetch::paginate;

/// A bus stop as published by DataMall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusStop {
    pub code: StopCode,
    pub description: String,
    pub road_name: String,
}

impl BusStop {
    /// Human-readable label, e.g. "Hotel Grand Pacific along Victoria St".
    pub fn label(&self) -> String {
        format!("{} along {}", title_case(&self.description), self.road_name)
    }
}

/// Stop code → stop mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusStops {
    stops: HashMap<StopCode, BusStop>,
}

impl BusStops {
    /// Build the table from listing records, skipping records whose stop
    /// code is not 5 digits.
    pub fn from_records(records: impl IntoIterator<Item = BusStopRecord>) -> Self {
        let stops = records
            .into_iter()
            .filter_map(|r| match StopCode::parse(&r.bus_stop_code) {
                Ok(code) => Some((
                    code,
                    BusStop {
                        code,
                        description: r.description,
                        road_name: r.road_name,
                    },
                )),
                Err(e) => {
                    debug!(code = %r.bus_stop_code, error = %e, "Skipping bus stop record");
                    None
                }
            })
            .collect();

        Self { stops }
    }

    pub fn get(&self, code: &StopCode) -> Option<&BusStop> {
        self.stops.get(code)
    }

    pub fn contains(&self, code: &StopCode) -> bool {
        self.stops.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Fetch every bus stop from DataMall.
pub async fn fetch_stops<A: DataMallApi>(api: &A) -> Fetched<BusStops> {
    paginate("BusStops", move |skip| api.bus_stops_page(skip))
        .await
        .map(|paged| BusStops::from_records(paged.records))
}

/// Title-case the way DataMall descriptions are usually shown: the first
/// letter of every run of letters is upper case, the rest lower case.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
