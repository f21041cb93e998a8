//! DataMall API response DTOs.
//!
//! These types map directly to the DataMall JSON responses. Only the fields
//! this service reads are declared; serde ignores the rest. String fields
//! default to empty because DataMall sends `""` for "no value".

use serde::{Deserialize, Serialize};

/// Envelope used by the paginated listing endpoints (`BusStops`, `BusRoutes`).
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub value: Vec<T>,
}

/// One record from the `BusStops` listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BusStopRecord {
    #[serde(rename = "BusStopCode")]
    pub bus_stop_code: String,

    #[serde(rename = "Description", default)]
    pub description: String,

    #[serde(rename = "RoadName", default)]
    pub road_name: String,
}

/// One record from the `BusRoutes` listing: a single service calling at a
/// single stop, with its first/last bus per calendar class.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BusRouteRecord {
    #[serde(rename = "ServiceNo")]
    pub service_no: String,

    #[serde(rename = "BusStopCode")]
    pub bus_stop_code: String,

    #[serde(rename = "WD_FirstBus", default)]
    pub wd_first_bus: String,

    #[serde(rename = "WD_LastBus", default)]
    pub wd_last_bus: String,

    #[serde(rename = "SAT_FirstBus", default)]
    pub sat_first_bus: String,

    #[serde(rename = "SAT_LastBus", default)]
    pub sat_last_bus: String,

    #[serde(rename = "SUN_FirstBus", default)]
    pub sun_first_bus: String,

    #[serde(rename = "SUN_LastBus", default)]
    pub sun_last_bus: String,
}

/// Response from `BusArrivalv2`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BusArrivalResponse {
    #[serde(rename = "BusStopCode", default)]
    pub bus_stop_code: String,

    #[serde(rename = "Services", default)]
    pub services: Vec<ServiceArrivalDto>,
}

/// Arrival information for one service at the requested stop.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceArrivalDto {
    #[serde(rename = "ServiceNo")]
    pub service_no: String,

    #[serde(rename = "Operator", default)]
    pub operator: String,

    #[serde(rename = "NextBus", default)]
    pub next_bus: NextBusDto,

    #[serde(rename = "NextBus2", default)]
    pub next_bus_2: NextBusDto,

    #[serde(rename = "NextBus3", default)]
    pub next_bus_3: NextBusDto,
}

impl ServiceArrivalDto {
    /// The three "next bus" slots, nearest first.
    pub fn slots(&self) -> [&NextBusDto; 3] {
        [&self.next_bus, &self.next_bus_2, &self.next_bus_3]
    }
}

/// One upcoming bus. All fields are empty when no estimate is available.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NextBusDto {
    /// ISO-8601 timestamp with offset, e.g. "2024-03-15T10:04:10+08:00".
    #[serde(rename = "EstimatedArrival", default)]
    pub estimated_arrival: String,

    /// Deck type code: "SD", "DD" or "BD".
    #[serde(rename = "Type", default)]
    pub bus_type: String,

    /// Crowding code: "SEA", "SDA" or "LSD".
    #[serde(rename = "Load", default)]
    pub load: String,
}

/// Response from `TrainServiceAlerts`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainAlertResponse {
    pub value: TrainAlertValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainAlertValue {
    /// 1 for normal service, 2 for disrupted.
    #[serde(rename = "Status")]
    pub status: u8,

    #[serde(rename = "AffectedSegments", default)]
    pub affected_segments: Vec<AffectedSegment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AffectedSegment {
    /// Line identifier, e.g. "NSL".
    #[serde(rename = "Line")]
    pub line: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_bus_stop_page() {
        let json = r#"{
            "odata.metadata": "http://datamall2.mytransport.sg/ltaodataservice/$metadata#BusStops",
            "value": [
                {"BusStopCode": "01012", "RoadName": "Victoria St", "Description": "Hotel Grand Pacific", "Latitude": 1.29684825487647, "Longitude": 103.85253591654006}
            ]
        }"#;
        let page: Page<BusStopRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(page.value.len(), 1);
        assert_eq!(page.value[0].bus_stop_code, "01012");
        assert_eq!(page.value[0].road_name, "Victoria St");
    }

    #[test]
    fn deserialize_route_record() {
        let json = r#"{
            "ServiceNo": "10", "Operator": "SBST", "Direction": 1, "StopSequence": 1,
            "BusStopCode": "75009", "Distance": 0,
            "WD_FirstBus": "0500", "WD_LastBus": "2300",
            "SAT_FirstBus": "0500", "SAT_LastBus": "2300",
            "SUN_FirstBus": "0500", "SUN_LastBus": "2300"
        }"#;
        let record: BusRouteRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.service_no, "10");
        assert_eq!(record.wd_first_bus, "0500");
        assert_eq!(record.sun_last_bus, "2300");
    }

    #[test]
    fn deserialize_arrival_with_empty_slot() {
        let json = r#"{
            "BusStopCode": "83139",
            "Services": [{
                "ServiceNo": "15",
                "Operator": "GAS",
                "NextBus": {"EstimatedArrival": "2024-03-15T10:04:10+08:00", "Load": "SEA", "Type": "SD", "Feature": "WAB"},
                "NextBus2": {"EstimatedArrival": "", "Load": "", "Type": "", "Feature": ""},
                "NextBus3": {"EstimatedArrival": "", "Load": "", "Type": "", "Feature": ""}
            }]
        }"#;
        let response: BusArrivalResponse = serde_json::from_str(json).unwrap();
        let service = &response.services[0];
        assert_eq!(service.service_no, "15");
        assert_eq!(service.next_bus.bus_type, "SD");
        assert!(service.next_bus_2.estimated_arrival.is_empty());
    }

    #[test]
    fn missing_slot_defaults_to_empty() {
        let json = r#"{"Services": [{"ServiceNo": "7", "NextBus": {"EstimatedArrival": ""}}]}"#;
        let response: BusArrivalResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.services[0].next_bus_3, NextBusDto::default());
    }

    #[test]
    fn deserialize_train_alert() {
        let json = r#"{"value": {"Status": 2, "AffectedSegments": [{"Line": "NSL", "Direction": "Both"}], "Message": []}}"#;
        let response: TrainAlertResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.value.status, 2);
        assert_eq!(response.value.affected_segments[0].line, "NSL");
    }
}
