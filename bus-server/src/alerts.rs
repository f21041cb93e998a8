//! Train service disruption alerts.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::datamall::{DataMallApi, Fetched, TrainAlertResponse};

/// `Status` value DataMall reports while train services are disrupted.
pub const DISRUPTED_STATUS: u8 = 2;

/// Line identifiers (e.g. "NSL", "EWL") currently affected by a disruption.
pub type AffectedLines = BTreeSet<String>;

/// Lines affected according to an alert response; empty unless disrupted.
pub fn affected_lines(response: &TrainAlertResponse) -> AffectedLines {
    if response.value.status != DISRUPTED_STATUS {
        return AffectedLines::new();
    }

    response
        .value
        .affected_segments
        .iter()
        .map(|segment| segment.line.clone())
        .collect()
}

/// Poll DataMall for train disruptions.
///
/// A failed poll is reported as no disruption, with the error attached.
pub async fn check_alerts<A: DataMallApi>(api: &A) -> Fetched<AffectedLines> {
    match api.train_alerts().await {
        Ok(response) => {
            let lines = affected_lines(&response);
            if !lines.is_empty() {
                info!(?lines, "Train service disruption");
            }
            Fetched::complete(lines)
        }
        Err(e) => {
            warn!(error = %e, "Train alert check failed");
            Fetched::partial(AffectedLines::new(), e)
        }
    }
}
