//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::alerts::AffectedLines;

/// Query string of the index page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Stop code as typed by the user
    pub stop: Option<String>,
}

/// Train disruption status.
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    /// Whether any line is disrupted
    pub disrupted: bool,

    /// Affected line identifiers, sorted
    pub lines: Vec<String>,

    /// Set when the status could not be checked
    pub error: Option<String>,
}

impl AlertsResponse {
    pub fn new(lines: AffectedLines, error: Option<String>) -> Self {
        Self {
            disrupted: !lines.is_empty(),
            lines: lines.into_iter().collect(),
            error,
        }
    }
}

/// Error body for JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
