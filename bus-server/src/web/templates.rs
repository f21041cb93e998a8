//! Askama templates for the web frontend.

use askama::Template;

use crate::alerts::AffectedLines;
use crate::board::{GENERIC_ERROR_MESSAGE, StopBoard};
use crate::datamall::Fetched;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page: stop code form, alert banner, and the board when a stop was
/// requested.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// What the user typed, echoed back into the input
    pub query: String,
    pub alert: Option<AlertView>,
    /// Inline error for the stop lookup
    pub error: Option<String>,
    pub board: Option<BoardView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Train alert banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertView {
    pub message: String,
    /// Error banner rather than a disruption warning
    pub is_error: bool,
}

impl AlertView {
    /// Banner for an alert poll, or `None` when there is nothing to show.
    pub fn from_fetched(fetched: &Fetched<AffectedLines>) -> Option<Self> {
        if fetched.error.is_some() {
            return Some(Self {
                message: GENERIC_ERROR_MESSAGE.to_string(),
                is_error: true,
            });
        }

        if fetched.data.is_empty() {
            return None;
        }

        let lines: Vec<&str> = fetched.data.iter().map(String::as_str).collect();
        Some(Self {
            message: format!("Train service disruption on {}.", lines.join(", ")),
            is_error: false,
        })
    }
}

/// A stop board ready for display.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub code: String,
    pub label: String,
    pub panels: Vec<PanelView>,
    /// Shown above the panels when stop data could only be partly loaded
    pub warning: Option<String>,
}

/// One expandable service panel.
#[derive(Debug, Clone)]
pub struct PanelView {
    pub service_no: String,
    pub summary: String,
    pub lines: Vec<String>,
}

impl BoardView {
    pub fn from_board(board: &StopBoard) -> Self {
        let panels = board
            .services
            .iter()
            .map(|s| PanelView {
                service_no: s.service_no.clone(),
                summary: s.status.summary(),
                lines: s.buses.iter().map(|b| b.message()).collect(),
            })
            .collect();

        Self {
            code: board.stop.code.to_string(),
            label: board.label.clone(),
            panels,
            warning: (!board.reference_complete).then(|| GENERIC_ERROR_MESSAGE.to_string()),
        }
    }
}
