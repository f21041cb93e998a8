//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::board::{LookupError, lookup};
use crate::datamall::DataMallApi;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router<A>(state: AppState<A>, static_dir: impl AsRef<Path>) -> Router
where
    A: DataMallApi + 'static,
{
    Router::new()
        .route("/", get(index_page::<A>))
        .route("/health", get(health))
        .route("/api/stops/:code", get(stop_board_json::<A>))
        .route("/api/alerts", get(alerts_json::<A>))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page: polls train alerts, and shows the board for `?stop=` if given.
async fn index_page<A: DataMallApi>(
    State(state): State<AppState<A>>,
    Query(req): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let alerts = state.datamall.train_alerts().await;
    let alert = AlertView::from_fetched(&alerts);

    let query = req.stop.unwrap_or_default();
    let mut template = IndexTemplate {
        query: query.clone(),
        alert,
        error: None,
        board: None,
    };

    if !query.is_empty() {
        let ctx = state.request_context();
        match lookup(&state.datamall, &query, &ctx).await {
            Ok(board) => template.board = Some(BoardView::from_board(&board)),
            Err(e) => {
                log_lookup_error(&query, &e);
                template.error = Some(e.user_message().to_string());
            }
        }
    }

    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;

    Ok(Html(html))
}

/// Stop board as JSON.
async fn stop_board_json<A: DataMallApi>(
    State(state): State<AppState<A>>,
    UrlPath(code): UrlPath<String>,
) -> Result<Response, AppError> {
    let ctx = state.request_context();
    let board = lookup(&state.datamall, &code, &ctx).await.map_err(|e| {
        log_lookup_error(&code, &e);
        AppError::from(e)
    })?;

    Ok(Json(board).into_response())
}

/// Train disruption status as JSON.
async fn alerts_json<A: DataMallApi>(State(state): State<AppState<A>>) -> Json<AlertsResponse> {
    let fetched = state.datamall.train_alerts().await;
    let error = fetched
        .error
        .as_ref()
        .map(|_| crate::board::GENERIC_ERROR_MESSAGE.to_string());
    Json(AlertsResponse::new(fetched.data, error))
}

fn log_lookup_error(input: &str, e: &LookupError) {
    match e.upstream_kind() {
        Some(kind) => warn!(input, ?kind, error = %e, "Stop lookup failed"),
        None => info!(input, error = %e, "Stop lookup rejected"),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        let message = e.user_message().to_string();
        match e {
            LookupError::InvalidStopCode(_) => AppError::BadRequest { message },
            LookupError::StopNotFound(_) => AppError::NotFound { message },
            LookupError::Upstream(_) | LookupError::Arrival(_) => AppError::BadGateway { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => {
                error!(%message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{GENERIC_ERROR_MESSAGE, INVALID_STOP_MESSAGE, STOP_NOT_FOUND_MESSAGE};
    use crate::cache::{CacheConfig, CachedDataMall};
    use crate::datamall::{DataMallError, MockDataMall};
    use crate::domain::StopCode;
    use chrono::FixedOffset;

    fn state() -> AppState<MockDataMall> {
        let api = MockDataMall::from_dir("data/mock").unwrap();
        AppState::new(
            CachedDataMall::new(api, &CacheConfig::default()),
            FixedOffset::east_opt(8 * 3600).unwrap(),
        )
    }

    #[test]
    fn lookup_errors_map_to_status() {
        let err = AppError::from(LookupError::from(StopCode::parse("12").unwrap_err()));
        assert!(matches!(err, AppError::BadRequest { ref message } if message == INVALID_STOP_MESSAGE));

        let err = AppError::from(LookupError::StopNotFound(StopCode::parse("99999").unwrap()));
        assert!(matches!(err, AppError::NotFound { ref message } if message == STOP_NOT_FOUND_MESSAGE));

        let err = AppError::from(LookupError::Upstream(DataMallError::Unauthorized));
        assert!(matches!(err, AppError::BadGateway { ref message } if message == GENERIC_ERROR_MESSAGE));
    }

    #[test]
    fn app_error_status_codes() {
        let response = AppError::NotFound {
            message: "x".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::BadGateway {
            message: "x".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn index_without_stop() {
        let Html(html) = index_page(State(state()), Query(IndexQuery::default()))
            .await
            .unwrap();
        assert!(html.contains("Which bus stop?"));
        assert!(!html.contains("banner-error"));
    }

    #[tokio::test]
    async fn index_with_invalid_stop() {
        let query = IndexQuery {
            stop: Some("12ab".to_string()),
        };
        let Html(html) = index_page(State(state()), Query(query)).await.unwrap();
        assert!(html.contains(INVALID_STOP_MESSAGE));
    }

    #[tokio::test]
    async fn index_with_known_stop() {
        let query = IndexQuery {
            stop: Some("01012".to_string()),
        };
        let Html(html) = index_page(State(state()), Query(query)).await.unwrap();
        assert!(html.contains("Hotel Grand Pacific along Victoria St"));
    }

    #[tokio::test]
    async fn json_board_not_found() {
        let result = stop_board_json(State(state()), UrlPath("99999".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn json_board_ok() {
        let response = stop_board_json(State(state()), UrlPath("01012".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn json_alerts_from_fixture() {
        let Json(alerts) = alerts_json(State(state())).await;
        assert!(alerts.disrupted);
        assert_eq!(alerts.lines, vec!["NSL".to_string()]);
        assert!(alerts.error.is_none());
    }

    #[test]
    fn router_builds() {
        let _router = create_router(state(), "static");
    }
}
