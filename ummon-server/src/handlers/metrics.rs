use crate::server::AppState;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error};
use ummon_exposition::{CONTENT_TYPE, render};

/// One scrape per request. Unreachable upstreams still answer 200.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let result = state.translator.scrape().await.and_then(|scrape| {
        debug!(
            upstream_up = scrape.upstream_up,
            collections = scrape.collections.len(),
            "Scrape complete"
        );
        render(&scrape.collections)
    });

    match result {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Scrape failed");
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, [(header::CONTENT_TYPE, CONTENT_TYPE)], e.to_string()).into_response()
        }
    }
}
