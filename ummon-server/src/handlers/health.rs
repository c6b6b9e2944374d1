use crate::server::AppState;
use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};
use std::sync::Arc;

/// Liveness of the exporter itself; never contacts the upstream.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let profile = state.translator.mapper().profile();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": state.upstream,
        "metrics_path": state.metrics_path,
        "mapping": {
            "timestamp_unit": profile.timestamp_unit,
            "include_instance_label": profile.include_instance_label,
            "track_run_counters": profile.track_run_counters,
        },
    }))
}
