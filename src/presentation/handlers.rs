// HTTP request handlers
use crate::domain::error::PowerError;
use crate::domain::recent_change::Direction;
use crate::domain::sample::{PowerState, Sample};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Deserialize)]
pub struct SpanQuery {
    pub time: i64,
}

#[derive(Deserialize)]
pub struct DurationQuery {
    pub start: i64,
    pub end: i64,
}

#[derive(Deserialize)]
pub struct PollQuery {
    pub interval_ms: Option<u64>,
}

#[derive(Serialize)]
struct StateBody {
    state: PowerState,
}

#[derive(Serialize)]
struct DurationBody {
    text: String,
}

#[derive(Serialize)]
struct PollingBody {
    running: bool,
    changed: bool,
}

async fn respond<T: Serialize>(headers: &HeaderMap, data: &T) -> Response {
    match json_response(data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_window(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(&headers, &state.power_service.window()).await
}

pub async fn get_state(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let body = StateBody {
        state: state.power_service.state(),
    };
    respond(&headers, &body).await
}

/// Everything a status screen shows at once
pub async fn get_summary(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(&headers, &state.power_service.summary()).await
}

pub async fn get_change(
    Path(direction): Path<Direction>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(&headers, &state.power_service.most_recent_change(direction)).await
}

pub async fn get_missing(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(&headers, &state.power_service.missing_data_status()).await
}

/// Switches in a time range; without bounds, the switches for the current window
pub async fn get_switches(
    Query(range): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let switches = match (range.start, range.end) {
        (None, None) => state.power_service.display_switches(),
        (start, end) => state
            .power_service
            .switches_in_range(start.unwrap_or(i64::MIN), end.unwrap_or(i64::MAX)),
    };
    respond(&headers, &switches).await
}

/// The on/off run around a point, for chart tooltips
pub async fn get_span(
    Query(query): Query<SpanQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(&headers, &state.power_service.span_at(query.time)).await
}

pub async fn get_duration(
    Query(query): Query<DurationQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    if query.end < query.start {
        return (StatusCode::BAD_REQUEST, "end must not be before start").into_response();
    }
    let body = DurationBody {
        text: state.power_service.format_duration(query.start, query.end),
    };
    respond(&headers, &body).await
}

/// Append a sample pushed by an external telemetry source
pub async fn post_sample(State(state): State<Arc<AppState>>, Json(sample): Json<Sample>) -> Response {
    match state.power_service.append(sample) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e @ PowerError::OutOfOrderSample { .. }) => {
            (StatusCode::CONFLICT, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Error appending sample: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn start_polling(
    Query(query): Query<PollQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let interval = query
        .interval_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(state.poll_interval);
    let changed = state.poller.start(interval);
    let body = PollingBody {
        running: state.poller.is_running(),
        changed,
    };
    respond(&headers, &body).await
}

pub async fn stop_polling(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let changed = state.poller.cancel().await;
    let body = PollingBody {
        running: false,
        changed,
    };
    respond(&headers, &body).await
}

/// Stream window updates as they are published (progressive loading)
pub async fn stream_window(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rx = state.power_service.subscribe();
    stream_from_receiver(rx, accepts_brotli(&headers))
}
