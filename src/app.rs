//! HTTP routes.

use crate::app_state::SharedAppState;
use crate::error::QueryError;
use crate::metrics::{metrics_handler, record_response_metrics, request_counter};
use crate::models::MetricResult;
use crate::query::MetricKind;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tower::Layer;
use tower::ServiceBuilder;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Application service: the router behind trailing-slash normalization.
pub type Service = NormalizePath<Router>;

type QueryResponse = Result<Json<MetricResult>, QueryError>;

/// Returns a [axum::Router] for the query API.
///
/// Each metric is served at `/<metric>` for the whole archive and at `/<metric>/<path>` for the
/// files and directories under a path.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn router(state: SharedAppState) -> Router {
    MetricKind::ALL
        .into_iter()
        .fold(Router::new(), metric_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .on_request(request_counter)
                    .on_response(record_response_metrics),
            ),
        )
        .route("/metrics", get(metrics_handler))
}

/// Returns the application [Service].
///
/// Trailing slashes are removed from request paths before routing.
pub fn service(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

fn metric_routes(router: Router<SharedAppState>, metric: MetricKind) -> Router<SharedAppState> {
    let route = format!("/{}", metric);
    router
        .route(
            &route,
            get(move |state: State<SharedAppState>| whole_archive(state, metric)),
        )
        .route(
            &format!("{}/*path", route),
            get(move |state: State<SharedAppState>, path: Path<String>| {
                under_path(state, path, metric)
            }),
        )
}

async fn whole_archive(State(state): State<SharedAppState>, metric: MetricKind) -> QueryResponse {
    Ok(Json(state.dispatcher.query(metric, None).await?))
}

// Paths that fail to decode are rejected by the extractor with 400.
async fn under_path(
    State(state): State<SharedAppState>,
    Path(path): Path<String>,
    metric: MetricKind,
) -> QueryResponse {
    Ok(Json(state.dispatcher.query(metric, Some(path.as_str())).await?))
}
