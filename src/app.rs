use crate::app_state::SharedAppState;
use crate::blend;
use crate::error::AssayError;
use crate::metrics::{metrics_handler, record_response_metrics, request_counter};
use crate::models;
use crate::normalize;
use crate::validated_query::ValidatedQuery;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// `axum::Router` with a trailing slash normalisation layer.
pub type Service = NormalizePath<Router>;

/// Returns a [axum::Router] for the crude assay API.
///
/// The router is populated with all routes as well as the following middleware:
///
/// * a [tower_http::trace::TraceLayer] for tracing requests and responses, which also updates
///   the request and response metrics
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn router(state: SharedAppState) -> Router {
    fn v1() -> Router<SharedAppState> {
        Router::new()
            .route(
                "/data/reference/crudes",
                get(crudes)
                    .post(not_developed)
                    .put(not_developed)
                    .delete(not_developed),
            )
            .route("/data/reporting/crude_blend", get(crude_blend))
    }

    Router::new()
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", v1())
        .layer(
            TraceLayer::new_for_http()
                .on_request(request_counter)
                .on_response(record_response_metrics),
        )
        .with_state(state)
}

/// Returns a [Service] for the crude assay API.
///
/// The service is populated with all routes as well as the following middleware:
///
/// * a [tower_http::trace::TraceLayer] for tracing requests and responses
/// * a [tower_http::normalize_path::NormalizePathLayer] for trimming trailing slashes from
///   requests
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn service(state: SharedAppState) -> Service {
    // Note that any middleware that should affect routing must wrap the router.
    // See
    // https://docs.rs/axum/0.6.12/axum/middleware/index.html#rewriting-request-uri-in-middleware.
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Handler for the crude reference endpoint
///
/// Returns every crude, or only the given crudes with their location when `ids` is set.
async fn crudes(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<models::CrudeQuery>,
) -> Result<Json<Vec<Value>>, AssayError> {
    let records = match query.ids {
        Some(ids) => {
            let crude_ids = normalize::parse_ids(&ids)?;
            state.store.crudes_by_id(&crude_ids).await?
        }
        None => state.store.crudes().await?,
    };
    Ok(Json(records))
}

/// Handler for the crude blend endpoint
///
/// Blends the recommended assays of the requested crudes, weighted by their volumes.
async fn crude_blend(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<models::BlendQuery>,
) -> Result<Json<models::BlendResult>, AssayError> {
    let inputs = normalize::parse_blend_inputs(query.ids.as_deref(), query.volumes.as_deref())?;
    let result = blend::blend_crudes(state.store.as_ref(), &inputs).await?;
    Ok(Json(result))
}

/// Handler for write operations on crudes, which are not supported.
async fn not_developed() -> AssayError {
    AssayError::NotImplemented
}
