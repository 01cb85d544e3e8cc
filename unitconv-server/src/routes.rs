//! HTTP routes and handlers
//!
//! | Method | Path                        | Handler           |
//! |--------|-----------------------------|-------------------|
//! | GET    | /health                     | `health`          |
//! | GET    | /convert                    | `list_categories` |
//! | POST   | /convert                    | `create_category` |
//! | GET    | /convert/{category}         | `convert`         |
//! | GET    | /convert/{category}/units   | `list_units`      |
//! | POST   | /convert/{category}/units   | `add_unit`        |

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value as JsonValue};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{warn, Level};
use unitconv_core::{
    CategorySummary, ConversionCategory, ConversionCategoryDto, ConversionQuery,
    ConversionResponse, NewUnitDto, Unit,
};

use crate::error::{method_not_allowed, route_not_found, ApiError};
use crate::AppState;

pub const SERVICE_NAME: &str = "unitconv";

/// Unreserved characters (RFC 3986) stay literal in a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/convert", get(list_categories).post(create_category))
        .route("/convert/{category}", get(convert))
        .route("/convert/{category}/units", get(list_units).post(add_unit))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn health() -> Json<JsonValue> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategorySummary>>, ApiError> {
    Ok(Json(state.registry().summaries().await?))
}

async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<ConversionCategoryDto>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<ConversionCategory>), ApiError> {
    let Json(dto) = payload?;
    let created = state.registry().create_category(&dto).await?;

    let headers = location(&format!(
        "/convert/{}",
        utf8_percent_encode(&created.name, PATH_SEGMENT)
    ));
    Ok((StatusCode::CREATED, headers, Json(created)))
}

async fn convert(
    State(state): State<AppState>,
    category: Result<Path<String>, PathRejection>,
    query: Result<Query<ConversionQuery>, QueryRejection>,
) -> Result<Json<ConversionResponse>, ApiError> {
    let Path(category) = category?;
    let Query(query) = query?;
    let response = state.service.convert_in_category(&category, &query).await?;
    Ok(Json(response))
}

async fn list_units(
    State(state): State<AppState>,
    category: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Unit>>, ApiError> {
    let Path(category) = category?;
    Ok(Json(state.registry().list_units_in_category(&category).await?))
}

async fn add_unit(
    State(state): State<AppState>,
    category: Result<Path<String>, PathRejection>,
    payload: Result<Json<NewUnitDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Unit>), ApiError> {
    let Path(category) = category?;
    let Json(dto) = payload?;
    let unit = state.registry().add_unit(&category, &dto).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

/// `Location` header for a created resource; `path` must already be percent-encoded
fn location(path: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(path) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(_) => warn!(path, "Created resource path is not a valid header value"),
    }
    headers
}
