//! Mapping of domain errors onto HTTP responses

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};
use unitconv_core::{codes, ConvertError, ErrorBody};

/// Handler error: a `ConvertError` rendered as a JSON body with its status
#[derive(Debug)]
pub struct ApiError(pub ConvertError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ConvertError::Validation(_) => StatusCode::BAD_REQUEST,
            ConvertError::NotFound { .. } => StatusCode::NOT_FOUND,
            ConvertError::Conflict { .. } => StatusCode::CONFLICT,
            ConvertError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ConvertError::validation(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ConvertError::validation(format!(
            "invalid query string: {}",
            rejection.body_text()
        )))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(ConvertError::validation(format!(
            "invalid path: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            debug!(status = status.as_u16(), code = self.0.code(), error = %self.0, "Request rejected");
        } else {
            error!(status = status.as_u16(), code = self.0.code(), error = %self.0, "Request failed");
        }

        let body = ErrorBody::new(&self.0, status.as_u16());
        (status, Json(body)).into_response()
    }
}

/// Fallback for paths no route matches
pub async fn route_not_found(uri: Uri) -> Response {
    routing_error(
        StatusCode::NOT_FOUND,
        codes::NOT_FOUND,
        format!("no route for '{}'", uri.path()),
    )
}

/// Fallback for a known path requested with an unsupported method
pub async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    routing_error(
        StatusCode::METHOD_NOT_ALLOWED,
        codes::METHOD_NOT_ALLOWED,
        format!("method {} is not allowed on '{}'", method, uri.path()),
    )
}

fn routing_error(status: StatusCode, code: &str, message: String) -> Response {
    debug!(status = status.as_u16(), code, error = %message, "Request rejected");
    let body = ErrorBody {
        code: code.to_string(),
        message,
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(ConvertError::missing_field("from")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(ConvertError::unknown_unit("x")).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(ConvertError::duplicate_category("x")).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError(ConvertError::storage("disk")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_routing_fallbacks_use_error_status() {
        let response = route_not_found(Uri::from_static("/nowhere")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = method_not_allowed(Method::DELETE, Uri::from_static("/convert")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_response_carries_status() {
        let response = ApiError(ConvertError::duplicate_category("distance")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
