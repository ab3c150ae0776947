//! HTTP mapping of [`GatewayError`].
//!
//! Body: `{"error": {"code": "NOT_REGISTERED", "message": "..."}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use omnigate_core::GatewayError;

/// A [`GatewayError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GatewayError::NotRegistered(_) | GatewayError::ProviderNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            GatewayError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            GatewayError::NoProviderBound { .. }
            | GatewayError::CapabilityUnsupported { .. }
            | GatewayError::UnknownCapability(_)
            | GatewayError::UnsupportedMetadataType { .. }
            | GatewayError::DimensionMismatch { .. }
            | GatewayError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::SchemaNotDefined(_) => StatusCode::PRECONDITION_FAILED,
            GatewayError::CollectionNotLoaded { .. } | GatewayError::VectorStoreDisabled => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(code = self.0.code(), error = %self.0, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": self.0.code(),
                "message": self.0.to_string(),
            }
        }));
        (status, body).into_response()
    }
}
