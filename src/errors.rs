use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Provider { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::MissingField(_) => StatusCode::BAD_REQUEST,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
