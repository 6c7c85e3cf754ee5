use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;

use crate::services::webhook::validate_twilio_signature;
use crate::state::AppState;

pub async fn sms_webhook(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let params = match form {
        Ok(Form(params)) => params,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable webhook body");
            Vec::new()
        }
    };

    // Signature checks are skipped while no auth token is configured (dev mode)
    if state.config.validates_signatures() {
        let signature = headers
            .get("x-twilio-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            tracing::warn!("missing X-Twilio-Signature header");
            return (StatusCode::FORBIDDEN, "Missing signature").into_response();
        }

        let url = match &state.config.public_webhook_url {
            Some(url) => url.clone(),
            None => {
                let proto = headers
                    .get("x-forwarded-proto")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("https");
                let host = headers
                    .get("x-forwarded-host")
                    .or_else(|| headers.get("host"))
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("localhost");
                let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
                format!("{proto}://{host}{path}")
            }
        };

        if !validate_twilio_signature(&state.config.twilio_auth_token, signature, &url, &params) {
            tracing::warn!(url = %url, "invalid Twilio signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    state.webhook.handle_incoming(&params).await.into_response()
}
