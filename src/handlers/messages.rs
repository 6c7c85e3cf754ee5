use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::GatewayError;
use crate::models::{OutboundMessageRequest, ProviderResponse, StoredInboundMessage};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), GatewayError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(GatewayError::Unauthorized);
    }
    Ok(())
}

/// A failed provider response is still a value; it goes out as 502 with the
/// full response so callers can see status and raw body.
fn provider_reply(response: ProviderResponse) -> Response {
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(response)).into_response()
}

// POST /api/messages
#[derive(Deserialize)]
pub struct SendMessageBody {
    pub to: String,
    pub body: String,
    pub from: Option<String>,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SendMessageBody>,
) -> Result<Response, GatewayError> {
    check_auth(&headers, &state.config.admin_token)?;

    let request = OutboundMessageRequest::new(payload.to, payload.body, payload.from)?;
    let response = state.provider.send(&request).await?;
    Ok(provider_reply(response))
}

// GET /api/messages/:sid
pub async fn get_message_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(sid): Path<String>,
) -> Result<Response, GatewayError> {
    check_auth(&headers, &state.config.admin_token)?;

    let response = state.provider.fetch_status(&sid).await?;
    Ok(provider_reply(response))
}

// GET /api/inbound
#[derive(Deserialize)]
pub struct InboundQuery {
    pub limit: Option<i64>,
}

pub async fn list_inbound(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<InboundQuery>,
) -> Result<Json<Vec<StoredInboundMessage>>, GatewayError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let messages = {
        let db = state
            .db
            .lock()
            .map_err(|_| GatewayError::Storage("database mutex poisoned".to_string()))?;
        queries::list_inbound_messages(&db, limit)
            .map_err(|e| GatewayError::Storage(e.to_string()))?
    };

    Ok(Json(messages))
}
