use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;

/// Normalized result of one provider callout.
///
/// `success` is true only when the status is 2xx and the body parsed into a
/// message resource; `error_message` is set exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderResponse {
    pub success: bool,
    pub status_code: u16,
    pub raw_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
    status: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResource {
    code: Option<i64>,
    message: String,
}

impl ProviderResponse {
    /// Builds a response from a raw status and body. Never fails: parse
    /// problems become a failed response carrying the reason.
    pub fn from_callout(status_code: u16, raw_body: String) -> Self {
        if !(200..300).contains(&status_code) {
            let error_message = match serde_json::from_str::<ErrorResource>(&raw_body) {
                Ok(ErrorResource {
                    code: Some(code),
                    message,
                }) => format!("provider error {code}: {message}"),
                Ok(ErrorResource { code: None, message }) => message,
                Err(_) => format!("provider returned status {status_code}"),
            };
            return Self::failure(status_code, raw_body, error_message);
        }

        match serde_json::from_str::<MessageResource>(&raw_body) {
            Ok(resource) if !resource.sid.trim().is_empty() => Self {
                success: true,
                status_code,
                raw_body,
                message_id: Some(resource.sid),
                message_status: resource.status,
                error_message: None,
            },
            Ok(_) => Self::failure(
                status_code,
                raw_body,
                "unexpected response shape: empty sid".to_string(),
            ),
            Err(e) => Self::failure(
                status_code,
                raw_body,
                format!("failed to parse provider response: {e}"),
            ),
        }
    }

    fn failure(status_code: u16, raw_body: String, error_message: String) -> Self {
        Self {
            success: false,
            status_code,
            raw_body,
            message_id: None,
            message_status: None,
            error_message: Some(error_message),
        }
    }

    /// Turns a failed response into `GatewayError::Provider`.
    pub fn into_result(self) -> Result<Self, GatewayError> {
        if self.success {
            Ok(self)
        } else {
            Err(GatewayError::Provider {
                status: self.status_code,
                message: self.error_message.unwrap_or_default(),
            })
        }
    }
}
