use serde::Serialize;

use crate::errors::GatewayError;
use crate::services::phone;

/// Longest body the provider accepts for a single message.
pub const MAX_BODY_CHARS: usize = 1600;

/// A validated outbound message. Fields are private so a value can only
/// exist once it has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessageRequest {
    to: String,
    body: String,
    from: Option<String>,
}

impl OutboundMessageRequest {
    pub fn new(
        to: impl Into<String>,
        body: impl Into<String>,
        from: Option<String>,
    ) -> Result<Self, GatewayError> {
        let to = to.into().trim().to_string();
        let body = body.into();

        if to.is_empty() {
            return Err(GatewayError::InvalidArgument(
                "recipient number is required".to_string(),
            ));
        }
        if !phone::is_valid_phone_number(&to) {
            return Err(GatewayError::InvalidArgument(format!(
                "recipient number must be in E.164 format, got {}",
                phone::mask_phone_number(&to)
            )));
        }

        if body.trim().is_empty() {
            return Err(GatewayError::InvalidArgument(
                "message body must not be empty".to_string(),
            ));
        }
        let chars = body.chars().count();
        if chars > MAX_BODY_CHARS {
            return Err(GatewayError::InvalidArgument(format!(
                "message body is {chars} characters, limit is {MAX_BODY_CHARS}"
            )));
        }

        let from = from
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        if let Some(sender) = &from {
            if !phone::is_valid_phone_number(sender) {
                return Err(GatewayError::InvalidArgument(format!(
                    "sender number must be in E.164 format, got {}",
                    phone::mask_phone_number(sender)
                )));
            }
        }

        Ok(Self { to, body, from })
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref()
    }
}
