use async_trait::async_trait;

use super::{CalloutRequest, CalloutResponse, Transport};
use crate::errors::GatewayError;

/// What a `CalloutSimulator` answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct MockConfiguration {
    pub status_code: u16,
    pub body: String,
    pub failure: Option<String>,
}

impl MockConfiguration {
    pub fn respond_with(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
            failure: None,
        }
    }

    pub fn fail_with(message: impl Into<String>) -> Self {
        Self {
            status_code: 0,
            body: String::new(),
            failure: Some(message.into()),
        }
    }
}

/// Stand-in for the network: returns the configured response for every
/// request, or fails with the configured transport error.
#[derive(Debug, Clone)]
pub struct CalloutSimulator {
    config: MockConfiguration,
}

impl CalloutSimulator {
    pub fn new(config: MockConfiguration) -> Self {
        Self { config }
    }

    pub fn respond(&self, _request: &CalloutRequest) -> Result<CalloutResponse, GatewayError> {
        if let Some(message) = &self.config.failure {
            return Err(GatewayError::Transport(message.clone()));
        }

        Ok(CalloutResponse {
            status: self.config.status_code,
            body: self.config.body.clone(),
        })
    }
}

#[async_trait]
impl Transport for CalloutSimulator {
    async fn execute(&self, request: &CalloutRequest) -> Result<CalloutResponse, GatewayError> {
        self.respond(request)
    }
}
