use async_trait::async_trait;

use super::{CalloutMethod, CalloutRequest, CalloutResponse, Transport};
use crate::errors::GatewayError;

pub struct TwilioHttpTransport {
    client: reqwest::Client,
}

impl TwilioHttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for TwilioHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for TwilioHttpTransport {
    async fn execute(&self, request: &CalloutRequest) -> Result<CalloutResponse, GatewayError> {
        let (user, password) = &request.basic_auth;
        let builder = match request.method {
            CalloutMethod::Get => self.client.get(&request.url),
            CalloutMethod::Post => self.client.post(&request.url).form(&request.form),
        };

        let resp = builder
            .basic_auth(user, Some(password))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to reach Twilio: {e}")))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read Twilio response: {e}")))?;

        Ok(CalloutResponse { status, body })
    }
}
