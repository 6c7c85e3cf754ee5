use std::time::Duration;

use super::{CalloutMethod, CalloutRequest, Transport};
use crate::config::TwilioCredentials;
use crate::errors::GatewayError;
use crate::models::{OutboundMessageRequest, ProviderResponse};
use crate::services::phone::mask_phone_number;

/// Sends messages and looks up their status through a `Transport`.
pub struct ProviderClient {
    credentials: TwilioCredentials,
    api_base: String,
    timeout: Duration,
    transport: Box<dyn Transport>,
}

impl ProviderClient {
    pub fn new(
        credentials: TwilioCredentials,
        api_base: &str,
        timeout: Duration,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            credentials,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
            transport,
        }
    }

    pub async fn send(
        &self,
        request: &OutboundMessageRequest,
    ) -> Result<ProviderResponse, GatewayError> {
        let from = match request.sender() {
            Some(from) => from.to_string(),
            None if !self.credentials.from_number.is_empty() => {
                self.credentials.from_number.clone()
            }
            None => {
                return Err(GatewayError::InvalidArgument(
                    "no sender number given and none configured".to_string(),
                ))
            }
        };

        let callout = CalloutRequest {
            method: CalloutMethod::Post,
            url: format!(
                "{}/Accounts/{}/Messages.json",
                self.api_base, self.credentials.account_sid
            ),
            basic_auth: self.basic_auth(),
            form: vec![
                ("To".to_string(), request.to().to_string()),
                ("From".to_string(), from),
                ("Body".to_string(), request.body().to_string()),
            ],
        };

        tracing::info!(to = %mask_phone_number(request.to()), "sending message");
        let response = self.callout(&callout).await?;
        if response.success {
            tracing::info!(
                sid = response.message_id.as_deref().unwrap_or(""),
                status = response.status_code,
                "message accepted by provider"
            );
        }
        Ok(response)
    }

    pub async fn fetch_status(&self, message_id: &str) -> Result<ProviderResponse, GatewayError> {
        let message_id = message_id.trim();
        if message_id.is_empty() || !message_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GatewayError::InvalidArgument(format!(
                "malformed message id: {message_id:?}"
            )));
        }

        let callout = CalloutRequest {
            method: CalloutMethod::Get,
            url: format!(
                "{}/Accounts/{}/Messages/{}.json",
                self.api_base, self.credentials.account_sid, message_id
            ),
            basic_auth: self.basic_auth(),
            form: Vec::new(),
        };

        tracing::debug!(sid = message_id, "fetching message status");
        self.callout(&callout).await
    }

    async fn callout(&self, callout: &CalloutRequest) -> Result<ProviderResponse, GatewayError> {
        let raw = tokio::time::timeout(self.timeout, self.transport.execute(callout))
            .await
            .map_err(|_| {
                GatewayError::Transport(format!(
                    "request timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })?
            .inspect_err(|e| tracing::error!(error = %e, url = %callout.url, "callout failed"))?;

        let response = ProviderResponse::from_callout(raw.status, raw.body);
        if let Some(reason) = &response.error_message {
            tracing::warn!(status = response.status_code, error = %reason, "provider rejected callout");
        }
        Ok(response)
    }

    fn basic_auth(&self) -> (String, String) {
        (
            self.credentials.account_sid.clone(),
            self.credentials.auth_token.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::services::messaging::CalloutResponse;

    struct RecordingTransport {
        seen: Arc<Mutex<Vec<CalloutRequest>>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(
            &self,
            request: &CalloutRequest,
        ) -> Result<CalloutResponse, GatewayError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(CalloutResponse {
                status: 201,
                body: r#"{"sid":"SM42","status":"queued"}"#.to_string(),
            })
        }
    }

    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn execute(
            &self,
            _request: &CalloutRequest,
        ) -> Result<CalloutResponse, GatewayError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("timeout should fire first")
        }
    }

    fn credentials(from_number: &str) -> TwilioCredentials {
        TwilioCredentials {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from_number: from_number.to_string(),
        }
    }

    fn recording_client(from_number: &str) -> (ProviderClient, Arc<Mutex<Vec<CalloutRequest>>>) {
        let seen = Arc::new(Mutex::new(vec![]));
        let client = ProviderClient::new(
            credentials(from_number),
            "https://api.example.com/2010-04-01/",
            Duration::from_secs(5),
            Box::new(RecordingTransport {
                seen: Arc::clone(&seen),
            }),
        );
        (client, seen)
    }

    #[tokio::test]
    async fn test_send_builds_form_post() {
        let (client, seen) = recording_client("+15550000000");
        let req = OutboundMessageRequest::new("+15551234567", "hello", None).unwrap();

        let resp = client.send(&req).await.unwrap();
        assert!(resp.success);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let callout = &seen[0];
        assert_eq!(callout.method, CalloutMethod::Post);
        assert_eq!(
            callout.url,
            "https://api.example.com/2010-04-01/Accounts/AC123/Messages.json"
        );
        assert_eq!(callout.basic_auth, ("AC123".to_string(), "secret".to_string()));
        assert!(callout
            .form
            .contains(&("From".to_string(), "+15550000000".to_string())));
        assert!(callout
            .form
            .contains(&("To".to_string(), "+15551234567".to_string())));
    }

    #[tokio::test]
    async fn test_explicit_sender_overrides_configured() {
        let (client, seen) = recording_client("+15550000000");
        let req =
            OutboundMessageRequest::new("+15551234567", "hi", Some("+15559990000".to_string()))
                .unwrap();

        client.send(&req).await.unwrap();
        let seen = seen.lock().unwrap();
        assert!(seen[0]
            .form
            .contains(&("From".to_string(), "+15559990000".to_string())));
    }

    #[tokio::test]
    async fn test_missing_sender_fails_before_io() {
        let (client, seen) = recording_client("");
        let req = OutboundMessageRequest::new("+15551234567", "hi", None).unwrap();

        let err = client.send(&req).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_status_url() {
        let (client, seen) = recording_client("+15550000000");
        client.fetch_status("SM42").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, CalloutMethod::Get);
        assert_eq!(
            seen[0].url,
            "https://api.example.com/2010-04-01/Accounts/AC123/Messages/SM42.json"
        );
        assert!(seen[0].form.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_status_rejects_malformed_id() {
        let (client, seen) = recording_client("+15550000000");
        for bad in ["", "   ", "SM42/../x"] {
            let err = client.fetch_status(bad).await.unwrap_err();
            assert!(matches!(err, GatewayError::InvalidArgument(_)));
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_becomes_transport_error() {
        let client = ProviderClient::new(
            credentials("+15550000000"),
            "https://api.example.com",
            Duration::from_millis(250),
            Box::new(StalledTransport),
        );
        let req = OutboundMessageRequest::new("+15551234567", "hi", None).unwrap();

        match client.send(&req).await {
            Err(GatewayError::Transport(msg)) => assert!(msg.contains("timed out after 250ms")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
