pub mod client;
pub mod simulator;
pub mod twilio;

use async_trait::async_trait;

use crate::errors::GatewayError;

pub use client::ProviderClient;
pub use simulator::{CalloutSimulator, MockConfiguration};
pub use twilio::TwilioHttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutMethod {
    Get,
    Post,
}

/// One outbound HTTP call to the provider, described independently of the
/// HTTP client that performs it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutRequest {
    pub method: CalloutMethod,
    pub url: String,
    pub basic_auth: (String, String),
    pub form: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalloutResponse {
    pub status: u16,
    pub body: String,
}

/// The network boundary. Implementations fail with
/// `GatewayError::Transport` when no response could be obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &CalloutRequest) -> Result<CalloutResponse, GatewayError>;
}
