use std::env;
use std::time::Duration;

use crate::errors::GatewayError;
use crate::services::phone;

pub const DEFAULT_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub twilio_api_base: String,
    pub request_timeout_secs: u64,
    pub auto_reply: Option<String>,
    pub public_webhook_url: Option<String>,
}

/// Provider credentials, handed to the client once at startup.
#[derive(Clone, Debug)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "smsgate.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            twilio_phone_number: env::var("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            twilio_api_base: env::var("TWILIO_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            request_timeout_secs: env::var("TWILIO_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            auto_reply: non_empty_var("AUTO_REPLY"),
            public_webhook_url: non_empty_var("PUBLIC_WEBHOOK_URL"),
        }
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if !self.twilio_phone_number.is_empty()
            && !phone::is_valid_phone_number(&self.twilio_phone_number)
        {
            return Err(GatewayError::Config(
                "TWILIO_PHONE_NUMBER must be in E.164 format (e.g. +15551234567)".to_string(),
            ));
        }
        if !self.twilio_api_base.starts_with("http://") && !self.twilio_api_base.starts_with("https://") {
            return Err(GatewayError::Config(format!(
                "TWILIO_API_BASE must be an http(s) URL, got {}",
                self.twilio_api_base
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(GatewayError::Config(
                "TWILIO_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn credentials(&self) -> TwilioCredentials {
        TwilioCredentials {
            account_sid: self.twilio_account_sid.clone(),
            auth_token: self.twilio_auth_token.clone(),
            from_number: self.twilio_phone_number.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Webhook signatures are only checked once an auth token is configured.
    pub fn validates_signatures(&self) -> bool {
        !self.twilio_auth_token.is_empty()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
