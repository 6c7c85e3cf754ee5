use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const WHATSAPP_PREFIX: &str = "whatsapp:";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    WhatsApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::WhatsApp => "whatsapp",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "whatsapp" => Channel::WhatsApp,
            _ => Channel::Sms,
        }
    }

    /// The provider marks WhatsApp senders with a `whatsapp:` prefix.
    pub fn from_sender(from: &str) -> Self {
        if from.starts_with(WHATSAPP_PREFIX) {
            Channel::WhatsApp
        } else {
            Channel::Sms
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAttachment {
    pub url: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundMessageEvent {
    pub message_sid: String,
    pub from: String,
    pub to: String,
    pub body: String,
    pub media: Vec<MediaAttachment>,
    pub location: Option<GeoLocation>,
    pub channel: Channel,
    pub received_at: DateTime<Utc>,
}

impl InboundMessageEvent {
    pub fn media_urls(&self) -> Vec<&str> {
        self.media.iter().map(|m| m.url.as_str()).collect()
    }
}

/// A stored event together with its row id.
#[derive(Debug, Clone, Serialize)]
pub struct StoredInboundMessage {
    pub id: i64,
    #[serde(flatten)]
    pub event: InboundMessageEvent,
}
