use std::sync::Arc;

use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::errors::GatewayError;
use crate::models::{Channel, GeoLocation, InboundMessageEvent, MediaAttachment};
use crate::services::phone::mask_phone_number;
use crate::services::store::RecordStore;
use crate::services::twiml::MarkupReply;

/// Turns provider webhook calls into stored events and markup replies.
pub struct WebhookHandler {
    store: Arc<dyn RecordStore>,
    auto_reply: Option<String>,
}

impl WebhookHandler {
    pub fn new(store: Arc<dyn RecordStore>, auto_reply: Option<String>) -> Self {
        Self { store, auto_reply }
    }

    /// Always yields a well-formed reply; a request missing required fields
    /// is acknowledged with an empty document.
    pub async fn handle_incoming(&self, params: &[(String, String)]) -> MarkupReply {
        let event = match parse_inbound(params) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting inbound webhook");
                return MarkupReply::Empty;
            }
        };

        tracing::info!(
            sid = %event.message_sid,
            from = %mask_phone_number(&event.from),
            channel = event.channel.as_str(),
            media = event.media.len(),
            "incoming message"
        );

        match self.store.store(&event).await {
            Ok(id) => tracing::debug!(id, sid = %event.message_sid, "stored inbound message"),
            Err(e) => {
                tracing::error!(error = %e, sid = %event.message_sid, "failed to store inbound message")
            }
        }

        MarkupReply::from_auto_reply(self.auto_reply.as_deref())
    }
}

fn field<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
}

fn required<'a>(params: &'a [(String, String)], name: &str) -> Result<&'a str, GatewayError> {
    field(params, name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| GatewayError::MissingField(name.to_string()))
}

/// Builds an event from webhook form parameters. `MessageSid`, `From`
/// and `To` must be non-empty; `Body` must be present but may be empty
/// for media-only messages.
pub fn parse_inbound(params: &[(String, String)]) -> Result<InboundMessageEvent, GatewayError> {
    let message_sid = required(params, "MessageSid")?;
    let from = required(params, "From")?;
    let to = required(params, "To")?;
    let body = field(params, "Body").ok_or_else(|| GatewayError::MissingField("Body".to_string()))?;

    let mut media = Vec::new();
    for n in 0.. {
        let Some(url) = field(params, &format!("MediaUrl{n}")) else {
            break;
        };
        if url.is_empty() {
            continue;
        }
        let content_type = field(params, &format!("MediaContentType{n}"))
            .filter(|ct| !ct.is_empty())
            .map(str::to_string);
        media.push(MediaAttachment {
            url: url.to_string(),
            content_type,
        });
    }

    let latitude = field(params, "Latitude").and_then(|v| v.parse::<f64>().ok());
    let longitude = field(params, "Longitude").and_then(|v| v.parse::<f64>().ok());
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude))
            if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) =>
        {
            Some(GeoLocation { latitude, longitude })
        }
        _ => None,
    };

    Ok(InboundMessageEvent {
        message_sid: message_sid.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        body: body.to_string(),
        media,
        location,
        channel: Channel::from_sender(from),
        received_at: Utc::now(),
    })
}

fn signature_mac(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<Hmac<Sha1>> {
    // URL followed by every parameter, sorted by name, as name+value
    let mut data = url.to_string();
    let mut sorted_params: Vec<&(String, String)> = params.iter().collect();
    sorted_params.sort();
    for (key, value) in sorted_params {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(data.as_bytes());
    Some(mac)
}

pub fn compute_twilio_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> String {
    signature_mac(auth_token, url, params)
        .map(|mac| base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

pub fn validate_twilio_signature(
    auth_token: &str,
    signature: &str,
    url: &str,
    params: &[(String, String)],
) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature) else {
        return false;
    };
    match signature_mac(auth_token, url, params) {
        Some(mac) => mac.verify_slice(&expected).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base_form() -> Vec<(String, String)> {
        form(&[
            ("MessageSid", "SM123456"),
            ("From", "+15551234567"),
            ("To", "+17775553333"),
            ("Body", "Test message from Twilio"),
        ])
    }

    #[test]
    fn test_parse_required_fields() {
        let event = parse_inbound(&base_form()).unwrap();
        assert_eq!(event.message_sid, "SM123456");
        assert_eq!(event.from, "+15551234567");
        assert_eq!(event.to, "+17775553333");
        assert_eq!(event.body, "Test message from Twilio");
        assert_eq!(event.channel, Channel::Sms);
        assert!(event.media.is_empty());
        assert!(event.location.is_none());
    }

    #[test]
    fn test_missing_fields() {
        for name in ["MessageSid", "From", "To", "Body"] {
            let params: Vec<_> = base_form().into_iter().filter(|(k, _)| k != name).collect();
            match parse_inbound(&params) {
                Err(GatewayError::MissingField(field)) => assert_eq!(field, name),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_blank_sender_is_missing() {
        let mut params = base_form();
        params[1].1 = "   ".to_string();
        assert!(matches!(
            parse_inbound(&params),
            Err(GatewayError::MissingField(_))
        ));
    }

    #[test]
    fn test_empty_body_allowed_for_media_only() {
        let mut params = base_form();
        params[3].1 = String::new();
        params.push(("MediaUrl0".to_string(), "https://example/img.jpg".to_string()));
        let event = parse_inbound(&params).unwrap();
        assert_eq!(event.body, "");
        assert_eq!(event.media_urls(), vec!["https://example/img.jpg"]);
    }

    #[test]
    fn test_media_in_order_with_content_types() {
        let mut params = base_form();
        params.extend(form(&[
            ("NumMedia", "2"),
            ("MediaUrl1", "https://example/b.png"),
            ("MediaContentType1", "image/png"),
            ("MediaUrl0", "https://example/a.jpg"),
        ]));
        let event = parse_inbound(&params).unwrap();
        assert_eq!(event.media.len(), 2);
        assert_eq!(event.media[0].url, "https://example/a.jpg");
        assert_eq!(event.media[0].content_type, None);
        assert_eq!(event.media[1].content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_location() {
        let mut params = base_form();
        params.extend(form(&[("Latitude", "37.7749"), ("Longitude", "-122.4194")]));
        let loc = parse_inbound(&params).unwrap().location.unwrap();
        assert_eq!(loc.latitude, 37.7749);
        assert_eq!(loc.longitude, -122.4194);
    }

    #[test]
    fn test_partial_or_invalid_location_ignored() {
        let mut only_lat = base_form();
        only_lat.push(("Latitude".to_string(), "10.0".to_string()));
        assert!(parse_inbound(&only_lat).unwrap().location.is_none());

        let mut out_of_range = base_form();
        out_of_range.extend(form(&[("Latitude", "91"), ("Longitude", "0")]));
        assert!(parse_inbound(&out_of_range).unwrap().location.is_none());

        let mut garbage = base_form();
        garbage.extend(form(&[("Latitude", "north"), ("Longitude", "0")]));
        assert!(parse_inbound(&garbage).unwrap().location.is_none());
    }

    #[test]
    fn test_whatsapp_channel() {
        let mut params = base_form();
        params[1].1 = "whatsapp:+15551234567".to_string();
        let event = parse_inbound(&params).unwrap();
        assert_eq!(event.channel, Channel::WhatsApp);
        assert_eq!(event.from, "whatsapp:+15551234567");
    }

    #[test]
    fn test_signature_roundtrip_is_order_independent() {
        let url = "https://gateway.example.com/webhook/sms";
        let params = base_form();
        let signature = compute_twilio_signature("token", url, &params);

        let mut reversed = params.clone();
        reversed.reverse();
        assert!(validate_twilio_signature("token", &signature, url, &reversed));
    }

    #[test]
    fn test_signature_rejects_tampering() {
        let url = "https://gateway.example.com/webhook/sms";
        let params = base_form();
        let signature = compute_twilio_signature("token", url, &params);

        let mut tampered = params.clone();
        tampered[3].1 = "something else".to_string();
        assert!(!validate_twilio_signature("token", &signature, url, &tampered));
        assert!(!validate_twilio_signature("other", &signature, url, &params));
        assert!(!validate_twilio_signature("token", &signature, "https://evil.example/", &params));
        assert!(!validate_twilio_signature("token", "not base64!", url, &params));
    }
}
