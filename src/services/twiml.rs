use std::fmt;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use quick_xml::escape::escape;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// The markup document returned to the provider from a webhook call:
/// either an empty acknowledgment or a single reply message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupReply {
    Empty,
    Message(String),
}

impl MarkupReply {
    pub fn from_auto_reply(auto_reply: Option<&str>) -> Self {
        match auto_reply {
            Some(text) if !text.trim().is_empty() => MarkupReply::Message(text.to_string()),
            _ => MarkupReply::Empty,
        }
    }

    pub fn render(&self) -> String {
        match self {
            MarkupReply::Empty => format!("{XML_DECLARATION}<Response/>"),
            MarkupReply::Message(text) => format!(
                "{XML_DECLARATION}<Response><Message>{}</Message></Response>",
                escape(text.as_str())
            ),
        }
    }
}

impl fmt::Display for MarkupReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl IntoResponse for MarkupReply {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "application/xml")], self.render()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reply() {
        let xml = MarkupReply::Empty.render();
        assert_eq!(xml, r#"<?xml version="1.0" encoding="UTF-8"?><Response/>"#);
    }

    #[test]
    fn test_message_reply() {
        let xml = MarkupReply::Message("Thanks, got it".to_string()).render();
        assert!(xml.ends_with("<Response><Message>Thanks, got it</Message></Response>"));
    }

    #[test]
    fn test_message_text_is_escaped() {
        let xml = MarkupReply::Message("Tom & Jerry <3".to_string()).render();
        assert!(xml.contains("<Message>Tom &amp; Jerry &lt;3</Message>"));
    }

    #[test]
    fn test_blank_auto_reply_is_empty() {
        assert_eq!(MarkupReply::from_auto_reply(None), MarkupReply::Empty);
        assert_eq!(MarkupReply::from_auto_reply(Some("  ")), MarkupReply::Empty);
        assert_eq!(
            MarkupReply::from_auto_reply(Some("hi")),
            MarkupReply::Message("hi".to_string())
        );
    }
}
