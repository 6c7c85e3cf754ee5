pub mod inbound;
pub mod outbound;
pub mod response;

pub use inbound::{Channel, GeoLocation, InboundMessageEvent, MediaAttachment, StoredInboundMessage};
pub use outbound::OutboundMessageRequest;
pub use response::ProviderResponse;
