pub mod messaging;
pub mod phone;
pub mod store;
pub mod twiml;
pub mod webhook;
