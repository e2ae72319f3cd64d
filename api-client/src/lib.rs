#![deny(clippy::unwrap_used, clippy::expect_used)]

mod attachments;
mod client;
mod config;
mod diagnostics;
mod envelope;
mod error;
mod handle;
mod session;
mod types;

pub use attachments::Attachment;
pub use attachments::AttachmentGroup;
pub use attachments::field_keys;
pub use client::ApiClient;
pub use config::CallOptions;
pub use config::ClientConfig;
pub use config::EffectiveConfig;
pub use config::RouteStyle;
pub use diagnostics::diagnostic_line;
pub use envelope::RESERVED_JSON_FIELD;
pub use envelope::RequestEnvelope;
pub use error::ClientError;
pub use error::Result;
pub use handle::Reaction;
pub use handle::ResultHandle;
pub use reqwest::StatusCode;
pub use session::SessionState;
pub use types::ApplicationError;
pub use types::CallError;
pub use types::ResponseResult;
pub use types::TransportError;
pub use types::classify_response;
