//! Gateway adapters: the real HTTP provider and an offline mock.

mod diagnostics;
mod endpoint;
mod http;
mod mock;

pub use diagnostics::{DiagnosticEntry, DiagnosticKind, DiagnosticsLog};
pub use endpoint::{resolve_endpoint, Endpoint};
pub use http::HttpChatGateway;
pub use mock::MockChatGateway;
