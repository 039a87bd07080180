//! Session domain: the per-conversation state and the progression engine.

mod engine;
mod history;
mod hydrate;
mod interceptor;
mod message;
mod prompt;
mod reply;

pub use engine::{PhaseProgress, ReportEntry, SendOutcome, SessionEngine, SessionState};
pub use history::HistoryItem;
pub use hydrate::hydrate;
pub use interceptor::{intercept, Interception};
pub use message::{Message, MessageData, MessageId, Role};
pub use prompt::{build_judged_prompt, composite_task, SYSTEM_RULES};
pub use reply::ParsedReply;

use std::collections::BTreeMap;

/// Key-value facts carried forward across phases and hydrated into later
/// phase task templates.
pub type Context = BTreeMap<String, String>;
