//! Durable session snapshots.
//!
//! A `HistoryItem` is the serialized form of one session as written to the
//! history file. Field names stay camelCase so snapshots written by earlier
//! builds keep loading. At most one item in a stored list is `active`; the
//! active item mirrors the live session after every mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Context, Message};
use crate::domain::catalog::Phase;
use crate::domain::foundation::Timestamp;

/// Serializable snapshot of exactly one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Stable across re-snapshots of the same conversation: derived from the
    /// first message's id, or the snapshot timestamp if no messages exist.
    pub id: String,
    pub mode_id: String,
    pub title: String,
    pub timestamp: Timestamp,
    pub active: bool,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub context: Context,
    pub current_phase: u32,
    pub is_completed: bool,
    /// Phase snapshot taken at session start, so sessions survive later
    /// catalog mutation (custom mode re-import, mode updates).
    pub phases: BTreeMap<u32, Phase>,
}

impl HistoryItem {
    /// Derives the stable snapshot id for a transcript.
    pub fn derive_id(messages: &[Message], now: &Timestamp) -> String {
        match messages.first() {
            Some(first) => first.id().to_string(),
            None => now.as_unix_millis().to_string(),
        }
    }

    /// Title shown in the history list: the first user answer, truncated.
    pub fn derive_title(messages: &[Message], fallback: &str) -> String {
        const MAX_CHARS: usize = 24;
        match messages.iter().find(|m| m.is_user()) {
            Some(first_answer) => {
                let content = first_answer.content().trim();
                if content.chars().count() <= MAX_CHARS {
                    content.to_string()
                } else {
                    let head: String = content.chars().take(MAX_CHARS).collect();
                    format!("{head}…")
                }
            }
            None => fallback.to_string(),
        }
    }
}

/// Marks exactly `active_id` active, clearing the flag everywhere else.
pub fn mark_active(items: &mut [HistoryItem], active_id: Option<&str>) {
    for item in items.iter_mut() {
        item.active = active_id == Some(item.id.as_str());
    }
}
