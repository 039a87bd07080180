//! Message entity for interview sessions.
//!
//! Messages are append-only within a session; array position is the sole
//! ordering signal. The id only has to be unique -- the first message's id
//! doubles as the stable session id for history snapshots.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::Timestamp;

/// Unique identifier for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The interviewee's answer.
    User,
    /// An engine-produced question or judgment.
    System,
    /// A recoverable failure surfaced inline in the transcript.
    SystemWarning,
}

/// Phase metadata attached to system messages for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
}

impl MessageData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            questions: None,
        }
    }
}

/// One entry in the session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    /// The phase this message belongs to; warnings carry none.
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<u32>,
    timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<MessageData>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>, phase: Option<u32>, data: Option<MessageData>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            phase,
            timestamp: Timestamp::now(),
            data,
        }
    }

    /// Creates a user answer tagged with its phase.
    pub fn user(content: impl Into<String>, phase: u32) -> Self {
        Self::new(Role::User, content, Some(phase), None)
    }

    /// Creates an engine question/judgment tagged with its phase.
    pub fn system(content: impl Into<String>, phase: u32, data: Option<MessageData>) -> Self {
        Self::new(Role::System, content, Some(phase), data)
    }

    /// Creates an inline failure notice.
    pub fn system_warning(content: impl Into<String>) -> Self {
        Self::new(Role::SystemWarning, content, None, None)
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn phase(&self) -> Option<u32> {
        self.phase
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn data(&self) -> Option<&MessageData> {
        self.data.as_ref()
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_warning(&self) -> bool {
        self.role == Role::SystemWarning
    }
}
