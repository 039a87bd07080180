//! Vague-answer interceptor.
//!
//! A lexical guardrail applied before any phase advancement: answers that
//! dodge the question ("不知道", "跳过"...) are blocked with a fixed warning
//! demanding a concrete fact. This is deliberately crude -- it matches
//! markers, it does not understand anything.

/// Markers that flag an answer as information-free.
const VAGUE_MARKERS: [&str; 5] = ["不知道", "忘了", "不清楚", "没想好", "跳过"];

/// The fixed warning shown for blocked input.
pub const VAGUE_WARNING: &str =
    "⚠️ 核心逻辑缺失！请补充具体事实，哪怕是目前遇到的困难，也不能直接跳过。";

/// Result of the interception check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interception {
    pub blocked: bool,
    pub warning: Option<String>,
}

impl Interception {
    fn allowed() -> Self {
        Self {
            blocked: false,
            warning: None,
        }
    }

    fn blocked() -> Self {
        Self {
            blocked: true,
            warning: Some(VAGUE_WARNING.to_string()),
        }
    }
}

/// Classifies input as blocked or allowed. Pure, total, never panics.
///
/// Empty input is allowed; guarding against empty submissions is the
/// caller's job.
pub fn intercept(text: &str) -> Interception {
    let trimmed = text.trim();
    if VAGUE_MARKERS.iter().any(|marker| trimmed.contains(marker)) {
        Interception::blocked()
    } else {
        Interception::allowed()
    }
}
