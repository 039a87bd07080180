//! Model reply interpretation.
//!
//! The model is asked for strict JSON but cannot be trusted to deliver it.
//! Interpretation is fail-safe: anything that is not a well-formed judgment
//! with `is_passed` exactly boolean `true` counts as not-passed, and parse
//! failures fall back to showing the raw text so the user can still read
//! whatever came back.

use serde::Deserialize;
use serde_json::Value;

/// A model reply after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// Well-formed judgment following the expected JSON contract.
    Judged {
        diagnosis: String,
        question: String,
        passed: bool,
    },
    /// Anything else; shown verbatim and never advances a phase.
    Unparsed { raw_text: String },
}

#[derive(Deserialize)]
struct JudgedPayload {
    diagnosis: String,
    question: String,
    #[serde(default)]
    is_passed: Value,
}

impl ParsedReply {
    /// Interprets raw model output, stripping surrounding code fences first.
    pub fn interpret(raw_text: &str) -> Self {
        let candidate = strip_code_fences(raw_text);
        match serde_json::from_str::<JudgedPayload>(candidate) {
            Ok(payload) => Self::Judged {
                diagnosis: payload.diagnosis,
                question: payload.question,
                // Truthy non-booleans do not count.
                passed: payload.is_passed == Value::Bool(true),
            },
            Err(_) => Self::Unparsed {
                raw_text: raw_text.to_string(),
            },
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Self::Judged { passed: true, .. })
    }

    /// Text to append to the transcript: diagnosis emphasized with the
    /// question following, or the raw text when unparsed.
    pub fn display_text(&self) -> String {
        match self {
            Self::Judged {
                diagnosis,
                question,
                ..
            } => format!("【{diagnosis}】\n\n{question}"),
            Self::Unparsed { raw_text } => raw_text.clone(),
        }
    }
}

/// Removes a leading ```/```json fence and a trailing ``` fence if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
