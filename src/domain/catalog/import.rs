//! Custom mode ingestion from user-submitted JSON.
//!
//! Accepts the current `{id, name, phases}` shape as well as the legacy
//! `{mode_id, mode_name, ...}` aliases. Every phase must carry a non-empty
//! title and task; structural problems surface as a user-facing error and
//! nothing is registered.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use super::mode::{Mode, Phase};
use crate::domain::foundation::DomainError;

/// Errors raised while parsing a custom mode definition.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("定义不是合法的 JSON：{0}")]
    Malformed(String),

    #[error("阶段编号 '{0}' 不是正整数")]
    BadPhaseKey(String),

    #[error("模式定义无效：{0}")]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Deserialize)]
struct ModeDefinition {
    #[serde(alias = "mode_id")]
    id: String,
    #[serde(alias = "mode_name")]
    name: String,
    phases: BTreeMap<String, PhaseDefinition>,
}

#[derive(Debug, Deserialize)]
struct PhaseDefinition {
    title: String,
    task: String,
}

/// Parses and validates a custom mode submitted as JSON.
pub fn parse_mode(json: &str) -> Result<Mode, ImportError> {
    let def: ModeDefinition =
        serde_json::from_str(json).map_err(|e| ImportError::Malformed(e.to_string()))?;

    let mut phases = BTreeMap::new();
    for (raw_key, phase_def) in def.phases {
        let key: u32 = raw_key
            .trim()
            .parse()
            .ok()
            .filter(|k| *k > 0)
            .ok_or_else(|| ImportError::BadPhaseKey(raw_key.clone()))?;
        let phase = Phase::new(phase_def.title, phase_def.task)?;
        phases.insert(key, phase);
    }

    Ok(Mode::new(def.id, def.name, phases)?)
}
