//! Mode and Phase entities.
//!
//! A mode is an ordered set of phases. Phase keys are positive integers;
//! iteration order is always numeric (phase 10 comes after phase 2, never
//! between 1 and 2), which `BTreeMap<u32, _>` gives us for free.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

/// One step of an interview: a short title plus the task the phase must
/// elicit. The task is natural language and may carry `{{variable}}`
/// placeholders hydrated from session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub title: String,
    pub task: String,
}

impl Phase {
    /// Creates a phase, rejecting empty title or task.
    pub fn new(title: impl Into<String>, task: impl Into<String>) -> Result<Self, DomainError> {
        let title = title.into();
        let task = task.into();
        if title.trim().is_empty() {
            return Err(DomainError::empty_field("title"));
        }
        if task.trim().is_empty() {
            return Err(DomainError::empty_field("task"));
        }
        Ok(Self { title, task })
    }
}

/// A named, ordered set of interview phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    id: String,
    name: String,
    phases: BTreeMap<u32, Phase>,
}

impl Mode {
    /// Creates a mode from validated phases.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if id or name is empty
    /// - `InvalidModeDefinition` if the phase map is empty
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phases: BTreeMap<u32, Phase>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(DomainError::empty_field("id"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::empty_field("name"));
        }
        if phases.is_empty() {
            return Err(DomainError::invalid_mode("a mode needs at least one phase"));
        }
        Ok(Self { id, name, phases })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The phases in numeric key order.
    pub fn phases(&self) -> &BTreeMap<u32, Phase> {
        &self.phases
    }

    /// Looks up a single phase.
    pub fn phase(&self, key: u32) -> Option<&Phase> {
        self.phases.get(&key)
    }

    /// The first phase in numeric order.
    pub fn first_phase(&self) -> (u32, &Phase) {
        // Non-empty is a construction invariant.
        let (key, phase) = self.phases.iter().next().unwrap();
        (*key, phase)
    }

    /// The phase following `key` in numeric order, if any.
    pub fn phase_after(&self, key: u32) -> Option<(u32, &Phase)> {
        // Excluded bound: `+ 1` would overflow on a u32::MAX phase key.
        self.phases
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, p)| (*k, p))
    }

    /// Appends a phase after the current last key.
    ///
    /// Modes referenced by active sessions only ever grow; existing phases
    /// are never rewritten.
    pub fn append_phase(&mut self, phase: Phase) -> u32 {
        let next_key = self
            .phases
            .keys()
            .next_back()
            .map_or(1, |k| k.saturating_add(1));
        self.phases.insert(next_key, phase);
        next_key
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }
}
