//! Catalog service holding the registered interview modes.
//!
//! An explicit service instance injected into the engine at construction,
//! never a module-level global. Custom modes registered at runtime are
//! visible to all subsequent `init_mode` calls on engines sharing the
//! catalog value.

use super::builtin::builtin_modes;
use super::mode::Mode;
use crate::domain::foundation::DomainError;

/// Registry of interview modes, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModeCatalog {
    modes: Vec<Mode>,
}

impl ModeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with the built-in diagnostic modes.
    pub fn with_builtins() -> Self {
        Self {
            modes: builtin_modes(),
        }
    }

    /// Looks up a mode by id.
    pub fn get(&self, id: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.id() == id)
    }

    /// Returns true if a mode with this id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Registers a mode, replacing any previous registration of the same id.
    ///
    /// Replacement is what makes re-importing a custom mode after a fresh
    /// process start recover sessions saved under it. Sessions already in
    /// progress keep their own phase snapshot and are unaffected.
    pub fn register(&mut self, mode: Mode) -> Result<(), DomainError> {
        if let Some(existing) = self.modes.iter_mut().find(|m| m.id() == mode.id()) {
            *existing = mode;
        } else {
            self.modes.push(mode);
        }
        Ok(())
    }

    /// The display name for a mode id, falling back to the id itself.
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// All registered modes in registration order.
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }
}
