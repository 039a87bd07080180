//! Domain layer: mode catalog, session state, and the progression engine.

pub mod catalog;
pub mod foundation;
pub mod session;
