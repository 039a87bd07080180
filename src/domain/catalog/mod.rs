//! Mode catalog: named, ordered sets of interview phases.

mod builtin;
mod catalog;
mod import;
mod mode;

pub use catalog::ModeCatalog;
pub use import::{parse_mode, ImportError};
pub use mode::{Mode, Phase};
