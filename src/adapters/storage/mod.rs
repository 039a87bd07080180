//! Storage adapters backed by local JSON files, plus an in-memory store
//! for tests and demos.

mod file_history_store;
mod file_preset_store;
mod in_memory_history_store;

pub use file_history_store::FileHistoryStore;
pub use file_preset_store::FilePresetStore;
pub use in_memory_history_store::InMemoryHistoryStore;
