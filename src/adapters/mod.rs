//! Adapters - concrete implementations of the ports.

pub mod gateway;
pub mod storage;
