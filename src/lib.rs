//! DeepMiner - Guided-Interview Diagnostic Engine
//!
//! This crate implements the phase-progression engine behind a guided
//! diagnostic interview: a mode is an ordered set of phases, each answer is
//! judged by an external language model, and passing answers advance the
//! session through the phases until a report can be produced.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
