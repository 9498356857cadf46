//! Core business logic modules.

pub mod listing;
pub mod naming;
pub mod orchestrator;
pub mod resolver;
pub mod safety;
pub mod sufix;
