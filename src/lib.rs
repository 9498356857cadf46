//! dub-fetch library
//!
//! Downloads a video once and merges it with each of its dubbed audio tracks,
//! producing one file per language in a dated, language-prefixed naming scheme.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, ErrorClass, Result};
