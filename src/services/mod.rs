//! External services.

pub mod ytdlp;
