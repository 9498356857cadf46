//! Error types for dub-fetch.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad error category, used for exit codes and abort messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Safety,
    ToolInvocation,
    FormatUnavailable,
    Filesystem,
    Other,
}

impl ErrorClass {
    /// Process exit code for this class.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorClass::Validation => 2,
            ErrorClass::Safety => 3,
            ErrorClass::ToolInvocation => 4,
            ErrorClass::FormatUnavailable => 5,
            ErrorClass::Filesystem => 6,
            ErrorClass::Other => 1,
        }
    }
}

/// Main error type for dub-fetch.
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("Invalid item id: {0}")]
    InvalidItemId(String),

    #[error("Invalid language map: {0}")]
    InvalidLanguageMap(String),

    #[error("Failed to parse filename: {0}")]
    ParseError(String),

    #[error("Conflicting format markers: file is already f{existing}, refusing f{requested}")]
    ConflictingFormatMarker { existing: String, requested: String },

    #[error("Backup marker needs a format marker first: {0}")]
    MissingFormatMarker(String),

    #[error("Invalid format code: {0}")]
    InvalidFormatCode(String),

    // Safety errors
    #[error("Working directory {dir} still holds files from today or undated files: {}", .files.join(", "))]
    UnsafeWorkingDirectory { dir: String, files: Vec<String> },

    #[error("Run declined at confirmation")]
    Declined,

    // Tool errors
    #[error("Download tool not found: {0}. Install yt-dlp: pip install -U yt-dlp")]
    ToolNotFound(String),

    #[error("Download tool failed for selector {selector} (exit code {code:?}): {detail}")]
    ToolInvocation {
        selector: String,
        code: Option<i32>,
        detail: String,
    },

    #[error("Requested format is not available: {0}")]
    FormatUnavailable(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("Expected exactly one new file for {item}, found {}: [{}]", .files.len(), .files.join(", "))]
    UnexpectedDownloads { item: String, files: Vec<String> },

    #[error("Intermediate files left behind: {}", .0.join(", "))]
    LeftoverFiles(Vec<String>),

    #[error("Checksum mismatch after copying: {0}")]
    ChecksumMismatch(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Category this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::InvalidItemId(_)
            | Error::InvalidLanguageMap(_)
            | Error::ParseError(_)
            | Error::ConflictingFormatMarker { .. }
            | Error::MissingFormatMarker(_)
            | Error::InvalidFormatCode(_) => ErrorClass::Validation,
            Error::UnsafeWorkingDirectory { .. } | Error::Declined => ErrorClass::Safety,
            Error::ToolNotFound(_) | Error::ToolInvocation { .. } => ErrorClass::ToolInvocation,
            Error::FormatUnavailable(_) => ErrorClass::FormatUnavailable,
            Error::PathNotFound(_)
            | Error::NotADirectory(_)
            | Error::FileNotFound(_)
            | Error::FileAlreadyExists(_)
            | Error::UnexpectedDownloads { .. }
            | Error::LeftoverFiles(_)
            | Error::ChecksumMismatch(_)
            | Error::Io(_) => ErrorClass::Filesystem,
            Error::Json(_) | Error::Other(_) => ErrorClass::Other,
        }
    }
}
