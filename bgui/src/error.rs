use thiserror::Error;

/// Fatal conditions that abort a parse with no `BguiFile` produced.
///
/// Everything else the parser encounters is a recoverable anomaly and is
/// reported as a [`crate::Warning`] alongside a successfully returned model.
#[derive(Error, Debug)]
pub enum BguiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too short: {len} bytes (need at least {min})")]
    FileTooShort { len: usize, min: usize },

    #[error("register signature not found (scanned {file_len} bytes)")]
    RegisterNotFound { file_len: usize },
}

pub type Result<T> = std::result::Result<T, BguiError>;
