/// Crate-wide result alias.
pub type AnimResult<T> = Result<T, AnimError>;

/// Machine-checkable error category, used in job reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Pre-flight rejection; the job never left `Pending`.
    Validation,
    /// Frame acquisition did not complete in time.
    Timeout,
    /// Source unreadable, corrupt or empty.
    Decode,
    /// Codec boundary failure while producing output.
    Encode,
    /// User-initiated cancellation. Not a failure.
    Cancelled,
    /// Anything else (I/O, process spawning, ...).
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Timeout => "timeout",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug)]
/// Errors raised by the transcoding pipeline.
pub enum AnimError {
    /// Settings or inputs rejected before any frame work.
    #[error("validation error: {0}")]
    Validation(String),

    /// A bounded wait elapsed (after retries, where applicable).
    #[error("timeout error: {0}")]
    Timeout(String),

    /// The source could not be decoded into frames.
    #[error("decode error: {0}")]
    Decode(String),

    /// The codec boundary failed to produce output.
    #[error("encode error: {0}")]
    Encode(String),

    /// The job's cancellation token was observed at a checkpoint.
    #[error("cancelled")]
    Cancelled,

    /// Untyped failure with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimError {
    /// Build an [`AnimError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AnimError::Timeout`].
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Build an [`AnimError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`AnimError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Category tag for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// `true` for failures the acquisition protocol is allowed to retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Prefix the message with job context, keeping the category untouched.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            Self::Validation(m) => Self::Validation(format!("{ctx}: {m}")),
            Self::Timeout(m) => Self::Timeout(format!("{ctx}: {m}")),
            Self::Decode(m) => Self::Decode(format!("{ctx}: {m}")),
            Self::Encode(m) => Self::Encode(format!("{ctx}: {m}")),
            Self::Cancelled => Self::Cancelled,
            Self::Other(e) => Self::Other(e.context(ctx.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
