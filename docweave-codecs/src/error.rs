//! Error types for codec dispatch and conversion

use thiserror::Error;

/// Errors raised while selecting a codec or converting through it.
///
/// Partial decodes are not errors: content a codec cannot map is logged with `tracing::warn!`
/// and skipped. Nothing here is retried.
#[derive(Error, Debug)]
pub enum CodecError {
    /// No registered codec handles the content or format
    #[error("no codec could be found for '{searched}'")]
    NoCodecMatch { searched: String },

    /// The codec exists but does not implement the requested direction
    #[error("codec '{codec}' does not support {operation}")]
    UnsupportedOperation {
        codec: String,
        operation: &'static str,
    },

    /// The input could not be parsed
    #[error("malformed {format} input: {message}")]
    MalformedInput { format: String, message: String },

    /// Encoding needs either an output path or an explicit format
    #[error("no output path or format given to encode to")]
    MissingTarget,

    /// The external renderer failed or could not be started
    #[error("renderer error: {0}")]
    Renderer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub fn malformed(format: impl Into<String>, message: impl ToString) -> Self {
        CodecError::MalformedInput {
            format: format.into(),
            message: message.to_string(),
        }
    }

    pub fn unsupported(codec: impl Into<String>, operation: &'static str) -> Self {
        CodecError::UnsupportedOperation {
            codec: codec.into(),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_codec() {
        let err = CodecError::unsupported("pdf", "decoding");
        assert_eq!(err.to_string(), "codec 'pdf' does not support decoding");

        let err = CodecError::malformed("json", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "malformed json input: expected value at line 1"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CodecError = io.into();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
