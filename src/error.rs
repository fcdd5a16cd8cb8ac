//! Error types for attribute conversions.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Summary used for every diagnostic produced from a [`BridgeError`].
pub const CONVERSION_ERROR_SUMMARY: &str = "Value Conversion Error";

/// Errors that can occur while converting between framework values and
/// native collections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A framework value is malformed or does not match the expected shape.
    #[error("Decode error at '{path}': {message}")]
    Decode {
        /// Attribute path of the offending value (empty for the root).
        path: String,
        /// What went wrong.
        message: String,
    },

    /// A native value cannot be represented in the target schema.
    #[error("Encode error at '{path}': {message}")]
    Encode {
        /// Attribute path of the offending value (empty for the root).
        path: String,
        /// What went wrong.
        message: String,
    },
}

impl BridgeError {
    /// Create a decode error.
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Get the attribute path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::Decode { path, .. } => path,
            Self::Encode { path, .. } => path,
        }
    }

    /// Get the error message without the path prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Decode { message, .. } => message,
            Self::Encode { message, .. } => message,
        }
    }

    /// Whether this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

impl From<BridgeError> for Diagnostic {
    fn from(err: BridgeError) -> Self {
        let detail = match &err {
            BridgeError::Decode { message, .. } => {
                format!("Unable to decode attribute value: {}", message)
            },
            BridgeError::Encode { message, .. } => {
                format!("Unable to encode attribute value: {}", message)
            },
        };
        let diagnostic = Diagnostic::error(CONVERSION_ERROR_SUMMARY).with_detail(detail);
        if err.path().is_empty() {
            diagnostic
        } else {
            diagnostic.with_attribute(err.path())
        }
    }
}
