//! Error types for marshaling and unmarshaling documents.

use serde_json::Value;
use thiserror::Error;

use crate::model::{ApiError, Meta};

/// Failure taxonomy shared by every operation in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Malformed field tag on a record type
    MalformedFieldTag,
    /// E002: Input is not a well formed document
    InvalidDocument,
    /// E003: Resource id does not fit the identity field
    InvalidResourceId,
    /// E004: Attribute value does not fit the field type
    InvalidFieldType,
    /// E005: Attribute is not an ISO 8601 timestamp
    InvalidIso8601Timestamp,
    /// E006: Reading or writing the byte stream failed
    Io,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedFieldTag => "E001",
            ErrorCode::InvalidDocument => "E002",
            ErrorCode::InvalidResourceId => "E003",
            ErrorCode::InvalidFieldType => "E004",
            ErrorCode::InvalidIso8601Timestamp => "E005",
            ErrorCode::Io => "E006",
        }
    }

    /// Short human-readable summary, stable across occurrences.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::MalformedFieldTag => "Malformed field tag",
            ErrorCode::InvalidDocument => "Invalid document",
            ErrorCode::InvalidResourceId => "Invalid resource id",
            ErrorCode::InvalidFieldType => "Invalid type",
            ErrorCode::InvalidIso8601Timestamp => "Invalid ISO 8601 timestamp",
            ErrorCode::Io => "I/O failure",
        }
    }
}

/// Error raised by the marshal and unmarshal engines.
///
/// Every call reports at most one error: the first problem encountered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("[E001] malformed field tag {tag:?} on {record}: {reason}")]
    MalformedFieldTag {
        record: &'static str,
        tag: &'static str,
        reason: &'static str,
    },

    #[error("[E002] invalid document: {reason}")]
    InvalidDocument { reason: String },

    #[error("[E003] resource id {id:?} is not a valid {expected}")]
    InvalidResourceId { id: String, expected: &'static str },

    #[error("[E004] invalid type for field {field:?}: received {received}, expected {expected}")]
    InvalidFieldType {
        field: String,
        received: &'static str,
        expected: &'static str,
    },

    #[error("[E005] attribute {field:?} is not an ISO 8601 timestamp: {value}")]
    InvalidIso8601Timestamp { field: String, value: String },

    #[error("[E006] {context} failed: {message}")]
    Io { context: &'static str, message: String },
}

impl Error {
    /// Returns the taxonomy entry for this error.
    pub fn kind(&self) -> ErrorCode {
        match self {
            Error::MalformedFieldTag { .. } => ErrorCode::MalformedFieldTag,
            Error::InvalidDocument { .. } => ErrorCode::InvalidDocument,
            Error::InvalidResourceId { .. } => ErrorCode::InvalidResourceId,
            Error::InvalidFieldType { .. } => ErrorCode::InvalidFieldType,
            Error::InvalidIso8601Timestamp { .. } => ErrorCode::InvalidIso8601Timestamp,
            Error::Io { .. } => ErrorCode::Io,
        }
    }

    pub(crate) fn invalid_document(reason: impl Into<String>) -> Self {
        Error::InvalidDocument { reason: reason.into() }
    }

    /// Maps a `serde_json` failure: stream errors become `Io`, the rest
    /// mean the input was not a document.
    pub(crate) fn from_json(context: &'static str, err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io { context, message: err.to_string() }
        } else {
            Error::invalid_document(err.to_string())
        }
    }
}

impl ApiError for Error {
    fn title(&self) -> Option<String> {
        Some(self.kind().title().to_string())
    }

    fn detail(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn status(&self) -> Option<String> {
        let status = match self.kind() {
            ErrorCode::MalformedFieldTag | ErrorCode::Io => "500",
            _ => "400",
        };
        Some(status.to_string())
    }

    fn code(&self) -> Option<String> {
        Some(self.kind().code().to_string())
    }

    fn meta(&self) -> Option<Meta> {
        let mut meta = Meta::new();
        match self {
            Error::InvalidFieldType { field, received, expected } => {
                meta.insert("field".into(), Value::from(field.as_str()));
                meta.insert("received".into(), Value::from(*received));
                meta.insert("expected".into(), Value::from(*expected));
            }
            Error::InvalidIso8601Timestamp { field, .. } => {
                meta.insert("field".into(), Value::from(field.as_str()));
            }
            Error::InvalidResourceId { id, expected } => {
                meta.insert("id".into(), Value::from(id.as_str()));
                meta.insert("expected".into(), Value::from(*expected));
            }
            _ => return None,
        }
        Some(meta)
    }
}
