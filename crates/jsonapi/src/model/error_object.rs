//! Error objects and the capabilities used to build them.
//!
//! Any error type can be rendered as an [`ErrorObject`] by implementing
//! [`ApiError`]. Each capability method defaults to absent, so an empty
//! `impl ApiError for MyError {}` is enough; the codec falls back to the
//! type name for the title and the `Display` text for the detail.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Non-standard meta information attached to an error object.
pub type Meta = Map<String, Value>;

/// A describable failure with optional error-object capabilities.
///
/// Every capability is checked independently; returning `None` means the
/// error does not expose it.
pub trait ApiError: fmt::Display {
    /// Name of the concrete error type, used for the fallback title.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Unique identifier for this occurrence of the problem.
    fn id(&self) -> Option<String> {
        None
    }

    /// Short summary that does not change between occurrences.
    fn title(&self) -> Option<String> {
        None
    }

    /// Explanation specific to this occurrence.
    fn detail(&self) -> Option<String> {
        None
    }

    /// HTTP status code, as a string.
    fn status(&self) -> Option<String> {
        None
    }

    /// Application-specific error code.
    fn code(&self) -> Option<String> {
        None
    }

    fn meta(&self) -> Option<Meta> {
        None
    }
}

/// A JSON:API error object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl ErrorObject {
    /// Builds an error object by probing each capability of `err`.
    pub fn from_error(err: &dyn ApiError) -> Self {
        Self {
            id: err.id().unwrap_or_default(),
            title: err
                .title()
                .unwrap_or_else(|| format!("Encountered error of type: {}", err.type_name())),
            detail: err.detail().unwrap_or_else(|| err.to_string()),
            status: err.status().unwrap_or_default(),
            code: err.code().unwrap_or_default(),
            meta: err.meta(),
        }
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {} {}", self.title, self.detail)
    }
}

impl std::error::Error for ErrorObject {}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl ApiError for ErrorObject {
    fn id(&self) -> Option<String> {
        non_empty(&self.id)
    }

    fn title(&self) -> Option<String> {
        Some(self.title.clone())
    }

    fn detail(&self) -> Option<String> {
        Some(self.detail.clone())
    }

    fn status(&self) -> Option<String> {
        non_empty(&self.status)
    }

    fn code(&self) -> Option<String> {
        non_empty(&self.code)
    }

    fn meta(&self) -> Option<Meta> {
        self.meta.clone()
    }
}

// Foreign errors expose no capabilities and take the fallbacks.
impl ApiError for std::io::Error {}
impl ApiError for serde_json::Error {}
impl ApiError for std::fmt::Error {}
impl ApiError for Box<dyn std::error::Error + Send + Sync> {}

/// A JSON:API errors document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    /// Converts each error to an error object, keeping input order.
    pub fn from_errors<'a, I>(errors: I) -> Self
    where
        I: IntoIterator<Item = &'a (dyn ApiError + 'a)>,
    {
        Self {
            errors: errors.into_iter().map(ErrorObject::from_error).collect(),
        }
    }
}
