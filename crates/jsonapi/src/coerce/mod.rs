//! Type coercion between wire values and record fields.
//!
//! [`Attribute`] covers attribute values (numbers, text, booleans, time,
//! optionals and lists); [`Identity`] covers the primary id field.

pub mod attribute;
pub mod identity;

pub use attribute::{Attribute, kind_name, parse_iso8601};
pub use identity::Identity;
