//! Conversion between attribute values and field types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Number, Value};

use crate::error::Error;
use crate::schema::{FieldDescriptor, TimeEncoding};

/// Layout for ISO 8601 attributes; fractional seconds are accepted on input.
const ISO8601_LAYOUT: &str = "%Y-%m-%dT%H:%M:%SZ";
const ISO8601_PARSE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// A field type that can be stored as a resource attribute.
pub trait Attribute: Sized {
    /// Kind name reported as `expected` in type mismatches.
    const KIND: &'static str;
    /// The field is an `Option`: null decodes to `None`.
    const OPTIONAL: bool = false;
    /// The field holds time values, so `iso8601` applies to it.
    const TIME: bool = false;

    fn to_attribute(&self, encoding: TimeEncoding) -> Value;

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error>;

    /// Zero value check used by `omitempty`.
    fn is_empty_attribute(&self) -> bool;
}

/// Name of the dynamic kind of an attribute value.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(value: &Value, field: &FieldDescriptor, expected: &'static str) -> Error {
    Error::InvalidFieldType {
        field: field.name.to_string(),
        received: kind_name(value),
        expected,
    }
}

/// Reads an integral number, accepting floats with no fractional part.
fn integral(value: &Value) -> Option<i128> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    let f = n.as_f64()?;
    // Out of range magnitudes saturate and then fail the width check.
    (f.is_finite() && f.fract() == 0.0).then_some(f as i128)
}

macro_rules! impl_integer_attribute {
    ($($ty:ty => $kind:literal),* $(,)?) => {$(
        impl Attribute for $ty {
            const KIND: &'static str = $kind;

            fn to_attribute(&self, _encoding: TimeEncoding) -> Value {
                Value::from(*self)
            }

            fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
                integral(value)
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .ok_or_else(|| mismatch(value, field, $kind))
            }

            fn is_empty_attribute(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

impl_integer_attribute! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
}

impl Attribute for f64 {
    const KIND: &'static str = "f64";

    fn to_attribute(&self, _encoding: TimeEncoding) -> Value {
        Value::from(*self)
    }

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
        match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(value, field, "f64")),
            _ => Err(mismatch(value, field, "f64")),
        }
    }

    fn is_empty_attribute(&self) -> bool {
        *self == 0.0
    }
}

impl Attribute for f32 {
    const KIND: &'static str = "f32";

    fn to_attribute(&self, _encoding: TimeEncoding) -> Value {
        // Widen through the shortest decimal form so 1.1f32 is written as 1.1.
        let widened = self.to_string().parse::<f64>().unwrap_or_else(|_| f64::from(*self));
        Number::from_f64(widened).map_or(Value::Null, Value::Number)
    }

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| mismatch(value, field, "f32")),
            _ => Err(mismatch(value, field, "f32")),
        }
    }

    fn is_empty_attribute(&self) -> bool {
        *self == 0.0
    }
}

impl Attribute for bool {
    const KIND: &'static str = "bool";

    fn to_attribute(&self, _encoding: TimeEncoding) -> Value {
        Value::Bool(*self)
    }

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
        value.as_bool().ok_or_else(|| mismatch(value, field, "bool"))
    }

    fn is_empty_attribute(&self) -> bool {
        !*self
    }
}

impl Attribute for String {
    const KIND: &'static str = "string";

    fn to_attribute(&self, _encoding: TimeEncoding) -> Value {
        Value::String(self.clone())
    }

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(value, field, "string"))
    }

    fn is_empty_attribute(&self) -> bool {
        self.is_empty()
    }
}

impl Attribute for DateTime<Utc> {
    const KIND: &'static str = "i64";
    const TIME: bool = true;

    fn to_attribute(&self, encoding: TimeEncoding) -> Value {
        match encoding {
            TimeEncoding::UnixSeconds => Value::from(self.timestamp()),
            TimeEncoding::Iso8601 => Value::String(self.format(ISO8601_LAYOUT).to_string()),
        }
    }

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
        match field.time_encoding {
            TimeEncoding::UnixSeconds => unix_seconds(value)
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(|| mismatch(value, field, "i64")),
            TimeEncoding::Iso8601 => value
                .as_str()
                .and_then(parse_iso8601)
                .ok_or_else(|| Error::InvalidIso8601Timestamp {
                    field: field.name.to_string(),
                    value: value.to_string(),
                }),
        }
    }

    fn is_empty_attribute(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }
}

/// Whole seconds from a numeric attribute; fractions are truncated.
fn unix_seconds(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fraction]Z`.
pub fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, ISO8601_PARSE_LAYOUT)
        .ok()
        .map(|naive| naive.and_utc())
}

impl<T: Attribute> Attribute for Option<T> {
    const KIND: &'static str = T::KIND;
    const OPTIONAL: bool = true;
    const TIME: bool = T::TIME;

    fn to_attribute(&self, encoding: TimeEncoding) -> Value {
        match self {
            Some(inner) => inner.to_attribute(encoding),
            None => Value::Null,
        }
    }

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_attribute(value, field).map(Some)
    }

    fn is_empty_attribute(&self) -> bool {
        self.is_none()
    }
}

impl<T: Attribute> Attribute for Vec<T> {
    const KIND: &'static str = "array";
    const TIME: bool = T::TIME;

    fn to_attribute(&self, encoding: TimeEncoding) -> Value {
        Value::Array(self.iter().map(|item| item.to_attribute(encoding)).collect())
    }

    fn from_attribute(value: &Value, field: &FieldDescriptor) -> Result<Self, Error> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| T::from_attribute(item, field))
                .collect(),
            _ => Err(mismatch(value, field, "array")),
        }
    }

    fn is_empty_attribute(&self) -> bool {
        self.is_empty()
    }
}

/// Raw values pass through untouched, for nested attribute structures.
impl Attribute for Value {
    const KIND: &'static str = "any";
    const OPTIONAL: bool = true;

    fn to_attribute(&self, _encoding: TimeEncoding) -> Value {
        self.clone()
    }

    fn from_attribute(value: &Value, _field: &FieldDescriptor) -> Result<Self, Error> {
        Ok(value.clone())
    }

    fn is_empty_attribute(&self) -> bool {
        self.is_null()
    }
}
