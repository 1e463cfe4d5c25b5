//! Error document output.

use std::io::Write;

use crate::codec::write_json;
use crate::error::Error;
use crate::model::{ApiError, ErrorDocument};

/// Writes `errors` as a JSON:API errors document, keeping their order.
pub fn write_errors<'a, W, I>(writer: W, errors: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a (dyn ApiError + 'a)>,
{
    write_json(writer, &ErrorDocument::from_errors(errors), false, "writing errors")
}
