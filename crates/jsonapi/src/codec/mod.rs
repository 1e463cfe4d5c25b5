//! JSON encoding and decoding of resource documents.
//!
//! [`marshal`] turns records into documents, [`unmarshal`] turns documents
//! back into records, and [`errors`] writes error documents.

pub mod errors;
pub mod marshal;
pub mod unmarshal;

use std::io::{Read, Write};

use serde::Serialize;

use crate::error::Error;
use crate::model::Document;

pub use errors::write_errors;
pub use marshal::{
    MarshalOptions, Marshaler, Topology, marshal_many, marshal_one, write_many, write_one,
};
pub use unmarshal::{
    Unmarshaler, unmarshal_document, unmarshal_many, unmarshal_many_document, unmarshal_one,
};

/// Reads a document from `reader`.
///
/// Anything that is not a JSON object with a `data` member is an
/// [`Error::InvalidDocument`].
pub fn decode_document<Rd: Read>(reader: Rd) -> Result<Document, Error> {
    serde_json::from_reader(reader).map_err(|err| Error::from_json("reading document", err))
}

/// Writes `document` to `writer`, indented when `pretty` is set.
pub fn encode_document<W: Write>(
    writer: W,
    document: &Document,
    pretty: bool,
) -> Result<(), Error> {
    write_json(writer, document, pretty, "writing document")
}

fn write_json<W: Write, T: Serialize>(
    mut writer: W,
    value: &T,
    pretty: bool,
    context: &'static str,
) -> Result<(), Error> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    };
    written.map_err(|err| Error::from_json(context, err))?;
    writer.flush().map_err(|err| Error::Io {
        context,
        message: err.to_string(),
    })
}
