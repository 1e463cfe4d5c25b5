//! JSON:API resource documents for plain Rust records.
//!
//! This crate marshals graphs of records into JSON:API documents and
//! unmarshals documents back into records. Record types describe their
//! fields once, through a table of tagged accessors.
//!
//! # Overview
//!
//! - **Nodes**: every record becomes a `(type, id)` node with attributes and
//!   relationships
//! - **Topologies**: related records are embedded in place or sideloaded into
//!   a deduplicated `included` list
//! - **Errors**: any error type can be rendered as a JSON:API error object
//!
//! # Quick Start
//!
//! ```rust
//! use jsonapi::{marshal_one, unmarshal_document, Field, MarshalOptions, Resource};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Comment {
//!     id: u64,
//!     body: String,
//! }
//!
//! impl Resource for Comment {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Field::primary("primary,comments", |c: &Comment| &c.id, |c| &mut c.id),
//!             Field::attr("attr,body", |c: &Comment| &c.body, |c| &mut c.body),
//!         ]
//!     }
//! }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Post {
//!     id: u64,
//!     title: String,
//!     comments: Vec<Comment>,
//! }
//!
//! impl Resource for Post {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Field::primary("primary,posts", |p: &Post| &p.id, |p| &mut p.id),
//!             Field::attr("attr,title", |p: &Post| &p.title, |p| &mut p.title),
//!             Field::to_many("relation,comments", |p: &Post| &p.comments, |p| &mut p.comments),
//!         ]
//!     }
//! }
//!
//! let post = Post {
//!     id: 1,
//!     title: "Hello".to_string(),
//!     comments: vec![Comment { id: 7, body: "First".to_string() }],
//! };
//!
//! // Comments are sideloaded into `included` by default
//! let document = marshal_one(&post, MarshalOptions::new()).unwrap();
//! assert_eq!(document.included.len(), 1);
//!
//! let mut decoded = Post::default();
//! unmarshal_document(&document, &mut decoded).unwrap();
//! assert_eq!(decoded, post);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Document data types (Node, Relationship, Document, ErrorObject)
//! - [`schema`]: Field tables, tag grammar and the schema cache
//! - [`coerce`]: Conversion between attribute values and field types
//! - [`codec`]: Marshal, unmarshal and error document output
//! - [`error`]: Error types

pub mod codec;
pub mod coerce;
pub mod error;
pub mod model;
pub mod schema;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types at crate root
pub use codec::{
    MarshalOptions, Topology, decode_document, encode_document, marshal_many, marshal_one,
    unmarshal_document, unmarshal_many, unmarshal_many_document, unmarshal_one, write_errors,
    write_many, write_one,
};
pub use coerce::{Attribute, Identity};
pub use error::{Error, ErrorCode};
pub use model::{
    ApiError, Data, Document, ErrorDocument, ErrorObject, Links, Meta, Node, Relationship,
};
pub use schema::{Field, FieldDescriptor, Resource, Role, TimeEncoding};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
