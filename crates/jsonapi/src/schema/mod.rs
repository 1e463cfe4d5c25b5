//! Field metadata for record types.
//!
//! Record types describe themselves through [`Resource::fields`]: a table of
//! tagged, typed accessors. The table is checked once per type by
//! [`resolve`] and cached process-wide.

pub mod field;
pub mod registry;
pub mod tag;

pub use field::Field;
pub use registry::{Schema, descriptors, resolve};
pub use tag::{FieldDescriptor, Role, TimeEncoding, parse_tag};

use crate::model::Links;

/// A record type that can be marshaled to and from resource nodes.
pub trait Resource: Default + 'static {
    /// The field table, in declaration order.
    fn fields() -> Vec<Field<Self>>;

    /// Links attached to this record's node.
    fn links(&self) -> Option<Links> {
        None
    }
}
