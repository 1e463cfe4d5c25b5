//! Record to document encoding.
//!
//! Walks each record's schema to build nodes. Related records are either
//! nested inside the relationship (embedded) or collected once into the
//! document's `included` list and replaced by reference nodes (sideloaded).

use std::io::Write;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::codec::encode_document;
use crate::error::Error;
use crate::model::{Data, Document, Node, NodeKey, Relationship};
use crate::schema::field::Accessor;
use crate::schema::{Resource, Schema, resolve};

// =============================================================================
// OPTIONS
// =============================================================================

/// Where related records are placed in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Topology {
    /// Related nodes are written in full inside each relationship.
    Embedded,
    /// Related nodes are written once in `included`; relationships hold
    /// reference nodes.
    #[default]
    Sideloaded,
}

/// Options for marshaling records.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarshalOptions {
    pub topology: Topology,
    /// Indent the JSON written by the streaming variants.
    pub pretty: bool,
}

impl MarshalOptions {
    /// Creates default (sideloaded, compact) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for the embedded topology.
    pub fn embedded() -> Self {
        Self {
            topology: Topology::Embedded,
            ..Self::default()
        }
    }

    /// Creates options for the sideloaded topology.
    pub fn sideloaded() -> Self {
        Self::default()
    }

    /// Enables indented output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

// =============================================================================
// MARSHALER
// =============================================================================

/// State of one marshal call: the topology and the sideloaded nodes.
pub struct Marshaler {
    topology: Topology,
    included: Vec<Node>,
    seen: FxHashSet<NodeKey>,
}

impl Marshaler {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            included: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    /// Builds the full node of a primary record.
    pub fn node<R: Resource>(&mut self, record: &R) -> Result<Node, Error> {
        let schema = resolve::<R>()?;
        self.fill(&schema, record)
    }

    /// Consumes the marshaler, returning the sideloaded nodes in
    /// first-seen order.
    pub fn into_included(self) -> Vec<Node> {
        self.included
    }

    fn fill<R: Resource>(&mut self, schema: &Schema<R>, record: &R) -> Result<Node, Error> {
        let mut node = schema.identify(record);

        for field in schema.fields() {
            let descriptor = &field.descriptor;
            match &field.accessor {
                Accessor::Attribute { encode, is_empty, .. } => {
                    if descriptor.omit_empty && is_empty(record) {
                        continue;
                    }
                    node.add_attribute(descriptor.name, encode(record, descriptor.time_encoding));
                }
                Accessor::ToOne { marshal, .. } | Accessor::ToMany { marshal, .. } => {
                    let data = marshal(record, self)?;
                    node.add_relationship(descriptor.name, Relationship::new(data));
                }
                Accessor::Primary { .. } | Accessor::ClientId { .. } => {}
            }
        }

        node.links = record.links();
        Ok(node)
    }

    pub(crate) fn relate_one<S: Resource>(&mut self, related: Option<&S>) -> Result<Data, Error> {
        match related {
            Some(record) => Ok(Data::one(self.related(record)?)),
            None => Ok(Data::One(None)),
        }
    }

    pub(crate) fn relate_many<S: Resource>(&mut self, related: &[S]) -> Result<Data, Error> {
        let nodes = related
            .iter()
            .map(|record| self.related(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Data::Many(nodes))
    }

    /// Returns the node to place inside a relationship.
    fn related<S: Resource>(&mut self, record: &S) -> Result<Node, Error> {
        let schema = resolve::<S>()?;
        match self.topology {
            Topology::Embedded => self.fill(&schema, record),
            Topology::Sideloaded => {
                let reference = schema.identify(record);
                // Nothing could point at an unkeyed node, so it stays inline.
                let Some(key) = reference.key() else {
                    return self.fill(&schema, record);
                };
                if !self.seen.insert(key) {
                    return Ok(reference);
                }
                // Reserve the slot first so parents precede their children.
                let slot = self.included.len();
                self.included.push(reference.clone());
                self.included[slot] = self.fill(&schema, record)?;
                Ok(reference)
            }
        }
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Marshals one record into a single-primary document.
pub fn marshal_one<R: Resource>(record: &R, options: MarshalOptions) -> Result<Document, Error> {
    let mut marshaler = Marshaler::new(options.topology);
    let node = marshaler.node(record)?;
    let mut document = Document::one(node);
    document.included = marshaler.into_included();
    debug!(
        topology = ?options.topology,
        included = document.included.len(),
        "marshaled one record"
    );
    Ok(document)
}

/// Marshals records into a multi-primary document, keeping their order.
pub fn marshal_many<R: Resource>(
    records: &[R],
    options: MarshalOptions,
) -> Result<Document, Error> {
    let mut marshaler = Marshaler::new(options.topology);
    let nodes = records
        .iter()
        .map(|record| marshaler.node(record))
        .collect::<Result<Vec<_>, _>>()?;
    let mut document = Document::many(nodes);
    document.included = marshaler.into_included();
    debug!(
        topology = ?options.topology,
        records = records.len(),
        included = document.included.len(),
        "marshaled records"
    );
    Ok(document)
}

/// Marshals one record and writes the document to `writer`.
pub fn write_one<W: Write, R: Resource>(
    writer: W,
    record: &R,
    options: MarshalOptions,
) -> Result<(), Error> {
    let document = marshal_one(record, options)?;
    encode_document(writer, &document, options.pretty)
}

/// Marshals records and writes the document to `writer`.
pub fn write_many<W: Write, R: Resource>(
    writer: W,
    records: &[R],
    options: MarshalOptions,
) -> Result<(), Error> {
    let document = marshal_many(records, options)?;
    encode_document(writer, &document, options.pretty)
}
