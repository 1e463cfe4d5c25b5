//! Resource nodes and relationships.
//!
//! A node is the in-memory unit of a document: a `(type, id)` identity with
//! optional attributes, relationships and links.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute mapping of a node (public attribute name to JSON value).
pub type Attributes = Map<String, Value>;

/// Link objects, passed through unmodified.
pub type Links = Map<String, Value>;

/// A resource node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Resource type name.
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Server-assigned identity; empty for records not yet persisted.
    #[serde(default)]
    pub id: String,
    /// Client-chosen placeholder identity for unsaved records.
    #[serde(rename = "client-id", default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl Node {
    /// Creates a node with the given identity and no content.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns the reference form of this node: identity only.
    pub fn reference(&self) -> Node {
        Node {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
            client_id: self.client_id.clone(),
            ..Node::default()
        }
    }

    /// Returns true if the node carries only an identity.
    pub fn is_reference(&self) -> bool {
        self.attributes.is_empty() && self.relationships.is_empty()
    }

    /// Returns the key used to deduplicate and look up included nodes.
    ///
    /// Nodes without a server id are keyed by their client id; a node with
    /// neither has no key.
    pub fn key(&self) -> Option<NodeKey> {
        if !self.id.is_empty() {
            Some(NodeKey::Server(self.resource_type.clone(), self.id.clone()))
        } else if !self.client_id.is_empty() {
            Some(NodeKey::Client(self.resource_type.clone(), self.client_id.clone()))
        } else {
            None
        }
    }

    /// Sets an attribute, replacing any previous value.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Sets a relationship, replacing any previous value.
    pub fn add_relationship(&mut self, name: impl Into<String>, relationship: Relationship) {
        self.relationships.insert(name.into(), relationship);
    }
}

/// Identity of a node within one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// `(type, id)` of a persisted resource.
    Server(String, String),
    /// `(type, client-id)` of a resource without a server id.
    Client(String, String),
}

/// A relationship entry on a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Data,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl Relationship {
    /// Creates a relationship without links.
    pub fn new(data: Data) -> Self {
        Self { data, links: None }
    }
}

/// Resource linkage: a single node (or null) or an ordered list of nodes.
///
/// Used for both primary data and relationship data. `One(None)` encodes as
/// `null` and `Many(vec![])` as `[]`; the two are never conflated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    Many(Vec<Node>),
    One(Option<Box<Node>>),
}

impl Default for Data {
    fn default() -> Self {
        Data::One(None)
    }
}

impl Data {
    /// Wraps a single node.
    pub fn one(node: Node) -> Self {
        Data::One(Some(Box::new(node)))
    }

    /// Returns the nodes held by this linkage, in order.
    pub fn nodes(&self) -> Vec<&Node> {
        match self {
            Data::Many(nodes) => nodes.iter().collect(),
            Data::One(node) => node.as_deref().into_iter().collect(),
        }
    }
}
