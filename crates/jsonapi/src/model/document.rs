//! Top-level documents.

use serde::{Deserialize, Serialize};

use crate::model::{Data, Links, Node};

/// A resource document: primary data plus the sideloaded `included` nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub data: Data,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl Document {
    /// Creates a single-primary document.
    pub fn one(node: Node) -> Self {
        Self {
            data: Data::one(node),
            included: Vec::new(),
            links: None,
        }
    }

    /// Creates a multi-primary document.
    pub fn many(nodes: Vec<Node>) -> Self {
        Self {
            data: Data::Many(nodes),
            included: Vec::new(),
            links: None,
        }
    }

    /// Returns true if the primary data is a list.
    pub fn is_many(&self) -> bool {
        matches!(self.data, Data::Many(_))
    }
}
