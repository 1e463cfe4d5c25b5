//! Data model types for resource documents.
//!
//! This module contains the in-memory document representation:
//! - Nodes (typed resources with attributes and relationships)
//! - Documents (primary data plus included nodes)
//! - Error objects (and the capabilities used to build them)

pub mod document;
pub mod error_object;
pub mod node;

pub use document::Document;
pub use error_object::{ApiError, ErrorDocument, ErrorObject, Meta};
pub use node::{Attributes, Data, Links, Node, NodeKey, Relationship};
