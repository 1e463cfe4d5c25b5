//! Document to record decoding.

use std::any::type_name;
use std::cell::RefCell;
use std::io::Read;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::codec::decode_document;
use crate::error::Error;
use crate::model::{Data, Document, Node, NodeKey};
use crate::schema::field::Accessor;
use crate::schema::{FieldDescriptor, Resource, resolve};

/// Populates records from nodes, resolving references against the
/// document's `included` list.
pub struct Unmarshaler<'d> {
    included: FxHashMap<NodeKey, &'d Node>,
    /// Included nodes currently being materialized.
    resolving: RefCell<FxHashSet<NodeKey>>,
}

impl<'d> Unmarshaler<'d> {
    /// Indexes `included`; when a key repeats, the first node wins.
    pub fn new(included: &'d [Node]) -> Self {
        let mut index = FxHashMap::default();
        for node in included {
            if let Some(key) = node.key() {
                index.entry(key).or_insert(node);
            }
        }
        Self {
            included: index,
            resolving: RefCell::new(FxHashSet::default()),
        }
    }

    /// Copies the identity, attributes and relationships of `node` into
    /// `record`. Fields the node does not mention are left untouched.
    pub fn populate<R: Resource>(&self, node: &Node, record: &mut R) -> Result<(), Error> {
        let schema = resolve::<R>()?;
        if node.resource_type.is_empty() {
            return Err(Error::invalid_document("resource node has no type"));
        }

        for field in schema.fields() {
            let descriptor = &field.descriptor;
            match &field.accessor {
                Accessor::Primary { parse, .. } => {
                    if !node.id.is_empty() {
                        parse(record, &node.id)?;
                    }
                }
                Accessor::ClientId { set, .. } => {
                    if !node.client_id.is_empty() {
                        *set(record) = node.client_id.clone();
                    }
                }
                Accessor::Attribute { decode, .. } => {
                    if let Some(value) = node.attributes.get(descriptor.name) {
                        decode(record, value, descriptor)?;
                    }
                }
                Accessor::ToOne { unmarshal, .. } | Accessor::ToMany { unmarshal, .. } => {
                    if let Some(relationship) = node.relationships.get(descriptor.name) {
                        unmarshal(record, &relationship.data, descriptor, self)?;
                    }
                }
            }
        }

        Ok(())
    }

    pub(crate) fn resolve_one<S: Resource>(
        &self,
        data: &Data,
        field: &FieldDescriptor,
    ) -> Result<Option<S>, Error> {
        match data {
            Data::One(None) => Ok(None),
            Data::One(Some(node)) => self.materialize(node).map(Some),
            Data::Many(_) => Err(Error::invalid_document(format!(
                "relationship {:?} holds a list, expected a single resource",
                field.name
            ))),
        }
    }

    pub(crate) fn resolve_many<S: Resource>(
        &self,
        data: &Data,
        field: &FieldDescriptor,
    ) -> Result<Vec<S>, Error> {
        match data {
            Data::Many(nodes) => nodes.iter().map(|node| self.materialize(node)).collect(),
            Data::One(None) => Ok(Vec::new()),
            Data::One(Some(_)) => Err(Error::invalid_document(format!(
                "relationship {:?} holds a single resource, expected a list",
                field.name
            ))),
        }
    }

    /// Builds a fresh record for a relationship node.
    ///
    /// A reference whose included node is already being built on the
    /// current path keeps its identity only, so cyclic documents terminate.
    fn materialize<S: Resource>(&self, node: &Node) -> Result<S, Error> {
        let mut record = S::default();
        if !node.is_reference() {
            self.populate(node, &mut record)?;
            return Ok(record);
        }

        let Some((key, included)) = self.lookup(node) else {
            debug!(
                resource_type = %node.resource_type,
                id = %node.id,
                "reference not in included, keeping identity only"
            );
            self.populate(node, &mut record)?;
            return Ok(record);
        };

        if !self.resolving.borrow_mut().insert(key.clone()) {
            trace!(
                resource_type = %node.resource_type,
                id = %node.id,
                "reference already on the resolve path, keeping identity only"
            );
            self.populate(node, &mut record)?;
            return Ok(record);
        }
        let populated = self.populate(included, &mut record);
        self.resolving.borrow_mut().remove(&key);
        populated.map(|()| record)
    }

    /// Finds the included node for a reference, by server id and then by
    /// client id.
    fn lookup(&self, node: &Node) -> Option<(NodeKey, &'d Node)> {
        let server = (!node.id.is_empty())
            .then(|| NodeKey::Server(node.resource_type.clone(), node.id.clone()));
        let client = (!node.client_id.is_empty())
            .then(|| NodeKey::Client(node.resource_type.clone(), node.client_id.clone()));
        server.into_iter().chain(client).find_map(|key| {
            let included = self.included.get(&key).copied()?;
            Some((key, included))
        })
    }
}

/// Populates `record` from the single primary node of `document`.
pub fn unmarshal_document<R: Resource>(document: &Document, record: &mut R) -> Result<(), Error> {
    let node = match &document.data {
        Data::One(Some(node)) => node,
        Data::One(None) => return Err(Error::invalid_document("primary data is null")),
        Data::Many(_) => {
            return Err(Error::invalid_document(
                "primary data is a list, expected a single resource",
            ));
        }
    };
    debug!(
        record = type_name::<R>(),
        included = document.included.len(),
        "unmarshaling one record"
    );
    Unmarshaler::new(&document.included).populate(node, record)
}

/// Builds one record per primary node of `document`, in order.
pub fn unmarshal_many_document<R: Resource>(document: &Document) -> Result<Vec<R>, Error> {
    let Data::Many(nodes) = &document.data else {
        return Err(Error::invalid_document(
            "primary data is a single resource, expected a list",
        ));
    };
    debug!(
        record = type_name::<R>(),
        records = nodes.len(),
        included = document.included.len(),
        "unmarshaling records"
    );
    let unmarshaler = Unmarshaler::new(&document.included);
    nodes
        .iter()
        .map(|node| {
            let mut record = R::default();
            unmarshaler.populate(node, &mut record)?;
            Ok(record)
        })
        .collect()
}

/// Reads a single-primary document and populates `record` from it.
pub fn unmarshal_one<Rd: Read, R: Resource>(reader: Rd, record: &mut R) -> Result<(), Error> {
    let document = decode_document(reader)?;
    unmarshal_document(&document, record)
}

/// Reads a multi-primary document into a list of records.
pub fn unmarshal_many<Rd: Read, R: Resource>(reader: Rd) -> Result<Vec<R>, Error> {
    let document = decode_document(reader)?;
    unmarshal_many_document(&document)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    use super::*;
    use crate::fixtures::{
        BadModel, Blog, Book, Comment, ModelBadTypes, Note, Post, Timestamp, WithPointer,
    };

    fn read<R: Resource>(value: Value) -> Result<R, Error> {
        let mut record = R::default();
        unmarshal_one(value.to_string().as_bytes(), &mut record)?;
        Ok(record)
    }

    fn sample_payload() -> Value {
        json!({
            "data": {
                "type": "blogs",
                "id": "5",
                "attributes": {
                    "title": "New blog",
                    "created_at": 1436216820,
                    "view_count": 1000
                },
                "relationships": {
                    "posts": {
                        "data": [
                            {
                                "type": "posts",
                                "id": "",
                                "attributes": { "title": "Foo", "body": "Bar" },
                                "relationships": {
                                    "comments": {
                                        "data": [
                                            {
                                                "type": "comments",
                                                "id": "",
                                                "attributes": { "body": "foo" }
                                            }
                                        ]
                                    }
                                }
                            },
                            {
                                "type": "posts",
                                "id": "",
                                "attributes": { "title": "X", "body": "Y" }
                            }
                        ]
                    },
                    "current_post": {
                        "data": {
                            "type": "posts",
                            "id": "",
                            "attributes": { "title": "Bas", "body": "Fuubar" }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_unmarshal_sets_id_and_attributes() {
        let blog: Blog = read(sample_payload()).unwrap();
        assert_eq!(blog.id, 5);
        assert_eq!(blog.title, "New blog");
        assert_eq!(blog.view_count, 1000);
        assert_eq!(blog.created_at, Utc.with_ymd_and_hms(2015, 7, 6, 21, 7, 0).unwrap());
    }

    #[test]
    fn test_unmarshal_nested_relationships() {
        let blog: Blog = read(sample_payload()).unwrap();
        assert_eq!(blog.posts.len(), 2);
        assert_eq!(blog.posts[0].title, "Foo");
        assert_eq!(blog.posts[0].comments.len(), 1);
        assert_eq!(blog.posts[0].comments[0].body, "foo");
        assert_eq!(blog.posts[1].body, "Y");
        assert_eq!(blog.current_post.unwrap().title, "Bas");
    }

    #[test]
    fn test_unmarshal_non_numeric_id() {
        let document = json!({ "data": { "type": "posts", "id": "non-numeric-id" } });
        let err = read::<Post>(document).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidResourceId {
                id: "non-numeric-id".to_string(),
                expected: "u64",
            }
        );
    }

    #[test]
    fn test_unmarshal_bad_type() {
        let err = read::<WithPointer>(json!({
            "data": { "type": "with-pointers", "id": "1", "attributes": { "name": true } }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidFieldType {
                field: "name".to_string(),
                received: "bool",
                expected: "string",
            }
        );
    }

    #[test]
    fn test_unmarshal_bad_types_table() {
        let cases = [
            ("string_field", json!(0), "number", "string"),
            ("float_field", json!("A string."), "string", "f64"),
            ("time_field", json!("A string."), "string", "i64"),
            ("time_ptr_field", json!("A string."), "string", "i64"),
            ("float_field", json!([1.5]), "array", "f64"),
            ("string_field", json!({ "a": 1 }), "object", "string"),
        ];
        for (field, value, received, expected) in cases {
            let err = read::<ModelBadTypes>(json!({
                "data": { "type": "badtypes", "id": "1", "attributes": { field: value } }
            }))
            .unwrap_err();
            assert_eq!(
                err,
                Error::InvalidFieldType { field: field.to_string(), received, expected },
                "field {field}"
            );
        }
    }

    #[test]
    fn test_unmarshal_pointer_attributes() {
        let record: WithPointer = read(json!({
            "data": {
                "type": "with-pointers",
                "id": "2",
                "attributes": {
                    "name": "The Name",
                    "is-active": true,
                    "int-val": 8,
                    "float-val": 1.1
                }
            }
        }))
        .unwrap();
        assert_eq!(record.id, Some(2));
        assert_eq!(record.name.as_deref(), Some("The Name"));
        assert_eq!(record.is_active, Some(true));
        assert_eq!(record.int_val, Some(8));
        assert_eq!(record.float_val, Some(1.1));
    }

    #[test]
    fn test_unmarshal_null_and_absent_pointers() {
        let record: WithPointer = read(json!({
            "data": {
                "type": "with-pointers",
                "id": "",
                "attributes": { "name": null, "is-active": null }
            }
        }))
        .unwrap();
        assert_eq!(record, WithPointer::default());
    }

    #[test]
    fn test_unmarshal_null_leaves_zero_value() {
        let record: Comment = read(json!({
            "data": {
                "type": "comments",
                "id": "1",
                "attributes": { "body": null, "post_id": null }
            }
        }))
        .unwrap();
        assert_eq!(record.body, "");
        assert_eq!(record.post_id, 0);
    }

    #[test]
    fn test_unmarshal_iso8601() {
        let record: Timestamp = read(json!({
            "data": {
                "type": "timestamps",
                "id": "1",
                "attributes": {
                    "timestamp": "2016-08-17T08:27:12Z",
                    "next": "2016-08-17T08:27:13Z"
                }
            }
        }))
        .unwrap();
        assert_eq!(record.time, Utc.with_ymd_and_hms(2016, 8, 17, 8, 27, 12).unwrap());
        assert_eq!(record.next, Some(Utc.with_ymd_and_hms(2016, 8, 17, 8, 27, 13).unwrap()));
    }

    #[test]
    fn test_unmarshal_invalid_iso8601() {
        let err = read::<Timestamp>(json!({
            "data": {
                "type": "timestamps",
                "id": "1",
                "attributes": { "timestamp": "17 Aug 16 08:027 MST" }
            }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIso8601Timestamp { ref field, .. } if field == "timestamp"
        ));
    }

    #[test]
    fn test_unmarshal_vec_and_raw_attributes() {
        let book: Book = read(json!({
            "data": {
                "type": "books",
                "id": "1",
                "attributes": { "tags": ["a", "b"], "pages": 10, "extra": { "nested": [1, 2] } }
            }
        }))
        .unwrap();
        assert_eq!(book.tags, vec!["a", "b"]);
        assert_eq!(book.pages, Some(10));
        assert_eq!(book.extra, json!({ "nested": [1, 2] }));
    }

    #[test]
    fn test_unmarshal_invalid_documents() {
        let mut post = Post::default();
        for input in ["{}", "not json", "", r#"{"data": "posts"}"#] {
            let err = unmarshal_one(input.as_bytes(), &mut post).unwrap_err();
            assert!(matches!(err, Error::InvalidDocument { .. }), "input {input:?}: {err}");
        }

        let err = read::<Post>(json!({ "data": null })).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));

        let err = read::<Post>(json!({ "data": [] })).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));

        let input = json!({ "data": { "type": "posts", "id": "1" } }).to_string();
        let err = unmarshal_many::<_, Post>(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
    }

    #[test]
    fn test_unmarshal_relationship_shape_mismatch() {
        let err = read::<Post>(json!({
            "data": {
                "type": "posts",
                "id": "1",
                "relationships": { "latest_comment": { "data": [] } }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));

        let err = read::<Post>(json!({
            "data": {
                "type": "posts",
                "id": "1",
                "relationships": { "comments": { "data": { "type": "comments", "id": "1" } } }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
    }

    #[test]
    fn test_unmarshal_null_relationships() {
        let post: Post = read(json!({
            "data": {
                "type": "posts",
                "id": "1",
                "relationships": {
                    "latest_comment": { "data": null },
                    "comments": { "data": null }
                }
            }
        }))
        .unwrap();
        assert!(post.latest_comment.is_none());
        assert!(post.comments.is_empty());
    }

    #[test_log::test]
    fn test_unmarshal_references_without_included() {
        let post: Post = read(json!({
            "data": {
                "type": "posts",
                "id": "1",
                "relationships": {
                    "comments": {
                        "data": [
                            { "type": "comments", "id": "1" },
                            { "type": "comments", "id": "2" }
                        ]
                    },
                    "latest_comment": { "data": { "type": "comments", "id": "2" } }
                }
            }
        }))
        .unwrap();
        let ids: Vec<i64> = post.comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(post.comments[0].body, "");
        assert_eq!(post.latest_comment.unwrap().id, 2);
    }

    #[test]
    fn test_unmarshal_resolves_included() {
        let post: Post = read(json!({
            "data": {
                "type": "posts",
                "id": "1",
                "relationships": {
                    "comments": {
                        "data": [
                            { "type": "comments", "id": "1" },
                            { "type": "comments", "id": "", "client-id": "c2" }
                        ]
                    }
                }
            },
            "included": [
                { "type": "comments", "id": "1", "attributes": { "body": "first" } },
                { "type": "comments", "id": "1", "attributes": { "body": "shadowed" } },
                {
                    "type": "comments",
                    "id": "",
                    "client-id": "c2",
                    "attributes": { "body": "unsaved" }
                }
            ]
        }))
        .unwrap();
        assert_eq!(post.comments[0].body, "first");
        assert_eq!(post.comments[1].client_id, "c2");
        assert_eq!(post.comments[1].body, "unsaved");
    }

    #[test]
    fn test_unmarshal_many() {
        let input = json!({
            "data": [
                { "type": "comments", "id": "1", "attributes": { "body": "a" } },
                { "type": "comments", "id": "2", "attributes": { "body": "b" } }
            ]
        })
        .to_string();
        let comments: Vec<Comment> = unmarshal_many(input.as_bytes()).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].id, 2);
        assert_eq!(comments[1].body, "b");

        let empty: Vec<Comment> = unmarshal_many(r#"{"data": []}"#.as_bytes()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unmarshal_malformed_tag() {
        let err = read::<BadModel>(json!({ "data": { "type": "bad", "id": "1" } })).unwrap_err();
        assert!(matches!(err, Error::MalformedFieldTag { .. }));
    }

    #[test_log::test]
    fn test_unmarshal_mutual_references_terminate() {
        let note: Note = read(json!({
            "data": {
                "type": "notes",
                "id": "1",
                "attributes": { "body": "hello" },
                "relationships": { "author": { "data": { "type": "people", "id": "2" } } }
            },
            "included": [
                {
                    "type": "people",
                    "id": "2",
                    "attributes": { "name": "Ann" },
                    "relationships": { "notes": { "data": [{ "type": "notes", "id": "1" }] } }
                },
                {
                    "type": "notes",
                    "id": "1",
                    "attributes": { "body": "hello" },
                    "relationships": { "author": { "data": { "type": "people", "id": "2" } } }
                }
            ]
        }))
        .unwrap();

        let author = note.author.unwrap();
        assert_eq!(author.name, "Ann");
        assert_eq!(author.notes.len(), 1);
        assert_eq!(author.notes[0].body, "hello");
        // The second visit to people/2 keeps its identity only.
        let inner = author.notes[0].author.as_deref().unwrap();
        assert_eq!(inner.id, 2);
        assert_eq!(inner.name, "");
        assert!(inner.notes.is_empty());
    }

    #[test]
    fn test_unmarshal_rejects_missing_type() {
        let err = read::<Post>(json!({ "data": { "id": "1" } })).unwrap_err();
        assert_eq!(err, Error::invalid_document("resource node has no type"));

        let err = read::<Post>(json!({
            "data": {
                "type": "posts",
                "id": "1",
                "relationships": { "comments": { "data": [{ "id": "2" }] } }
            }
        }))
        .unwrap_err();
        assert_eq!(err, Error::invalid_document("resource node has no type"));
    }
}
