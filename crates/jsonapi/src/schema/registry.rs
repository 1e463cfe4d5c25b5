//! Resolved record schemas and the process-wide cache.
//!
//! A [`Schema`] is built from a record's field table the first time the type
//! is used and then shared for the life of the process.

use std::any::{Any, TypeId, type_name};
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::error::Error;
use crate::model::Node;
use crate::schema::Resource;
use crate::schema::field::{Accessor, ResolvedField};
use crate::schema::tag::{FieldDescriptor, Role};

lazy_static! {
    static ref SCHEMAS: RwLock<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>> =
        RwLock::new(FxHashMap::default());
}

/// The checked field table of one record type.
pub struct Schema<R> {
    resource_type: &'static str,
    fields: Vec<ResolvedField<R>>,
    primary: usize,
    client_id: Option<usize>,
}

impl<R: Resource> Schema<R> {
    fn build() -> Result<Self, Error> {
        let record = type_name::<R>();
        let mut fields = Vec::new();
        let mut primary = None;
        let mut client_id = None;
        let mut names: FxHashSet<(Role, &'static str)> = FxHashSet::default();

        for field in R::fields() {
            let tag = field.tag();
            let malformed = |reason| Error::MalformedFieldTag { record, tag, reason };
            let resolved = field.resolve().map_err(malformed)?;
            let descriptor = resolved.descriptor;

            match descriptor.role {
                Role::Identity if primary.is_some() => {
                    return Err(malformed("more than one primary field"));
                }
                Role::Identity => primary = Some(fields.len()),
                Role::ClientId if client_id.is_some() => {
                    return Err(malformed("more than one client-id field"));
                }
                Role::ClientId => client_id = Some(fields.len()),
                Role::Attribute | Role::ToOne | Role::ToMany => {
                    // To-one and to-many share the relationship namespace.
                    let namespace = if descriptor.role.is_relationship() {
                        Role::ToOne
                    } else {
                        Role::Attribute
                    };
                    if !names.insert((namespace, descriptor.name)) {
                        return Err(malformed("public name declared twice"));
                    }
                }
            }
            fields.push(resolved);
        }

        let primary = primary.ok_or(Error::MalformedFieldTag {
            record,
            tag: "",
            reason: "record has no primary field",
        })?;

        Ok(Self {
            resource_type: fields[primary].descriptor.name,
            fields,
            primary,
            client_id,
        })
    }

    /// Resource type name from the identity tag.
    pub fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    /// Field descriptors in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().map(|field| &field.descriptor)
    }

    pub(crate) fn fields(&self) -> &[ResolvedField<R>] {
        &self.fields
    }

    /// Formatted identity; empty when unassigned.
    pub fn id(&self, record: &R) -> String {
        match &self.fields[self.primary].accessor {
            Accessor::Primary { format, .. } => format(record),
            _ => String::new(),
        }
    }

    /// Client identity; empty when none is declared or set.
    pub fn client_id(&self, record: &R) -> String {
        let Some(index) = self.client_id else {
            return String::new();
        };
        match &self.fields[index].accessor {
            Accessor::ClientId { get, .. } => get(record).clone(),
            _ => String::new(),
        }
    }

    /// Builds the identity-only node for a record.
    pub fn identify(&self, record: &R) -> Node {
        let mut node = Node::new(self.resource_type, self.id(record));
        node.client_id = self.client_id(record);
        node
    }
}

/// Returns the schema of `R`, building and caching it on first use.
///
/// Failures are not cached, so a malformed record type reports the same
/// error on every call.
pub fn resolve<R: Resource>() -> Result<Arc<Schema<R>>, Error> {
    let key = TypeId::of::<R>();

    let cached = SCHEMAS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned();
    if let Some(schema) = cached.and_then(|entry| entry.downcast::<Schema<R>>().ok()) {
        trace!(record = type_name::<R>(), "schema cache hit");
        return Ok(schema);
    }

    let schema = Arc::new(Schema::<R>::build()?);
    debug!(
        record = type_name::<R>(),
        resource_type = schema.resource_type,
        fields = schema.fields.len(),
        "resolved schema"
    );

    let mut schemas = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
    let entry = schemas.entry(key).or_insert_with(|| schema.clone());
    Ok(entry.clone().downcast::<Schema<R>>().unwrap_or(schema))
}

/// Returns the field descriptors of `R` in declaration order.
pub fn descriptors<R: Resource>() -> Result<Vec<FieldDescriptor>, Error> {
    Ok(resolve::<R>()?.descriptors().copied().collect())
}
