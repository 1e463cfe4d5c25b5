//! Field table entries.
//!
//! A [`Field`] pairs a tag with typed accessors to one field of a record.
//! The accessors are erased into closures here so the codecs can walk a
//! record's fields without knowing their concrete types.

use serde_json::Value;

use crate::codec::{Marshaler, Unmarshaler};
use crate::coerce::{Attribute, Identity};
use crate::error::Error;
use crate::model::Data;
use crate::schema::Resource;
use crate::schema::tag::{FieldDescriptor, Role, TimeEncoding, parse_tag};

type FormatId<R> = Box<dyn Fn(&R) -> String + Send + Sync>;
type ParseId<R> = Box<dyn Fn(&mut R, &str) -> Result<(), Error> + Send + Sync>;
type EncodeAttribute<R> = Box<dyn Fn(&R, TimeEncoding) -> Value + Send + Sync>;
type DecodeAttribute<R> =
    Box<dyn Fn(&mut R, &Value, &FieldDescriptor) -> Result<(), Error> + Send + Sync>;
type IsEmpty<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;
type MarshalRelation<R> = Box<dyn Fn(&R, &mut Marshaler) -> Result<Data, Error> + Send + Sync>;
type UnmarshalRelation<R> = Box<
    dyn Fn(&mut R, &Data, &FieldDescriptor, &Unmarshaler<'_>) -> Result<(), Error> + Send + Sync,
>;

/// Type-erased access to one record field.
pub(crate) enum Accessor<R> {
    Primary {
        optional: bool,
        format: FormatId<R>,
        parse: ParseId<R>,
    },
    ClientId {
        get: fn(&R) -> &String,
        set: fn(&mut R) -> &mut String,
    },
    Attribute {
        optional: bool,
        time: bool,
        encode: EncodeAttribute<R>,
        decode: DecodeAttribute<R>,
        is_empty: IsEmpty<R>,
    },
    ToOne {
        marshal: MarshalRelation<R>,
        unmarshal: UnmarshalRelation<R>,
    },
    ToMany {
        marshal: MarshalRelation<R>,
        unmarshal: UnmarshalRelation<R>,
    },
}

impl<R> Accessor<R> {
    fn role(&self) -> Role {
        match self {
            Accessor::Primary { .. } => Role::Identity,
            Accessor::ClientId { .. } => Role::ClientId,
            Accessor::Attribute { .. } => Role::Attribute,
            Accessor::ToOne { .. } => Role::ToOne,
            Accessor::ToMany { .. } => Role::ToMany,
        }
    }
}

/// One entry of a record's field table.
///
/// ```
/// use jsonapi::{Field, Resource};
///
/// #[derive(Default)]
/// struct Tag {
///     id: u64,
///     label: String,
/// }
///
/// impl Resource for Tag {
///     fn fields() -> Vec<Field<Self>> {
///         vec![
///             Field::primary("primary,tags", |t: &Tag| &t.id, |t| &mut t.id),
///             Field::attr("attr,label", |t: &Tag| &t.label, |t| &mut t.label),
///         ]
///     }
/// }
/// ```
pub struct Field<R> {
    tag: &'static str,
    accessor: Accessor<R>,
}

impl<R: Resource> Field<R> {
    /// Identity field, tagged `primary,<type>[,with-pointers]`.
    pub fn primary<I>(tag: &'static str, get: fn(&R) -> &I, set: fn(&mut R) -> &mut I) -> Self
    where
        I: Identity + 'static,
    {
        Self {
            tag,
            accessor: Accessor::Primary {
                optional: I::OPTIONAL,
                format: Box::new(move |record| get(record).format_id()),
                parse: Box::new(move |record, id| {
                    *set(record) = I::parse_id(id).ok_or_else(|| Error::InvalidResourceId {
                        id: id.to_string(),
                        expected: I::KIND,
                    })?;
                    Ok(())
                }),
            },
        }
    }

    /// Client identity field, tagged `client-id`.
    pub fn client_id(
        tag: &'static str,
        get: fn(&R) -> &String,
        set: fn(&mut R) -> &mut String,
    ) -> Self {
        Self {
            tag,
            accessor: Accessor::ClientId { get, set },
        }
    }

    /// Attribute field, tagged `attr,<name>[,iso8601][,omitempty]`.
    pub fn attr<T>(tag: &'static str, get: fn(&R) -> &T, set: fn(&mut R) -> &mut T) -> Self
    where
        T: Attribute + 'static,
    {
        Self {
            tag,
            accessor: Accessor::Attribute {
                optional: T::OPTIONAL,
                time: T::TIME,
                encode: Box::new(move |record, encoding| get(record).to_attribute(encoding)),
                decode: Box::new(move |record, value, field| {
                    // Null leaves a non-optional field at its zero value.
                    if value.is_null() && !T::OPTIONAL {
                        return Ok(());
                    }
                    *set(record) = T::from_attribute(value, field)?;
                    Ok(())
                }),
                is_empty: Box::new(move |record| get(record).is_empty_attribute()),
            },
        }
    }

    /// To-one relationship, tagged `relation,<name>`.
    pub fn to_one<S: Resource>(
        tag: &'static str,
        get: fn(&R) -> &Option<Box<S>>,
        set: fn(&mut R) -> &mut Option<Box<S>>,
    ) -> Self {
        Self {
            tag,
            accessor: Accessor::ToOne {
                marshal: Box::new(move |record, marshaler| {
                    marshaler.relate_one(get(record).as_deref())
                }),
                unmarshal: Box::new(move |record, data, field, unmarshaler| {
                    *set(record) = unmarshaler.resolve_one::<S>(data, field)?.map(Box::new);
                    Ok(())
                }),
            },
        }
    }

    /// To-many relationship, tagged `relation,<name>`.
    pub fn to_many<S: Resource>(
        tag: &'static str,
        get: fn(&R) -> &Vec<S>,
        set: fn(&mut R) -> &mut Vec<S>,
    ) -> Self {
        Self {
            tag,
            accessor: Accessor::ToMany {
                marshal: Box::new(move |record, marshaler| marshaler.relate_many(get(record))),
                unmarshal: Box::new(move |record, data, field, unmarshaler| {
                    let related = unmarshaler.resolve_many::<S>(data, field)?;
                    set(record).extend(related);
                    Ok(())
                }),
            },
        }
    }

    /// The raw tag string.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Parses the tag and checks it against the accessor.
    pub(crate) fn resolve(self) -> Result<ResolvedField<R>, &'static str> {
        let mut descriptor = parse_tag(self.tag)?;

        match (descriptor.role, &self.accessor) {
            (Role::Identity, Accessor::Primary { optional, .. }) => {
                if descriptor.is_pointer != *optional {
                    return Err(if *optional {
                        "optional identity needs with-pointers"
                    } else {
                        "with-pointers needs an optional identity"
                    });
                }
            }
            (Role::ClientId, Accessor::ClientId { .. }) => {}
            (Role::Attribute, Accessor::Attribute { optional, time, .. }) => {
                if descriptor.time_encoding == TimeEncoding::Iso8601 && !time {
                    return Err("iso8601 applies to time attributes only");
                }
                descriptor.is_pointer = *optional;
            }
            (Role::ToOne, Accessor::ToOne { .. } | Accessor::ToMany { .. }) => {
                descriptor.role = self.accessor.role();
            }
            _ => return Err("tag role does not match the field accessor"),
        }

        Ok(ResolvedField {
            descriptor,
            accessor: self.accessor,
        })
    }
}

/// A field whose tag has been parsed and checked.
pub(crate) struct ResolvedField<R> {
    pub descriptor: FieldDescriptor,
    pub accessor: Accessor<R>,
}
