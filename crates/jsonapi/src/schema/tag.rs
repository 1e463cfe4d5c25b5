//! Field tag grammar.
//!
//! Tags are comma separated. The first token is the role keyword:
//!
//! ```text
//! primary,<type>[,with-pointers]
//! attr,<name>[,iso8601][,omitempty]
//! relation,<name>
//! client-id
//! ```

const PRIMARY: &str = "primary";
const CLIENT_ID: &str = "client-id";
const ATTRIBUTE: &str = "attr";
const RELATION: &str = "relation";

const OPT_WITH_POINTERS: &str = "with-pointers";
const OPT_ISO8601: &str = "iso8601";
const OPT_OMIT_EMPTY: &str = "omitempty";

/// The part a field plays in a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Resource identity (`id`).
    Identity,
    /// Client placeholder identity (`client-id`).
    ClientId,
    Attribute,
    ToOne,
    ToMany,
}

impl Role {
    /// Returns true for to-one and to-many relationships.
    pub fn is_relationship(self) -> bool {
        matches!(self, Role::ToOne | Role::ToMany)
    }
}

/// How time-valued attributes are written and read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeEncoding {
    /// Whole seconds since the Unix epoch, as a JSON number.
    #[default]
    UnixSeconds,
    /// `YYYY-MM-DDTHH:MM:SSZ` text.
    Iso8601,
}

/// Metadata derived from one field's tag and accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub role: Role,
    /// Public name: the resource type for the identity, the attribute or
    /// relationship name otherwise, `client-id` for the client identity.
    pub name: &'static str,
    /// The field is an `Option` (nullable identity or optional attribute).
    pub is_pointer: bool,
    pub time_encoding: TimeEncoding,
    pub omit_empty: bool,
}

impl FieldDescriptor {
    /// Creates an attribute descriptor with default options.
    pub fn attribute(name: &'static str) -> Self {
        Self {
            role: Role::Attribute,
            name,
            is_pointer: false,
            time_encoding: TimeEncoding::UnixSeconds,
            omit_empty: false,
        }
    }

    /// Sets the time encoding.
    pub fn with_time_encoding(mut self, time_encoding: TimeEncoding) -> Self {
        self.time_encoding = time_encoding;
        self
    }

    fn new(role: Role, name: &'static str) -> Self {
        Self { role, ..Self::attribute(name) }
    }
}

/// Parses a field tag into a descriptor.
///
/// The relationship cardinality cannot be read from the tag, so `relation`
/// tags parse as [`Role::ToOne`]; the accessor settles it. Returns the reason
/// on failure.
pub fn parse_tag(tag: &'static str) -> Result<FieldDescriptor, &'static str> {
    let mut tokens = tag.split(',').map(str::trim);
    let role = match tokens.next() {
        Some("") | None => return Err("tag is empty"),
        Some(role) => role,
    };

    if role == CLIENT_ID {
        if tokens.next().is_some() {
            return Err("client-id takes no arguments");
        }
        return Ok(FieldDescriptor::new(Role::ClientId, CLIENT_ID));
    }

    let name = match tokens.next() {
        Some("") => return Err("public name is empty"),
        Some(name) => name,
        None => return Err("tag needs at least two tokens"),
    };

    let mut descriptor = match role {
        PRIMARY => FieldDescriptor::new(Role::Identity, name),
        ATTRIBUTE => FieldDescriptor::new(Role::Attribute, name),
        RELATION => FieldDescriptor::new(Role::ToOne, name),
        _ => return Err("unknown role keyword"),
    };

    for option in tokens {
        match (descriptor.role, option) {
            (Role::Identity, OPT_WITH_POINTERS) => descriptor.is_pointer = true,
            (Role::Attribute, OPT_ISO8601) => descriptor.time_encoding = TimeEncoding::Iso8601,
            (Role::Attribute, OPT_OMIT_EMPTY) => descriptor.omit_empty = true,
            _ => return Err("unknown tag option"),
        }
    }

    Ok(descriptor)
}
