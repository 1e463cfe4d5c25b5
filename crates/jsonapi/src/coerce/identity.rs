//! Conversion between resource ids and identity fields.
//!
//! Resource ids are always strings on the wire. Numeric identities format
//! their zero value as the empty string so unsaved records carry no id.

/// A field type that can hold a resource identity.
pub trait Identity: Sized {
    /// Kind name reported as `expected` when an id does not parse.
    const KIND: &'static str;
    /// The field is an `Option`; pairs with the `with-pointers` tag option.
    const OPTIONAL: bool = false;

    /// Formats the identity; the empty string means "no id".
    fn format_id(&self) -> String;

    /// Parses a non-empty id, or returns `None` if it does not fit.
    fn parse_id(id: &str) -> Option<Self>;
}

impl Identity for String {
    const KIND: &'static str = "string";

    fn format_id(&self) -> String {
        self.clone()
    }

    fn parse_id(id: &str) -> Option<Self> {
        Some(id.to_string())
    }
}

macro_rules! impl_integer_identity {
    ($($ty:ty => $kind:literal),* $(,)?) => {$(
        impl Identity for $ty {
            const KIND: &'static str = $kind;

            fn format_id(&self) -> String {
                if *self == 0 {
                    String::new()
                } else {
                    self.to_string()
                }
            }

            fn parse_id(id: &str) -> Option<Self> {
                id.parse().ok()
            }
        }
    )*};
}

impl_integer_identity! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
}

impl<T: Identity> Identity for Option<T> {
    const KIND: &'static str = T::KIND;
    const OPTIONAL: bool = true;

    fn format_id(&self) -> String {
        self.as_ref().map(Identity::format_id).unwrap_or_default()
    }

    fn parse_id(id: &str) -> Option<Self> {
        T::parse_id(id).map(Some)
    }
}
