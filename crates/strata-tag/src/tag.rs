//! The tag tree: typed leaves, lists and named compounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// A single typed value in a persisted document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    /// Homogeneous list; the binary encoding rejects mixed element types.
    List(Vec<Tag>),
    Compound(Compound),
}

impl Tag {
    /// Binary type id used by the NBT encoding.
    pub fn type_id(&self) -> u8 {
        match self {
            Tag::Byte(_) => 1,
            Tag::Short(_) => 2,
            Tag::Int(_) => 3,
            Tag::Long(_) => 4,
            Tag::Float(_) => 5,
            Tag::Double(_) => 6,
            Tag::ByteArray(_) => 7,
            Tag::String(_) => 8,
            Tag::List(_) => 9,
            Tag::Compound(_) => 10,
        }
    }

    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Tag::Byte(_) => "byte",
            Tag::Short(_) => "short",
            Tag::Int(_) => "int",
            Tag::Long(_) => "long",
            Tag::Float(_) => "float",
            Tag::Double(_) => "double",
            Tag::ByteArray(_) => "byte array",
            Tag::String(_) => "string",
            Tag::List(_) => "list",
            Tag::Compound(_) => "compound",
        }
    }
}

impl From<Compound> for Tag {
    fn from(c: Compound) -> Self {
        Tag::Compound(c)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::String(s)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::String(s.to_string())
    }
}

/// Named children, kept in key order so encodings are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compound(BTreeMap<String, Tag>);

macro_rules! typed_getter {
    ($(#[$doc:meta])* $fn:ident, $variant:ident, $ty:ty, $expected:literal) => {
        $(#[$doc])*
        pub fn $fn(&self, name: &str) -> Result<$ty, TagError> {
            match self.require(name)? {
                Tag::$variant(v) => Ok(*v),
                other => Err(TagError::WrongType {
                    name: name.to_string(),
                    expected: $expected,
                    found: other.type_name(),
                }),
            }
        }
    };
}

macro_rules! borrowed_getter {
    ($(#[$doc:meta])* $fn:ident, $variant:ident, $ty:ty, $expected:literal) => {
        $(#[$doc])*
        pub fn $fn(&self, name: &str) -> Result<&$ty, TagError> {
            match self.require(name)? {
                Tag::$variant(v) => Ok(v),
                other => Err(TagError::WrongType {
                    name: name.to_string(),
                    expected: $expected,
                    found: other.type_name(),
                }),
            }
        }
    };
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a child, returning `self` for chaining.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> &mut Self {
        self.0.insert(name.into(), tag.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Tag)> {
        self.0.iter()
    }

    fn require(&self, name: &str) -> Result<&Tag, TagError> {
        self.0
            .get(name)
            .ok_or_else(|| TagError::Missing(name.to_string()))
    }

    typed_getter!(byte, Byte, i8, "byte");
    typed_getter!(short, Short, i16, "short");
    typed_getter!(int, Int, i32, "int");
    typed_getter!(long, Long, i64, "long");
    typed_getter!(float, Float, f32, "float");
    typed_getter!(double, Double, f64, "double");
    borrowed_getter!(string, String, str, "string");
    borrowed_getter!(byte_array, ByteArray, [u8], "byte array");
    borrowed_getter!(list, List, [Tag], "list");
    borrowed_getter!(
        /// Nested compound child.
        compound,
        Compound,
        Compound,
        "compound"
    );

    /// Byte child interpreted as a boolean (non-zero is true).
    pub fn flag(&self, name: &str) -> Result<bool, TagError> {
        Ok(self.byte(name)? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut c = Compound::new();
        c.insert("b", Tag::Byte(-3))
            .insert("s", "hello")
            .insert("arr", Tag::ByteArray(vec![1, 2, 3]));
        assert_eq!(c.byte("b").unwrap(), -3);
        assert_eq!(c.string("s").unwrap(), "hello");
        assert_eq!(c.byte_array("arr").unwrap(), &[1, 2, 3]);
        assert!(c.flag("b").unwrap());
    }

    #[test]
    fn test_missing_and_wrong_type() {
        let mut c = Compound::new();
        c.insert("x", Tag::Int(5));
        assert!(matches!(c.long("nope"), Err(TagError::Missing(n)) if n == "nope"));
        match c.short("x") {
            Err(TagError::WrongType {
                expected, found, ..
            }) => {
                assert_eq!(expected, "short");
                assert_eq!(found, "int");
            }
            other => panic!("expected WrongType, got {other:?}"),
        }
    }

    #[test]
    fn test_insert_replaces() {
        let mut c = Compound::new();
        c.insert("k", Tag::Int(1));
        c.insert("k", Tag::Int(2));
        assert_eq!(c.len(), 1);
        assert_eq!(c.int("k").unwrap(), 2);
    }
}
