//! JSON tag encoding.
//!
//! Tags are externally tagged (`{"Int": 3}`) so numeric widths survive a
//! round trip.

use crate::error::TagError;
use crate::format::TagFormat;
use crate::tag::Compound;

/// Plain JSON documents, one per file.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormat;

impl TagFormat for JsonFormat {
    fn extension(&self) -> &'static str {
        ".json"
    }

    fn encode(&self, root: &Compound) -> Result<Vec<u8>, TagError> {
        Ok(serde_json::to_vec(root)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Compound, TagError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    #[test]
    fn test_json_keeps_numeric_widths() {
        let mut root = Compound::new();
        root.insert("a", Tag::Byte(1));
        root.insert("b", Tag::Long(1));
        let bytes = JsonFormat.encode(&root).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"Byte\""));
        let back = JsonFormat.decode(&bytes).unwrap();
        assert_eq!(back, root);
        assert!(matches!(back.get("b"), Some(Tag::Long(1))));
    }

    #[test]
    fn test_json_garbage_is_error() {
        assert!(JsonFormat.decode(b"{not json").is_err());
        assert!(JsonFormat.decode(b"[1,2,3]").is_err());
    }
}
