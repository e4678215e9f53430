//! Flat attribute maps and the structured form of `disk.<n>.<field>` keys.
//!
//! Persisted state encodes per-disk attributes as dotted string keys. The
//! dotted form is the wire format; inside the crate those keys are parsed
//! into [`DiskAttrKey`] at the point of read and only flattened back to
//! strings at the boundary.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Unordered mapping of attribute names to string-encoded values.
pub type AttributeMap = HashMap<String, String>;

/// Attribute carrying the legacy disk slot count.
pub const DISK_COUNT_ATTR: &str = "disk.#";

lazy_static! {
    static ref DISK_ATTR_KEY: Regex = Regex::new(r"^disk\.([0-9]+)\.([a-z_]+)$").unwrap();
}

/// A `disk.<index>.<field>` attribute key in structured form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskAttrKey {
    pub index: u32,
    pub field: String,
}

impl DiskAttrKey {
    /// Parses a wire key into structured form.
    ///
    /// Keys that are not exactly three dot-separated components with a
    /// numeric index (`disk.#` included) are not disk attribute keys.
    pub fn parse(key: &str) -> Option<Self> {
        let captures = DISK_ATTR_KEY.captures(key)?;
        let index = captures.get(1)?.as_str().parse().ok()?;
        let field = captures.get(2)?.as_str().to_string();
        Some(Self { index, field })
    }

    /// Returns the wire key of another field on the same disk slot.
    pub fn sibling(&self, field: &str) -> String {
        format!("disk.{}.{}", self.index, field)
    }

    /// Flattens back to the wire form.
    pub fn flatten(&self) -> String {
        format!("disk.{}.{}", self.index, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_disk_key() {
        let key = DiskAttrKey::parse("disk.0.size").unwrap();
        assert_eq!(key.index, 0);
        assert_eq!(key.field, "size");

        let key = DiskAttrKey::parse("disk.12.controller_type").unwrap();
        assert_eq!(key.index, 12);
        assert_eq!(key.field, "controller_type");
    }

    #[test]
    fn test_parse_rejects_non_disk_keys() {
        assert!(DiskAttrKey::parse("disk.#").is_none());
        assert!(DiskAttrKey::parse("disk.0").is_none());
        assert!(DiskAttrKey::parse("disk.0.io.share").is_none());
        assert!(DiskAttrKey::parse("network.0.size").is_none());
        assert!(DiskAttrKey::parse("disk.x.size").is_none());
        assert!(DiskAttrKey::parse("xdisk.0.key").is_none());
    }

    #[test]
    fn test_sibling_and_flatten() {
        let key = DiskAttrKey::parse("disk.3.size").unwrap();
        assert_eq!(key.sibling("controller_type"), "disk.3.controller_type");
        assert_eq!(key.flatten(), "disk.3.size");
    }
}
