pub mod store;

pub use store::{StateStore, StoredState};

use serde::{Deserialize, Serialize};

use crate::core::attrs::AttributeMap;

/// The persisted key/value snapshot of a managed virtual machine resource.
///
/// `id` starts out as whatever legacy identifier the resource was saved
/// under and is replaced with the stable UUID once the state has been
/// rebuilt from the live object. The schema version the attributes conform
/// to is tracked by the caller (see [`StoredState`](store::StoredState)),
/// not by the record itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    pub id: String,
    pub attributes: AttributeMap,
}

impl InstanceState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: AttributeMap::new(),
        }
    }

    /// A record with no attributes owns no data worth migrating.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }
}
