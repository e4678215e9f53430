//! Declared defaults of the current virtual machine resource schema.
//!
//! The migration engine only needs read access to a handful of field
//! defaults; the full resource schema lives with the resource definition,
//! outside this crate.

use std::collections::BTreeMap;

use crate::core::attrs::AttributeMap;

pub const SCSI_CONTROLLER_COUNT: &str = "scsi_controller_count";
pub const FORCE_POWER_OFF: &str = "force_power_off";
pub const MIGRATE_WAIT_TIMEOUT: &str = "migrate_wait_timeout";
pub const SHUTDOWN_WAIT_TIMEOUT: &str = "shutdown_wait_timeout";
pub const WAIT_FOR_GUEST_NET: &str = "wait_for_guest_net";
pub const WAIT_FOR_GUEST_NET_TIMEOUT: &str = "wait_for_guest_net_timeout";
pub const IMPORTED: &str = "imported";

/// Read-only view of a resource schema's declared field defaults.
#[derive(Debug, Clone)]
pub struct SchemaDefaults {
    defaults: BTreeMap<&'static str, &'static str>,
}

impl SchemaDefaults {
    /// Defaults declared by the current virtual machine resource schema.
    pub fn virtual_machine() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert(SCSI_CONTROLLER_COUNT, "1");
        defaults.insert(FORCE_POWER_OFF, "true");
        defaults.insert(MIGRATE_WAIT_TIMEOUT, "30");
        defaults.insert(SHUTDOWN_WAIT_TIMEOUT, "3");
        defaults.insert(WAIT_FOR_GUEST_NET_TIMEOUT, "5");
        Self { defaults }
    }

    pub fn default_for(&self, field: &str) -> Option<&str> {
        self.defaults.get(field).copied()
    }
}

/// Fresh attribute context bound to the current schema's defaults.
///
/// Handed to the disk import routine while rebuilding state; reads fall
/// back to the schema default when no explicit value has been set.
#[derive(Debug)]
pub struct WorkingAttributes<'a> {
    schema: &'a SchemaDefaults,
    values: AttributeMap,
}

impl<'a> WorkingAttributes<'a> {
    pub fn new(schema: &'a SchemaDefaults) -> Self {
        Self {
            schema,
            values: AttributeMap::new(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .map(String::as_str)
            .or_else(|| self.schema.default_for(field))
    }

    /// Explicitly set values only, without schema fallbacks.
    pub fn values(&self) -> &AttributeMap {
        &self.values
    }
}
