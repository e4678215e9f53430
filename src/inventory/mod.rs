//! Lookup boundary to the remote virtualization management endpoint, plus
//! the hardware device topology types the migration engine reads.
//!
//! The engine never talks to the network itself; it consumes whatever
//! implements [`InventoryClient`]. [`StaticInventory`] is the in-memory
//! implementation used by offline tooling and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::{Result, StateError};

/// Opaque handle to a live virtual machine in the endpoint's inventory.
///
/// Carries the stable identifier it was resolved from; a live client would
/// wrap its managed-object reference here as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmHandle {
    pub uuid: String,
}

/// Classifies a hardware device for topology scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    ScsiController { bus_number: i32 },
    Disk,
    Other,
}

/// One entry in a virtual machine's hardware device list.
///
/// `controller_key` is a lookup key into the same device list, not an
/// ownership edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDevice {
    pub key: i32,
    pub controller_key: i32,
    pub class: DeviceClass,
}

impl VirtualDevice {
    /// Bus number if this device is a SCSI controller.
    pub fn scsi_bus_number(&self) -> Option<i32> {
        match self.class {
            DeviceClass::ScsiController { bus_number } => Some(bus_number),
            _ => None,
        }
    }
}

/// A virtual machine's hardware device list with key-based lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList(pub Vec<VirtualDevice>);

impl DeviceList {
    pub fn find_by_key(&self, key: i32) -> Option<&VirtualDevice> {
        self.0.iter().find(|device| device.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VirtualDevice> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Snapshot of a virtual machine's current configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub name: String,
    pub hardware: DeviceList,
}

/// Read access to the remote management endpoint's inventory.
///
/// Both calls block until the endpoint answers; there is no timeout or
/// retry at this layer. A failed call is fatal to the migration in
/// progress and surfaces to the caller, who owns retry policy.
pub trait InventoryClient {
    /// Resolves a stable identifier to a live virtual machine handle.
    fn vm_by_uuid(&self, uuid: &str) -> Result<VmHandle>;

    /// Fetches the current configuration snapshot for a resolved handle.
    fn vm_config(&self, vm: &VmHandle) -> Result<ConfigSnapshot>;
}

/// In-memory inventory keyed by stable identifier.
///
/// Loadable from a JSON export so state files can be migrated offline
/// against a captured hardware snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticInventory {
    vms: HashMap<String, ConfigSnapshot>,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uuid: impl Into<String>, config: ConfigSnapshot) {
        self.vms.insert(uuid.into(), config);
    }

    pub fn len(&self) -> usize {
        self.vms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vms.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| StateError::Encode(format!("invalid inventory export: {}", e)))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| {
            StateError::Io(format!(
                "failed to read inventory export {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&data)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StateError::Encode(format!("failed to serialize inventory: {}", e)))
    }
}

impl InventoryClient for StaticInventory {
    fn vm_by_uuid(&self, uuid: &str) -> Result<VmHandle> {
        if self.vms.contains_key(uuid) {
            Ok(VmHandle {
                uuid: uuid.to_string(),
            })
        } else {
            Err(StateError::RemoteLookup(format!(
                "no virtual machine with UUID {} in inventory",
                uuid
            )))
        }
    }

    fn vm_config(&self, vm: &VmHandle) -> Result<ConfigSnapshot> {
        self.vms.get(&vm.uuid).cloned().ok_or_else(|| {
            StateError::RemoteLookup(format!(
                "no configuration for virtual machine {} in inventory",
                vm.uuid
            ))
        })
    }
}
