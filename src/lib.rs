// ============================================================================
// vmstate Library
// ============================================================================

pub mod core;
pub mod import;
pub mod inventory;
pub mod migrate;
pub mod schema;
pub mod state;

// Re-export main types for convenience
pub use crate::core::{Result, StateError};
pub use crate::core::attrs::{AttributeMap, DiskAttrKey, DISK_COUNT_ATTR};
pub use import::{DiskImporter, NullImporter};
pub use inventory::{
    ConfigSnapshot, DeviceClass, DeviceList, InventoryClient, StaticInventory, VirtualDevice,
    VmHandle,
};
pub use migrate::{
    MigrateContext, MigrationPlan, MigrationStep, derive_bus_count, virtual_machine_plan,
};
pub use schema::{SchemaDefaults, WorkingAttributes};
pub use state::{InstanceState, store::{StateStore, StoredState}};
