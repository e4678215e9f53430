//! Boundary to the sub-resource disk import routine.

use crate::core::Result;
use crate::inventory::{DeviceList, InventoryClient};
use crate::schema::WorkingAttributes;

/// Populates disk attributes from a live hardware device list.
///
/// The routine behind this trait validates that the attached disks survive
/// a read under the current schema and derives their attributes into the
/// working context. It is opaque to the migration engine; a failure aborts
/// the step that invoked it.
pub trait DiskImporter {
    fn import_disks(
        &self,
        attrs: &mut WorkingAttributes<'_>,
        client: &dyn InventoryClient,
        devices: &DeviceList,
    ) -> Result<()>;
}

/// Importer that accepts any device list without deriving attributes.
///
/// Offline tooling uses this when the full import pipeline is not wired
/// in; the post-migration read derives the disk attributes instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullImporter;

impl DiskImporter for NullImporter {
    fn import_disks(
        &self,
        _attrs: &mut WorkingAttributes<'_>,
        _client: &dyn InventoryClient,
        _devices: &DeviceList,
    ) -> Result<()> {
        Ok(())
    }
}
