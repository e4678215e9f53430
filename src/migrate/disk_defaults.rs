//! Version 0 -> 1: legacy disk attribute defaults.

use log::debug;

use crate::core::Result;
use crate::core::attrs::DiskAttrKey;
use crate::state::InstanceState;

const SKIP_CUSTOMIZATION: &str = "skip_customization";
const ENABLE_DISK_UUID: &str = "enable_disk_uuid";

/// Normalizes the two boolean flags that gained explicit defaults and
/// backfills the per-disk controller type introduced alongside them.
///
/// Mutates the attribute map in place, makes no external calls, and is
/// idempotent.
pub fn migrate_disk_defaults(state: &mut InstanceState) -> Result<()> {
    if state.is_empty() {
        debug!("empty virtual machine state; nothing to migrate");
        return Ok(());
    }

    for flag in [SKIP_CUSTOMIZATION, ENABLE_DISK_UUID] {
        if state.attr(flag).is_none_or(str::is_empty) {
            state.set_attr(flag, "false");
        }
    }

    // Disk slots recording a size predate controller_type; those disks
    // were always attached to a SCSI controller.
    let sized_disks: Vec<DiskAttrKey> = state
        .attributes
        .keys()
        .filter_map(|key| DiskAttrKey::parse(key))
        .filter(|key| key.field == "size")
        .collect();

    for disk in sized_disks {
        let controller_type = disk.sibling("controller_type");
        state
            .attributes
            .entry(controller_type)
            .or_insert_with(|| "scsi".to_string());
    }

    Ok(())
}
