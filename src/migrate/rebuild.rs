//! Version 1 -> 2: discard the flat legacy state and rebuild it from the
//! live managed object.

use log::debug;

use crate::core::attrs::AttributeMap;
use crate::core::{Result, StateError};
use crate::migrate::MigrateContext;
use crate::migrate::topology::derive_bus_count;
use crate::schema::{
    FORCE_POWER_OFF, IMPORTED, MIGRATE_WAIT_TIMEOUT, SCSI_CONTROLLER_COUNT,
    SHUTDOWN_WAIT_TIMEOUT, WAIT_FOR_GUEST_NET, WAIT_FOR_GUEST_NET_TIMEOUT, WorkingAttributes,
};
use crate::state::InstanceState;

/// Rebuilds a record from the live object it tracks.
///
/// Only the stable UUID survives from the old state. The live object is
/// resolved, its disks validated through the import routine, and the
/// record is reseeded with version-appropriate defaults plus the derived
/// SCSI controller count. The `imported` marker tells downstream diff
/// logic the attributes were reconciled from live state, not from
/// configuration. Any failure leaves the record untouched at its old
/// version.
pub fn rebuild_from_live_state(
    state: &mut InstanceState,
    ctx: &MigrateContext<'_>,
) -> Result<()> {
    let name = state.id.clone();
    let uuid = match state.attr("uuid") {
        Some(uuid) if !uuid.is_empty() => uuid.to_string(),
        _ => return Err(StateError::MissingIdentifier(name)),
    };

    debug!("migrating state for resource {:?}: UUID {:?}", name, uuid);
    let vm = ctx.client.vm_by_uuid(&uuid)?;
    let config = ctx.client.vm_config(&vm)?;

    let max_bus = derive_bus_count(&state.attributes, &config.hardware);

    // The import routine validates the attached disks against the current
    // schema; its working set is not carried into the new state. The
    // post-migration read derives the disk attributes from live hardware.
    let mut working = WorkingAttributes::new(ctx.schema);
    working.set(SCSI_CONTROLLER_COUNT, (max_bus + 1).to_string());
    ctx.importer
        .import_disks(&mut working, ctx.client, &config.hardware)?;

    let guest_net_timeout = match state.attr(WAIT_FOR_GUEST_NET) {
        Some("false") => "-1".to_string(),
        _ => ctx
            .schema
            .default_for(WAIT_FOR_GUEST_NET_TIMEOUT)
            .unwrap_or_default()
            .to_string(),
    };

    // The record is ready for reading now. Defaults for fields the user
    // never set keep the first post-migration plan from diffing on them.
    state.attributes = AttributeMap::new();
    state.id = uuid;
    state.set_attr(IMPORTED, "true");
    for field in [FORCE_POWER_OFF, MIGRATE_WAIT_TIMEOUT, SHUTDOWN_WAIT_TIMEOUT] {
        state.set_attr(field, ctx.schema.default_for(field).unwrap_or_default());
    }
    state.set_attr(WAIT_FOR_GUEST_NET_TIMEOUT, guest_net_timeout);
    // The derived controller count wins over the schema default outright.
    state.set_attr(SCSI_CONTROLLER_COUNT, (max_bus + 1).to_string());

    debug!("resource {:?}: rebuild complete, state is ready for read", state.id);
    Ok(())
}
