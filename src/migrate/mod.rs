//! Migration dispatch: an explicit, ordered registry of version steps
//! walked iteratively until the record's version has no registered step.

mod disk_defaults;
mod rebuild;
mod topology;

pub use disk_defaults::migrate_disk_defaults;
pub use rebuild::rebuild_from_live_state;
pub use topology::derive_bus_count;

use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::core::{Result, StateError};
use crate::import::DiskImporter;
use crate::inventory::InventoryClient;
use crate::schema::SchemaDefaults;
use crate::state::InstanceState;

/// Collaborators a migration step may call out to.
pub struct MigrateContext<'a> {
    pub client: &'a dyn InventoryClient,
    pub importer: &'a dyn DiskImporter,
    pub schema: &'a SchemaDefaults,
}

type StepFn = Arc<dyn Fn(&mut InstanceState, &MigrateContext<'_>) -> Result<()> + Send + Sync>;

/// One registered migration edge between adjacent schema versions.
#[derive(Clone)]
pub struct MigrationStep {
    from_version: u32,
    to_version: u32,
    run: StepFn,
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from_version", &self.from_version)
            .field("to_version", &self.to_version)
            .finish()
    }
}

impl MigrationStep {
    pub fn new<F>(from_version: u32, to_version: u32, run: F) -> Self
    where
        F: Fn(&mut InstanceState, &MigrateContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            from_version,
            to_version,
            run: Arc::new(run),
        }
    }

    pub fn from_version(&self) -> u32 {
        self.from_version
    }

    pub fn to_version(&self) -> u32 {
        self.to_version
    }
}

/// Ordered registry of migration steps keyed by their starting version.
///
/// Adding a schema version means registering one more step here; the walk
/// itself never changes.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Adds a migration step to the plan, validating it immediately.
    pub fn add_step(&mut self, step: MigrationStep) -> Result<()> {
        self.steps.push(step);
        self.validate()
    }

    /// Fluent builder method to add a step.
    pub fn with_step(mut self, step: MigrationStep) -> Result<Self> {
        self.add_step(step)?;
        Ok(self)
    }

    /// The newest schema version any registered step produces.
    pub fn current_version(&self) -> u32 {
        self.steps
            .iter()
            .map(|step| step.to_version)
            .max()
            .unwrap_or(0)
    }

    /// Validates the integrity of the registry.
    ///
    /// Checks step direction (`from < to`) and duplicate starting
    /// versions. Gaps are allowed: a version with no registered step
    /// terminates the walk, it does not fail it.
    pub fn validate(&self) -> Result<()> {
        let mut seen_from = HashSet::<u32>::new();
        for step in &self.steps {
            if step.to_version <= step.from_version {
                return Err(StateError::InvalidPlan(format!(
                    "migration step {} -> {} is invalid",
                    step.from_version, step.to_version
                )));
            }
            if !seen_from.insert(step.from_version) {
                return Err(StateError::InvalidPlan(format!(
                    "duplicate migration step starting at version {}",
                    step.from_version
                )));
            }
        }
        Ok(())
    }

    /// Walks a state record forward from `version` until no step applies.
    ///
    /// An absent record is a no-op; a record with no attributes is
    /// returned unchanged. Each step mutates the record in place and fully
    /// completes before the next one starts. A step failure aborts the
    /// whole walk; no migrated record is returned to persist, so the
    /// caller's stored version is never advanced past a failed step.
    pub fn migrate(
        &self,
        version: u32,
        state: Option<InstanceState>,
        ctx: &MigrateContext<'_>,
    ) -> Result<Option<InstanceState>> {
        self.validate()?;

        let Some(mut state) = state else {
            return Ok(None);
        };

        let by_from: BTreeMap<u32, &MigrationStep> = self
            .steps
            .iter()
            .map(|step| (step.from_version, step))
            .collect();

        let mut version = version;
        while let Some(step) = by_from.get(&version) {
            if state.is_empty() {
                debug!("virtual machine state for {:?} is empty; nothing to migrate", state.id);
                return Ok(Some(state));
            }
            debug!("migrating virtual machine state: old v{} state", version);
            (step.run)(&mut state, ctx)?;
            version = step.to_version;
            debug!("migrating virtual machine state: new v{} state", version);
        }

        debug!("virtual machine state migration complete at v{}", version);
        Ok(Some(state))
    }
}

/// The migration chain registered for the virtual machine resource.
pub fn virtual_machine_plan() -> Result<MigrationPlan> {
    MigrationPlan::new()
        .with_step(MigrationStep::new(0, 1, |state, _ctx| {
            migrate_disk_defaults(state)
        }))?
        .with_step(MigrationStep::new(1, 2, rebuild_from_live_state))
}
