use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vmstate::{
    MigrateContext, NullImporter, SchemaDefaults, StateStore, StaticInventory, StoredState,
    virtual_machine_plan,
};

#[derive(Parser)]
#[command(name = "vmstate-tool")]
#[command(about = "Developer tooling for virtual machine state files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a stored state record.
    Inspect {
        #[arg(long)]
        state: PathBuf,
    },
    /// Print the registered migration chain.
    Plan,
    /// Migrate a state file against a JSON inventory export.
    Migrate {
        #[arg(long)]
        state: PathBuf,
        #[arg(long)]
        inventory: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect { state } => inspect(&state),
        Command::Plan => plan(),
        Command::Migrate { state, inventory } => migrate(&state, &inventory),
    }
}

fn inspect(path: &PathBuf) -> Result<()> {
    let store = StateStore::new(path);
    let stored = store
        .load()
        .with_context(|| format!("failed to load state file '{}'", path.display()))?
        .ok_or_else(|| anyhow!("no state file at '{}'", path.display()))?;

    println!("schema version: {}", stored.schema_version);
    println!("updated at:     {}", stored.updated_at.to_rfc3339());
    println!("id:             {}", stored.state.id);

    let mut keys: Vec<&String> = stored.state.attributes.keys().collect();
    keys.sort();
    for key in keys {
        println!("  {} = {}", key, stored.state.attributes[key]);
    }
    Ok(())
}

fn plan() -> Result<()> {
    let plan = virtual_machine_plan()?;
    println!(
        "virtual machine migration chain (current version {}):",
        plan.current_version()
    );
    for step in plan.steps() {
        println!("  v{} -> v{}", step.from_version(), step.to_version());
    }
    Ok(())
}

fn migrate(state_path: &PathBuf, inventory_path: &PathBuf) -> Result<()> {
    let store = StateStore::new(state_path);
    let stored = store
        .load()
        .with_context(|| format!("failed to load state file '{}'", state_path.display()))?
        .ok_or_else(|| anyhow!("no state file at '{}'", state_path.display()))?;

    let inventory = StaticInventory::from_json_file(inventory_path).with_context(|| {
        format!(
            "failed to load inventory export '{}'",
            inventory_path.display()
        )
    })?;
    let schema = SchemaDefaults::virtual_machine();
    let importer = NullImporter;
    let ctx = MigrateContext {
        client: &inventory,
        importer: &importer,
        schema: &schema,
    };

    let plan = virtual_machine_plan()?;
    let from_version = stored.schema_version;
    let migrated = plan
        .migrate(from_version, Some(stored.state), &ctx)
        .context("migration failed; state file left unchanged")?;

    match migrated {
        Some(state) => {
            let reached = plan.current_version().max(from_version);
            store.save(&StoredState::new(reached, state))?;
            println!("migrated '{}' from v{} to v{}", state_path.display(), from_version, reached);
        }
        None => println!("nothing to migrate"),
    }
    Ok(())
}
