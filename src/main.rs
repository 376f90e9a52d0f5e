//! nest-protect-sensors: inspect Nest Protect device state offline
//!
//! Reads a dump of device buckets and prints the sensor entities the
//! integration would expose, with their current values.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nest_protect_sensors::{
    resolve_sensors, shared::format_with_unit, Bucket, Config, SensorDescriptorTable,
};

// === CLI ===

#[derive(Parser)]
#[command(name = "nest-protect-sensors")]
#[command(about = "Nest Protect device state as sensor entities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve sensor values from a JSON dump of device buckets
    Resolve {
        /// File holding one bucket or an array of buckets
        file: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the sensors the integration knows about
    List,
    /// Open the config file in your editor to enable/disable sensors
    Config,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BucketDump {
    Many(Vec<Bucket>),
    One(Bucket),
}

impl From<BucketDump> for Vec<Bucket> {
    fn from(dump: BucketDump) -> Self {
        match dump {
            BucketDump::Many(buckets) => buckets,
            BucketDump::One(bucket) => vec![bucket],
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { file, json } => run_resolve(&file, json)?,
        Commands::List => run_list(),
        Commands::Config => run_config_command()?,
    }

    Ok(())
}

/// Discover sensors in a bucket dump and print their values
fn run_resolve(file: &Path, json: bool) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let dump: BucketDump = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", file.display(), e))?;
    let buckets: Vec<Bucket> = dump.into();

    let config = Config::load();
    let resolved = resolve_sensors(SensorDescriptorTable::builtin(), &config, &buckets);

    let mut rows = Vec::with_capacity(resolved.len());
    for (entity, value) in &resolved {
        let descriptor = entity.descriptor;

        match value {
            Ok(value) => {
                if json {
                    rows.push(serde_json::json!({
                        "unique_id": entity.unique_id(),
                        "name": entity.name(),
                        "value": value,
                        "unit": descriptor.unit.map(|u| u.as_str()),
                        "device_class": descriptor.device_class.as_str(),
                        "entity_category": descriptor.entity_category.as_str(),
                    }));
                } else {
                    println!(
                        "{:<48} {:<14} {}",
                        entity.unique_id(),
                        entity.name(),
                        format_with_unit(value, descriptor.unit)
                    );
                }
            }
            Err(e) => {
                tracing::warn!("Failed to resolve {}: {}", entity.unique_id(), e);
                if json {
                    rows.push(serde_json::json!({
                        "unique_id": entity.unique_id(),
                        "name": entity.name(),
                        "value": null,
                        "error": e.to_string(),
                    }));
                } else {
                    println!("{:<48} {:<14} error: {}", entity.unique_id(), entity.name(), e);
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }

    Ok(())
}

/// Print the descriptor table
fn run_list() {
    let config = Config::load();

    for descriptor in SensorDescriptorTable::builtin().iter() {
        println!(
            "{:<26} {:<14} unit={:<3} class={:<12} category={:<10}{}",
            descriptor.key,
            descriptor.name,
            descriptor.unit.map_or("-", |u| u.as_str()),
            descriptor.device_class.as_str(),
            descriptor.entity_category.as_str(),
            if config.is_enabled(descriptor.key) { "" } else { " (disabled)" }
        );
    }
}

/// Write the bundled template unless a config file already exists
fn ensure_config_file(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, include_str!("../sensors.toml.example"))?;
    println!("Wrote default sensor config to {}", path.display());
    Ok(())
}

fn editor_command() -> String {
    ["EDITOR", "VISUAL"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

/// Edit the sensor config, creating it first if needed
fn run_config_command() -> anyhow::Result<()> {
    let path = Config::path()
        .ok_or_else(|| anyhow::anyhow!("No config directory on this platform"))?;
    ensure_config_file(&path)?;

    let editor = editor_command();
    tracing::debug!("Editing {} with {}", path.display(), editor);

    let status = std::process::Command::new(&editor).arg(&path).status()?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", editor, status);
    }

    Ok(())
}
