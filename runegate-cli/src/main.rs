//! Developer tool for poking at Wyrm modules from the command line.
//!
//! Boots the embedded backend against a mods directory, loads every module
//! the way the extension does at startup, and dispatches a single call,
//! printing the marshalled result:
//!
//! ```bash
//! runegate --mods runegate/mods Greeter Sample Greeter Hello world
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use runegate_bridge::Bridge;
use runegate_hosting::vm::EmbeddedRuntime;
use runegate_interop_core::{CallTarget, DynValue};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "runegate")]
#[command(about = "Invoke a function in a Wyrm module the way the bridge would")]
struct Cli {
    /// Mods directory to scan.
    #[arg(long, default_value = "runegate/mods")]
    mods: PathBuf,

    /// Runtime configuration artifact. Defaults to
    /// `interop/runegate.runtimeconfig.json` next to the mods directory.
    #[arg(long)]
    runtime_config: Option<PathBuf>,

    /// Module name (the mod subdirectory).
    module: String,

    /// Namespace of the target type.
    namespace: String,

    /// Type name inside the namespace.
    type_name: String,

    /// Function to invoke.
    function: String,

    /// Call arguments. Each is read as JSON when it parses (`1.5`, `true`,
    /// `null`, `"text"`) and as a plain string otherwise.
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let value = run(cli)?;
    println!("{}", value);
    Ok(())
}

fn run(cli: Cli) -> Result<DynValue> {
    let runtime_config = cli
        .runtime_config
        .clone()
        .unwrap_or_else(|| default_runtime_config(&cli.mods));

    let runtime = EmbeddedRuntime::initialize(&runtime_config)
        .context("failed to initialize the embedded runtime")?;
    let bridge = Bridge::new(runtime, &cli.mods);

    for failure in bridge.registry().failures() {
        warn!(module = %failure.name, error = %failure.error, "module rejected");
    }
    if bridge.registry().is_empty() {
        warn!(mods = %cli.mods.display(), "no modules loaded");
    } else {
        info!(modules = bridge.registry().len(), "modules loaded");
    }

    let args: Vec<DynValue> = cli.args.iter().map(|raw| parse_arg(raw)).collect();
    let target = CallTarget::new(
        cli.module.as_str(),
        cli.namespace.as_str(),
        cli.type_name.as_str(),
        cli.function.as_str(),
        args.len(),
    );

    bridge.invoke_target(&target, &args).context("call failed")
}

fn default_runtime_config(mods: &Path) -> PathBuf {
    let root = mods.parent().unwrap_or_else(|| Path::new("."));
    root.join("interop").join("runegate.runtimeconfig.json")
}

fn parse_arg(raw: &str) -> DynValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Number(n)) => DynValue::Real(n.as_f64().unwrap_or(0.0)),
        Ok(serde_json::Value::Bool(b)) => DynValue::Bool(b),
        Ok(serde_json::Value::String(s)) => DynValue::Str(s),
        Ok(serde_json::Value::Null) => DynValue::Undefined,
        _ => DynValue::Str(raw.to_string()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
