//! Module discovery and loading from the mods directory.
//!
//! The mods directory holds one subdirectory per module; subdirectory `X`
//! contributes the artifact `X/X.<ext>` where `<ext>` comes from the active
//! runtime backend. The scan is non-recursive and runs once at bootstrap.

use crate::manifest::{ModManifest, MANIFEST_FILE};
use runegate_hosting::RuntimeHost;
use runegate_interop_core::BridgeError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A module the registry loaded into the runtime.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// Module name: the directory name, which also names the artifact.
    pub name: String,

    /// Path of the loaded module artifact.
    pub path: PathBuf,

    /// Parsed manifest, when `mod.toml` was present and valid.
    pub manifest: Option<ModManifest>,
}

/// A recorded per-module load failure.
#[derive(Debug)]
pub struct LoadFailure {
    /// Module name.
    pub name: String,

    /// The error that rejected the module.
    pub error: BridgeError,
}

/// The set of modules loaded at bootstrap, in directory-iteration order.
///
/// Records are never removed: the registry is rebuilt fresh each process
/// lifetime and modules stay loaded in the runtime until exit.
pub struct ModuleRegistry {
    records: Vec<ModuleRecord>,
    failures: Vec<LoadFailure>,
}

impl ModuleRegistry {
    /// Scans the mods directory and loads every module artifact into the
    /// runtime.
    ///
    /// Per-module failures are recorded and logged, never fatal to the
    /// remaining loads. A missing or unreadable mods directory yields an
    /// empty registry with a warning.
    pub fn load_all<R: RuntimeHost>(runtime: &mut R, dir: &Path) -> Self {
        let mut registry = Self {
            records: Vec::new(),
            failures: Vec::new(),
        };

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "mods directory unavailable");
                return registry;
            }
        };

        let extension = runtime.module_extension();

        for entry in entries.flatten() {
            let module_dir = entry.path();
            if !module_dir.is_dir() {
                continue;
            }

            let name = match module_dir.file_name() {
                Some(n) => n.to_string_lossy().into_owned(),
                None => continue,
            };

            let artifact = module_dir.join(format!("{}.{}", name, extension));
            if !artifact.exists() {
                debug!(module = %name, "no module artifact, skipping");
                continue;
            }

            // Backends want absolute paths; keep the joined path if the
            // filesystem refuses to canonicalize
            let artifact = artifact.canonicalize().unwrap_or(artifact);

            let manifest = read_manifest(&module_dir, &name);

            match runtime.load_module(&artifact) {
                Ok(()) => {
                    info!(module = %name, path = %artifact.display(), "module loaded");
                    registry.records.push(ModuleRecord {
                        name,
                        path: artifact,
                        manifest,
                    });
                }
                Err(error) => {
                    warn!(module = %name, error = %error, "module load failed");
                    registry.failures.push(LoadFailure { name, error });
                }
            }
        }

        info!(
            loaded = registry.records.len(),
            failed = registry.failures.len(),
            "module scan complete"
        );
        registry
    }

    /// Successfully loaded modules in load order.
    pub fn records(&self) -> &[ModuleRecord] {
        &self.records
    }

    /// Modules whose load was rejected.
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Looks up a loaded module by name.
    pub fn get(&self, name: &str) -> Option<&ModuleRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Number of loaded modules.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no module loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_manifest(module_dir: &Path, name: &str) -> Option<ModManifest> {
    let path = module_dir.join(MANIFEST_FILE);
    if !path.exists() {
        return None;
    }

    match ModManifest::from_file(&path) {
        Ok(manifest) => {
            info!(
                module = %name,
                id = %manifest.module.id,
                version = %manifest.module.version,
                "module manifest"
            );
            Some(manifest)
        }
        Err(e) => {
            debug!(module = %name, error = %e, "manifest ignored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runegate_interop_core::{BridgeResult, DynValue};
    use runegate_hosting::InvokeOutcome;
    use std::fs;
    use tempfile::TempDir;

    /// Records load attempts; rejects artifacts whose name starts with
    /// "Bad".
    struct RecordingRuntime {
        loaded: Vec<PathBuf>,
    }

    impl RecordingRuntime {
        fn new() -> Self {
            Self { loaded: Vec::new() }
        }
    }

    impl RuntimeHost for RecordingRuntime {
        type EntryPoint = ();

        fn module_extension(&self) -> &'static str {
            "dll"
        }

        fn load_module(&mut self, path: &Path) -> BridgeResult<()> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.starts_with("Bad") {
                return Err(BridgeError::ModuleLoadFailed {
                    module: name,
                    status: 0x8000_8081,
                });
            }
            self.loaded.push(path.to_path_buf());
            Ok(())
        }

        fn resolve_function(&self, _qualified_type: &str, _function: &str) -> BridgeResult<()> {
            Ok(())
        }

        fn invoke(&self, _entry: &(), _args: &[DynValue]) -> BridgeResult<InvokeOutcome> {
            Ok(InvokeOutcome::Value(DynValue::Undefined))
        }
    }

    fn create_test_module(root: &Path, name: &str, with_artifact: bool) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        if with_artifact {
            fs::write(dir.join(format!("{}.dll", name)), b"artifact").unwrap();
        }
    }

    #[test]
    fn test_load_all_loads_artifacts() {
        let root = TempDir::new().unwrap();
        create_test_module(root.path(), "Alpha", true);
        create_test_module(root.path(), "Beta", true);

        let mut runtime = RecordingRuntime::new();
        let registry = ModuleRegistry::load_all(&mut runtime, root.path());

        assert_eq!(registry.len(), 2);
        assert_eq!(runtime.loaded.len(), 2);
        assert!(registry.get("Alpha").is_some());
        assert!(registry.failures().is_empty());
    }

    #[test]
    fn test_artifact_less_directory_skipped() {
        let root = TempDir::new().unwrap();
        create_test_module(root.path(), "Empty", false);
        create_test_module(root.path(), "Full", true);

        let mut runtime = RecordingRuntime::new();
        let registry = ModuleRegistry::load_all(&mut runtime, root.path());

        assert_eq!(registry.len(), 1);
        assert!(registry.get("Empty").is_none());
        // A skip is not a failure
        assert!(registry.failures().is_empty());
    }

    #[test]
    fn test_missing_mods_directory_yields_empty_registry() {
        let root = TempDir::new().unwrap();
        let mut runtime = RecordingRuntime::new();
        let registry = ModuleRegistry::load_all(&mut runtime, &root.path().join("absent"));

        assert!(registry.is_empty());
        assert!(registry.failures().is_empty());
    }

    #[test]
    fn test_load_failure_recorded_and_scan_continues() {
        let root = TempDir::new().unwrap();
        create_test_module(root.path(), "BadMod", true);
        create_test_module(root.path(), "GoodMod", true);

        let mut runtime = RecordingRuntime::new();
        let registry = ModuleRegistry::load_all(&mut runtime, root.path());

        assert_eq!(registry.len(), 1);
        assert!(registry.get("GoodMod").is_some());
        assert_eq!(registry.failures().len(), 1);
        assert_eq!(registry.failures()[0].name, "BadMod");
    }

    #[test]
    fn test_manifest_attached_when_present() {
        let root = TempDir::new().unwrap();
        create_test_module(root.path(), "WithMeta", true);
        fs::write(
            root.path().join("WithMeta").join(MANIFEST_FILE),
            r#"
[mod]
id = "with-meta"
name = "With Meta"
version = "2.0.0"
"#,
        )
        .unwrap();

        let mut runtime = RecordingRuntime::new();
        let registry = ModuleRegistry::load_all(&mut runtime, root.path());

        let record = registry.get("WithMeta").unwrap();
        let manifest = record.manifest.as_ref().unwrap();
        assert_eq!(manifest.module.id, "with-meta");
    }

    #[test]
    fn test_malformed_manifest_still_loads_module() {
        let root = TempDir::new().unwrap();
        create_test_module(root.path(), "BrokenMeta", true);
        fs::write(
            root.path().join("BrokenMeta").join(MANIFEST_FILE),
            "not toml at [all",
        )
        .unwrap();

        let mut runtime = RecordingRuntime::new();
        let registry = ModuleRegistry::load_all(&mut runtime, root.path());

        let record = registry.get("BrokenMeta").unwrap();
        assert!(record.manifest.is_none());
    }

    #[test]
    fn test_loose_files_in_mods_dir_ignored() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("stray.dll"), b"stray").unwrap();
        create_test_module(root.path(), "Real", true);

        let mut runtime = RecordingRuntime::new();
        let registry = ModuleRegistry::load_all(&mut runtime, root.path());

        assert_eq!(registry.len(), 1);
    }
}
