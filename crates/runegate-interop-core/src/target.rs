//! Call target descriptors.
//!
//! A call target names one function inside a loaded module: which module,
//! which namespace and type within it, the function name, and how many
//! arguments the function declares. Targets are built by the host before a
//! call and consumed by the dispatcher.

use serde::{Deserialize, Serialize};

/// A fully-specified function target inside a loaded module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    /// Module name, with or without its artifact extension
    /// (`SampleMod.dll` and `SampleMod` address the same module).
    pub module: String,

    /// Namespace containing the target type.
    pub namespace: String,

    /// Type name within the namespace.
    pub type_name: String,

    /// Function (static method) name on the type.
    pub function: String,

    /// Number of arguments the function declares.
    pub argc: usize,
}

impl CallTarget {
    /// Creates a new call target.
    pub fn new(
        module: impl Into<String>,
        namespace: impl Into<String>,
        type_name: impl Into<String>,
        function: impl Into<String>,
        argc: usize,
    ) -> Self {
        Self {
            module: module.into(),
            namespace: namespace.into(),
            type_name: type_name.into(),
            function: function.into(),
            argc,
        }
    }

    /// Module name with a trailing `.<extension>` suffix removed.
    ///
    /// Only the given artifact extension is stripped, so a dotted module
    /// name keeps its interior dots: with extension `dll`, `Company.Mod.dll`
    /// becomes `Company.Mod` and `Company.Mod` is left alone.
    pub fn module_stem(&self, extension: &str) -> &str {
        let stripped = self
            .module
            .strip_suffix(extension)
            .and_then(|rest| rest.strip_suffix('.'));
        match stripped {
            Some(stem) if !stem.is_empty() => stem,
            _ => &self.module,
        }
    }

    /// The assembly-qualified type string used for resolution, in the shape
    /// `<namespace>.<type>, <module-stem>`.
    pub fn assembly_qualified_type(&self, extension: &str) -> String {
        format!(
            "{}.{}, {}",
            self.namespace,
            self.type_name,
            self.module_stem(extension)
        )
    }
}
