//! Wyrm module image format and loader.
//!
//! The Wyrm module format (.wyb) is a simple binary format for
//! representing compiled module code.
//!
//! ## Format
//!
//! ```text
//! +----------------+
//! | Magic (4 bytes)|  "WYB\x01" (version 1)
//! +----------------+
//! | Metadata       |
//! +----------------+
//! | Constant Pool  |
//! +----------------+
//! | Type Table     |
//! +----------------+
//! ```
//!
//! For the initial implementation, the body after the magic is a JSON
//! document; a plain JSON file without the magic is accepted as the
//! development/debug format.

use crate::error::{VmError, VmResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Magic bytes for Wyrm module files.
pub const MAGIC: &[u8; 4] = b"WYB\x01";

/// A loaded Wyrm module image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleImage {
    /// Version of the module format.
    pub version: u8,

    /// Module metadata embedded in the image.
    pub metadata: ModuleMetadata,

    /// Constant pool.
    pub constants: Vec<Constant>,

    /// Named types, each holding named functions.
    pub types: Vec<TypeDef>,
}

/// Metadata embedded in a module image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Module ID; matches the artifact name without extension.
    pub module_id: String,

    /// Module version.
    pub module_version: String,

    /// Compilation timestamp.
    pub compiled_at: Option<String>,

    /// Compiler version.
    pub compiler_version: Option<String>,
}

/// A named type containing callable functions.
///
/// The `name` is the fully-qualified form including its namespace, for
/// example `SampleMod.Greeter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    /// Fully-qualified type name.
    pub name: String,

    /// Functions defined on this type.
    pub functions: Vec<Function>,
}

/// A constant value in the constant pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Constant {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
}

/// A function definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    /// Function name.
    pub name: String,

    /// Parameter names.
    pub params: Vec<String>,

    /// Instructions.
    pub instructions: Vec<Instruction>,

    /// Local variable count, in addition to parameters.
    pub local_count: usize,
}

/// A bytecode instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Instruction {
    /// Load a constant from the pool.
    LoadConst { index: usize },

    /// Load a local variable (parameters occupy the first slots).
    LoadLocal { index: usize },

    /// Store to a local variable.
    StoreLocal { index: usize },

    /// Call a function on a type in the same module.
    Call {
        type_name: String,
        function: String,
        arg_count: usize,
    },

    /// Return the top of stack from the current function.
    Return,

    /// Jump by a relative offset from the next instruction.
    Jump { offset: i32 },

    /// Jump by a relative offset if top of stack is false.
    JumpIfFalse { offset: i32 },

    /// Pop value from stack.
    Pop,

    /// Duplicate top of stack.
    Dup,

    /// Binary add; concatenates when either operand is a string.
    Add,

    /// Binary subtract.
    Sub,

    /// Binary multiply.
    Mul,

    /// Binary divide.
    Div,

    /// Comparison: equal.
    Eq,

    /// Comparison: not equal.
    Ne,

    /// Comparison: less than.
    Lt,

    /// Comparison: less than or equal.
    Le,

    /// Comparison: greater than.
    Gt,

    /// Comparison: greater than or equal.
    Ge,

    /// Logical not.
    Not,

    /// Logical and.
    And,

    /// Logical or.
    Or,

    /// Raise a fault with the message on top of stack.
    Raise,

    /// No operation.
    Nop,
}

/// Module image loader.
pub struct ModuleLoader;

impl ModuleLoader {
    /// Load a module image from a file.
    pub fn load(path: &Path) -> VmResult<ModuleImage> {
        let content = std::fs::read(path)?;
        Self::parse(&content)
    }

    /// Parse a module image from bytes.
    pub fn parse(bytes: &[u8]) -> VmResult<ModuleImage> {
        if bytes.len() < 4 {
            return Err(VmError::ImageError(
                "File too small to be a valid module image".to_string(),
            ));
        }

        if &bytes[0..4] == MAGIC {
            Self::parse_json(&bytes[4..])
        } else {
            // Plain JSON without the magic is the development format
            Self::parse_json(bytes)
        }
    }

    /// Parse the JSON body of a module image.
    fn parse_json(bytes: &[u8]) -> VmResult<ModuleImage> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| VmError::ImageError(format!("Invalid UTF-8: {}", e)))?;

        serde_json::from_str(content)
            .map_err(|e| VmError::ImageError(format!("Invalid module JSON: {}", e)))
    }

    /// Validate a parsed module image.
    pub fn validate(image: &ModuleImage) -> VmResult<()> {
        if image.version != 1 {
            return Err(VmError::ImageError(format!(
                "Unsupported module format version: {}",
                image.version
            )));
        }

        if image.metadata.module_id.is_empty() {
            return Err(VmError::ImageError(
                "Module ID must not be empty".to_string(),
            ));
        }

        for type_def in &image.types {
            for function in &type_def.functions {
                for instruction in &function.instructions {
                    if let Instruction::LoadConst { index } = instruction {
                        if *index >= image.constants.len() {
                            return Err(VmError::ImageError(format!(
                                "Function '{}.{}' references constant {} out of {}",
                                type_def.name,
                                function.name,
                                index,
                                image.constants.len()
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_image() -> ModuleImage {
        ModuleImage {
            version: 1,
            metadata: ModuleMetadata {
                module_id: "SampleMod".to_string(),
                module_version: "0.1.0".to_string(),
                compiled_at: None,
                compiler_version: None,
            },
            constants: vec![
                Constant::String("Hello".to_string()),
                Constant::Int(42),
            ],
            types: vec![TypeDef {
                name: "SampleMod.Greeter".to_string(),
                functions: vec![Function {
                    name: "Greet".to_string(),
                    params: vec![],
                    instructions: vec![
                        Instruction::LoadConst { index: 0 },
                        Instruction::Return,
                    ],
                    local_count: 0,
                }],
            }],
        }
    }

    #[test]
    fn test_serialize_image() {
        let image = sample_image();
        let json = serde_json::to_string_pretty(&image).unwrap();
        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"module_id\": \"SampleMod\""));
    }

    #[test]
    fn test_parse_json_image() {
        let image = sample_image();
        let json = serde_json::to_vec(&image).unwrap();
        let parsed = ModuleLoader::parse(&json).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.metadata.module_id, "SampleMod");
    }

    #[test]
    fn test_parse_with_magic_prefix() {
        let image = sample_image();
        let mut bytes = MAGIC.to_vec();
        bytes.extend(serde_json::to_vec(&image).unwrap());
        let parsed = ModuleLoader::parse(&bytes).unwrap();
        assert_eq!(parsed.types.len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SampleMod.wyb");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(MAGIC).unwrap();
        file.write_all(&serde_json::to_vec(&sample_image()).unwrap())
            .unwrap();

        let parsed = ModuleLoader::load(&path).unwrap();
        assert_eq!(parsed.metadata.module_id, "SampleMod");
    }

    #[test]
    fn test_validate_image() {
        let image = sample_image();
        assert!(ModuleLoader::validate(&image).is_ok());
    }

    #[test]
    fn test_validate_bad_version() {
        let mut image = sample_image();
        image.version = 9;
        assert!(ModuleLoader::validate(&image).is_err());
    }

    #[test]
    fn test_validate_constant_out_of_range() {
        let mut image = sample_image();
        image.types[0].functions[0].instructions[0] = Instruction::LoadConst { index: 7 };
        let err = ModuleLoader::validate(&image).unwrap_err();
        assert!(err.to_string().contains("constant 7"));
    }

    #[test]
    fn test_parse_truncated_input() {
        assert!(ModuleLoader::parse(b"WY").is_err());
    }
}
