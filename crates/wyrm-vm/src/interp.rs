//! Stack-based interpreter for Wyrm module images.
//!
//! The VM owns a set of loaded module images. Functions are resolved to a
//! [`FunctionRef`] once and then called with positional arguments; each call
//! runs on its own frame with a value stack and local slots.
//!
//! Two failure channels exist. Interpreter integrity violations (stack
//! underflow, bad indices, the call-depth limit) are [`VmError`]s. Errors the
//! guest code itself can raise or trigger (the `Raise` instruction, division
//! by zero, operand type mismatches) are [`VmFault`]s and unwind with the
//! frames that were live.

use crate::error::{VmError, VmFault, VmResult};
use crate::module::{Constant, Function, Instruction, ModuleImage, ModuleLoader};
use crate::value::VmValue;
use std::collections::HashMap;
use tracing::debug;

/// Maximum nested call depth before execution aborts.
pub const MAX_CALL_DEPTH: usize = 128;

/// Reference to a resolved function inside a loaded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    /// ID of the owning module.
    pub module_id: String,

    /// Fully-qualified type name.
    pub type_name: String,

    /// Function name.
    pub function: String,

    /// Declared parameter count.
    pub param_count: usize,
}

/// Outcome of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The function returned a value.
    Return(VmValue),

    /// Module code raised a fault.
    Fault(VmFault),
}

/// The Wyrm virtual machine: loaded modules plus a stack interpreter.
///
/// Modules are loaded once and never unloaded.
#[derive(Debug)]
pub struct Vm {
    modules: HashMap<String, ModuleImage>,
}

impl Vm {
    /// Creates a VM with no modules loaded.
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Number of loaded modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Loads a module image, validating it first. A module ID can only be
    /// loaded once.
    pub fn load_image(&mut self, image: ModuleImage) -> VmResult<()> {
        ModuleLoader::validate(&image)?;

        let id = image.metadata.module_id.clone();
        if self.modules.contains_key(&id) {
            return Err(VmError::DuplicateModule(id));
        }

        debug!(module = %id, types = image.types.len(), "loaded module image");
        self.modules.insert(id, image);
        Ok(())
    }

    /// Resolves a function by module ID, fully-qualified type name, and
    /// function name.
    pub fn resolve(
        &self,
        module_id: &str,
        type_name: &str,
        function: &str,
    ) -> VmResult<FunctionRef> {
        let module = self
            .modules
            .get(module_id)
            .ok_or_else(|| VmError::ModuleNotFound(module_id.to_string()))?;

        let func = Self::find_function(module, type_name, function)?;

        Ok(FunctionRef {
            module_id: module_id.to_string(),
            type_name: type_name.to_string(),
            function: function.to_string(),
            param_count: func.params.len(),
        })
    }

    /// Calls a resolved function with positional arguments.
    ///
    /// The argument count must match the function's declared parameter
    /// count exactly.
    pub fn call(&self, func: &FunctionRef, args: &[VmValue]) -> VmResult<CallOutcome> {
        let module = self
            .modules
            .get(&func.module_id)
            .ok_or_else(|| VmError::ModuleNotFound(func.module_id.clone()))?;

        let function = Self::find_function(module, &func.type_name, &func.function)?;

        if args.len() != function.params.len() {
            return Err(VmError::ExecutionError(format!(
                "Function '{}.{}' expects {} argument(s), got {}",
                func.type_name,
                func.function,
                function.params.len(),
                args.len()
            )));
        }

        match self.execute(module, &func.type_name, function, args, 0)? {
            Ok(value) => Ok(CallOutcome::Return(value)),
            Err(fault) => Ok(CallOutcome::Fault(fault)),
        }
    }

    fn find_function<'m>(
        module: &'m ModuleImage,
        type_name: &str,
        function: &str,
    ) -> VmResult<&'m Function> {
        let type_def = module
            .types
            .iter()
            .find(|t| t.name == type_name)
            .ok_or_else(|| {
                VmError::TypeNotFound(format!(
                    "{} in module {}",
                    type_name, module.metadata.module_id
                ))
            })?;

        type_def
            .functions
            .iter()
            .find(|f| f.name == function)
            .ok_or_else(|| VmError::FunctionNotFound(format!("{} on {}", function, type_name)))
    }

    /// Runs one function frame to completion.
    ///
    /// The outer `VmResult` carries interpreter errors; the inner `Result`
    /// distinguishes a normal return from a propagating fault.
    fn execute(
        &self,
        module: &ModuleImage,
        type_name: &str,
        function: &Function,
        args: &[VmValue],
        depth: usize,
    ) -> VmResult<Result<VmValue, VmFault>> {
        if depth >= MAX_CALL_DEPTH {
            return Err(VmError::ExecutionError(format!(
                "Call depth limit of {} exceeded in '{}.{}'",
                MAX_CALL_DEPTH, type_name, function.name
            )));
        }

        let frame_name = format!("{}.{}", type_name, function.name);

        // Parameters occupy the first local slots, extra locals start null
        let mut locals: Vec<VmValue> = args.to_vec();
        locals.resize(function.params.len() + function.local_count, VmValue::Null);

        let mut stack: Vec<VmValue> = Vec::new();
        let mut pc: usize = 0;
        let code_len = function.instructions.len();

        while pc < code_len {
            let instruction = &function.instructions[pc];
            pc += 1;

            match instruction {
                Instruction::LoadConst { index } => {
                    let constant = module.constants.get(*index).ok_or_else(|| {
                        VmError::ExecutionError(format!("Constant index {} out of range", index))
                    })?;
                    stack.push(constant_value(constant));
                }

                Instruction::LoadLocal { index } => {
                    let value = locals.get(*index).cloned().ok_or_else(|| {
                        VmError::ExecutionError(format!("Local index {} out of range", index))
                    })?;
                    stack.push(value);
                }

                Instruction::StoreLocal { index } => {
                    let value = pop(&mut stack)?;
                    let slot = locals.get_mut(*index).ok_or_else(|| {
                        VmError::ExecutionError(format!("Local index {} out of range", index))
                    })?;
                    *slot = value;
                }

                Instruction::Call {
                    type_name: callee_type,
                    function: callee_name,
                    arg_count,
                } => {
                    if stack.len() < *arg_count {
                        return Err(VmError::ExecutionError(format!(
                            "Stack underflow calling '{}.{}'",
                            callee_type, callee_name
                        )));
                    }
                    let call_args = stack.split_off(stack.len() - arg_count);

                    let callee = Self::find_function(module, callee_type, callee_name)?;
                    if call_args.len() != callee.params.len() {
                        return Err(VmError::ExecutionError(format!(
                            "Function '{}.{}' expects {} argument(s), got {}",
                            callee_type,
                            callee_name,
                            callee.params.len(),
                            call_args.len()
                        )));
                    }

                    match self.execute(module, callee_type, callee, &call_args, depth + 1)? {
                        Ok(value) => stack.push(value),
                        Err(mut fault) => {
                            fault.frames.push(frame_name.clone());
                            return Ok(Err(fault));
                        }
                    }
                }

                Instruction::Return => {
                    let value = stack.pop().unwrap_or(VmValue::Null);
                    return Ok(Ok(value));
                }

                Instruction::Jump { offset } => {
                    pc = jump_target(pc, *offset, code_len)?;
                }

                Instruction::JumpIfFalse { offset } => {
                    let condition = pop(&mut stack)?;
                    if !condition.is_truthy() {
                        pc = jump_target(pc, *offset, code_len)?;
                    }
                }

                Instruction::Pop => {
                    pop(&mut stack)?;
                }

                Instruction::Dup => {
                    let top = stack.last().cloned().ok_or_else(|| {
                        VmError::ExecutionError("Stack underflow on Dup".to_string())
                    })?;
                    stack.push(top);
                }

                Instruction::Add => {
                    let rhs = pop(&mut stack)?;
                    let lhs = pop(&mut stack)?;
                    let result = match (&lhs, &rhs) {
                        // Either operand being a string makes Add concatenate
                        (VmValue::Str(_), _) | (_, VmValue::Str(_)) => {
                            VmValue::Str(format!("{}{}", lhs, rhs))
                        }
                        (VmValue::Int(a), VmValue::Int(b)) => VmValue::Int(a.wrapping_add(*b)),
                        _ => match (lhs.as_number(), rhs.as_number()) {
                            (Some(a), Some(b)) => VmValue::Float(a + b),
                            _ => {
                                return Ok(Err(raise_here(
                                    format!("Cannot add {:?} and {:?}", lhs, rhs),
                                    &frame_name,
                                )))
                            }
                        },
                    };
                    stack.push(result);
                }

                Instruction::Sub => match binary_numeric(&mut stack, "subtract", |a, b| a - b)? {
                    Ok(value) => stack.push(value),
                    Err(fault) => return Ok(Err(attach_frame(fault, &frame_name))),
                },

                Instruction::Mul => match binary_numeric(&mut stack, "multiply", |a, b| a * b)? {
                    Ok(value) => stack.push(value),
                    Err(fault) => return Ok(Err(attach_frame(fault, &frame_name))),
                },

                Instruction::Div => {
                    let rhs = pop(&mut stack)?;
                    let lhs = pop(&mut stack)?;
                    match (lhs.as_number(), rhs.as_number()) {
                        (Some(_), Some(b)) if b == 0.0 => {
                            return Ok(Err(raise_here(
                                "Division by zero".to_string(),
                                &frame_name,
                            )))
                        }
                        (Some(a), Some(b)) => {
                            if let (VmValue::Int(ia), VmValue::Int(ib)) = (&lhs, &rhs) {
                                stack.push(VmValue::Int(ia.wrapping_div(*ib)));
                            } else {
                                stack.push(VmValue::Float(a / b));
                            }
                        }
                        _ => {
                            return Ok(Err(raise_here(
                                format!("Cannot divide {:?} by {:?}", lhs, rhs),
                                &frame_name,
                            )))
                        }
                    }
                }

                Instruction::Eq => {
                    let rhs = pop(&mut stack)?;
                    let lhs = pop(&mut stack)?;
                    stack.push(VmValue::Bool(values_equal(&lhs, &rhs)));
                }

                Instruction::Ne => {
                    let rhs = pop(&mut stack)?;
                    let lhs = pop(&mut stack)?;
                    stack.push(VmValue::Bool(!values_equal(&lhs, &rhs)));
                }

                Instruction::Lt => match compare(&mut stack)? {
                    Ok(ordering) => stack.push(VmValue::Bool(ordering.is_lt())),
                    Err(fault) => return Ok(Err(attach_frame(fault, &frame_name))),
                },

                Instruction::Le => match compare(&mut stack)? {
                    Ok(ordering) => stack.push(VmValue::Bool(ordering.is_le())),
                    Err(fault) => return Ok(Err(attach_frame(fault, &frame_name))),
                },

                Instruction::Gt => match compare(&mut stack)? {
                    Ok(ordering) => stack.push(VmValue::Bool(ordering.is_gt())),
                    Err(fault) => return Ok(Err(attach_frame(fault, &frame_name))),
                },

                Instruction::Ge => match compare(&mut stack)? {
                    Ok(ordering) => stack.push(VmValue::Bool(ordering.is_ge())),
                    Err(fault) => return Ok(Err(attach_frame(fault, &frame_name))),
                },

                Instruction::Not => {
                    let value = pop(&mut stack)?;
                    stack.push(VmValue::Bool(!value.is_truthy()));
                }

                Instruction::And => {
                    let rhs = pop(&mut stack)?;
                    let lhs = pop(&mut stack)?;
                    stack.push(VmValue::Bool(lhs.is_truthy() && rhs.is_truthy()));
                }

                Instruction::Or => {
                    let rhs = pop(&mut stack)?;
                    let lhs = pop(&mut stack)?;
                    stack.push(VmValue::Bool(lhs.is_truthy() || rhs.is_truthy()));
                }

                Instruction::Raise => {
                    let message = pop(&mut stack)?;
                    return Ok(Err(raise_here(message.to_string(), &frame_name)));
                }

                Instruction::Nop => {}
            }
        }

        // Fell off the end of the instruction list
        Ok(Ok(VmValue::Null))
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

fn constant_value(constant: &Constant) -> VmValue {
    match constant {
        Constant::Null => VmValue::Null,
        Constant::Bool(b) => VmValue::Bool(*b),
        Constant::Int(i) => VmValue::Int(*i),
        Constant::Float(f) => VmValue::Float(*f),
        Constant::String(s) => VmValue::Str(s.clone()),
    }
}

fn pop(stack: &mut Vec<VmValue>) -> VmResult<VmValue> {
    stack
        .pop()
        .ok_or_else(|| VmError::ExecutionError("Stack underflow".to_string()))
}

/// Computes a jump target relative to the instruction after the jump.
/// A target equal to the code length is allowed and ends the frame.
fn jump_target(pc: usize, offset: i32, code_len: usize) -> VmResult<usize> {
    let target = pc as i64 + offset as i64;
    if target < 0 || target as usize > code_len {
        return Err(VmError::ExecutionError(format!(
            "Jump target {} out of range 0..={}",
            target, code_len
        )));
    }
    Ok(target as usize)
}

fn raise_here(message: String, frame_name: &str) -> VmFault {
    let mut fault = VmFault::new(message);
    fault.frames.push(frame_name.to_string());
    fault
}

fn attach_frame(mut fault: VmFault, frame_name: &str) -> VmFault {
    fault.frames.push(frame_name.to_string());
    fault
}

/// Pops two operands and applies a numeric operation. Int pairs stay Int,
/// anything else numeric widens to Float; non-numeric operands fault.
fn binary_numeric(
    stack: &mut Vec<VmValue>,
    op_name: &str,
    op: fn(f64, f64) -> f64,
) -> VmResult<Result<VmValue, VmFault>> {
    let rhs = pop(stack)?;
    let lhs = pop(stack)?;

    if let (VmValue::Int(a), VmValue::Int(b)) = (&lhs, &rhs) {
        let result = op(*a as f64, *b as f64);
        return Ok(Ok(VmValue::Int(result as i64)));
    }

    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Ok(Ok(VmValue::Float(op(a, b)))),
        _ => Ok(Err(VmFault::new(format!(
            "Cannot {} {:?} and {:?}",
            op_name, lhs, rhs
        )))),
    }
}

fn values_equal(lhs: &VmValue, rhs: &VmValue) -> bool {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => a == b,
        _ => lhs == rhs,
    }
}

/// Pops two operands and orders them. Numbers order numerically, strings
/// lexicographically; mixed operand kinds fault.
fn compare(stack: &mut Vec<VmValue>) -> VmResult<Result<std::cmp::Ordering, VmFault>> {
    let rhs = pop(stack)?;
    let lhs = pop(stack)?;

    if let (VmValue::Str(a), VmValue::Str(b)) = (&lhs, &rhs) {
        return Ok(Ok(a.cmp(b)));
    }

    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => Ok(Ok(a
            .partial_cmp(&b)
            .unwrap_or(std::cmp::Ordering::Equal))),
        _ => Ok(Err(VmFault::new(format!(
            "Cannot compare {:?} and {:?}",
            lhs, rhs
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleMetadata, TypeDef};

    fn image_with(constants: Vec<Constant>, types: Vec<TypeDef>) -> ModuleImage {
        ModuleImage {
            version: 1,
            metadata: ModuleMetadata {
                module_id: "TestMod".to_string(),
                module_version: "0.1.0".to_string(),
                compiled_at: None,
                compiler_version: None,
            },
            constants,
            types,
        }
    }

    fn single_function(name: &str, params: usize, instructions: Vec<Instruction>) -> TypeDef {
        TypeDef {
            name: "Test.Main".to_string(),
            functions: vec![Function {
                name: name.to_string(),
                params: (0..params).map(|i| format!("p{}", i)).collect(),
                instructions,
                local_count: 0,
            }],
        }
    }

    fn loaded_vm(image: ModuleImage) -> Vm {
        let mut vm = Vm::new();
        vm.load_image(image).unwrap();
        vm
    }

    fn call_main(vm: &Vm, args: &[VmValue]) -> CallOutcome {
        let func = vm.resolve("TestMod", "Test.Main", "run").unwrap();
        vm.call(&func, args).unwrap()
    }

    #[test]
    fn test_load_image_rejects_duplicates() {
        let mut vm = Vm::new();
        vm.load_image(image_with(vec![], vec![])).unwrap();
        let err = vm.load_image(image_with(vec![], vec![])).unwrap_err();
        assert!(matches!(err, VmError::DuplicateModule(_)));
        assert_eq!(vm.module_count(), 1);
    }

    #[test]
    fn test_resolve_missing_module_and_members() {
        let vm = loaded_vm(image_with(
            vec![],
            vec![single_function("run", 0, vec![Instruction::Return])],
        ));

        assert!(matches!(
            vm.resolve("Nope", "Test.Main", "run"),
            Err(VmError::ModuleNotFound(_))
        ));
        assert!(matches!(
            vm.resolve("TestMod", "Test.Other", "run"),
            Err(VmError::TypeNotFound(_))
        ));
        assert!(matches!(
            vm.resolve("TestMod", "Test.Main", "missing"),
            Err(VmError::FunctionNotFound(_))
        ));
    }

    #[test]
    fn test_constant_return() {
        let vm = loaded_vm(image_with(
            vec![Constant::Int(42)],
            vec![single_function(
                "run",
                0,
                vec![Instruction::LoadConst { index: 0 }, Instruction::Return],
            )],
        ));
        assert_eq!(call_main(&vm, &[]), CallOutcome::Return(VmValue::Int(42)));
    }

    #[test]
    fn test_integer_arithmetic() {
        let vm = loaded_vm(image_with(
            vec![Constant::Int(6), Constant::Int(7)],
            vec![single_function(
                "run",
                0,
                vec![
                    Instruction::LoadConst { index: 0 },
                    Instruction::LoadConst { index: 1 },
                    Instruction::Mul,
                    Instruction::Return,
                ],
            )],
        ));
        assert_eq!(call_main(&vm, &[]), CallOutcome::Return(VmValue::Int(42)));
    }

    #[test]
    fn test_string_concatenation() {
        let vm = loaded_vm(image_with(
            vec![Constant::String("Hello, ".to_string())],
            vec![single_function(
                "run",
                1,
                vec![
                    Instruction::LoadConst { index: 0 },
                    Instruction::LoadLocal { index: 0 },
                    Instruction::Add,
                    Instruction::Return,
                ],
            )],
        ));
        assert_eq!(
            call_main(&vm, &[VmValue::Str("world".to_string())]),
            CallOutcome::Return(VmValue::Str("Hello, world".to_string()))
        );
    }

    #[test]
    fn test_concatenation_with_number_operand() {
        let vm = loaded_vm(image_with(
            vec![Constant::String("n=".to_string()), Constant::Int(5)],
            vec![single_function(
                "run",
                0,
                vec![
                    Instruction::LoadConst { index: 0 },
                    Instruction::LoadConst { index: 1 },
                    Instruction::Add,
                    Instruction::Return,
                ],
            )],
        ));
        assert_eq!(
            call_main(&vm, &[]),
            CallOutcome::Return(VmValue::Str("n=5".to_string()))
        );
    }

    #[test]
    fn test_conditional_jump() {
        // run(flag): if flag return 1 else return 2
        let vm = loaded_vm(image_with(
            vec![Constant::Int(1), Constant::Int(2)],
            vec![single_function(
                "run",
                1,
                vec![
                    Instruction::LoadLocal { index: 0 },
                    Instruction::JumpIfFalse { offset: 2 },
                    Instruction::LoadConst { index: 0 },
                    Instruction::Return,
                    Instruction::LoadConst { index: 1 },
                    Instruction::Return,
                ],
            )],
        ));
        assert_eq!(
            call_main(&vm, &[VmValue::Bool(true)]),
            CallOutcome::Return(VmValue::Int(1))
        );
        assert_eq!(
            call_main(&vm, &[VmValue::Bool(false)]),
            CallOutcome::Return(VmValue::Int(2))
        );
    }

    #[test]
    fn test_intra_module_call() {
        let vm = loaded_vm(image_with(
            vec![Constant::Int(20), Constant::Int(22)],
            vec![TypeDef {
                name: "Test.Main".to_string(),
                functions: vec![
                    Function {
                        name: "run".to_string(),
                        params: vec![],
                        instructions: vec![
                            Instruction::LoadConst { index: 0 },
                            Instruction::LoadConst { index: 1 },
                            Instruction::Call {
                                type_name: "Test.Main".to_string(),
                                function: "add".to_string(),
                                arg_count: 2,
                            },
                            Instruction::Return,
                        ],
                        local_count: 0,
                    },
                    Function {
                        name: "add".to_string(),
                        params: vec!["a".to_string(), "b".to_string()],
                        instructions: vec![
                            Instruction::LoadLocal { index: 0 },
                            Instruction::LoadLocal { index: 1 },
                            Instruction::Add,
                            Instruction::Return,
                        ],
                        local_count: 0,
                    },
                ],
            }],
        ));
        assert_eq!(call_main(&vm, &[]), CallOutcome::Return(VmValue::Int(42)));
    }

    #[test]
    fn test_raise_unwinds_with_frames() {
        let vm = loaded_vm(image_with(
            vec![Constant::String("boom".to_string())],
            vec![TypeDef {
                name: "Test.Main".to_string(),
                functions: vec![
                    Function {
                        name: "run".to_string(),
                        params: vec![],
                        instructions: vec![
                            Instruction::Call {
                                type_name: "Test.Main".to_string(),
                                function: "inner".to_string(),
                                arg_count: 0,
                            },
                            Instruction::Return,
                        ],
                        local_count: 0,
                    },
                    Function {
                        name: "inner".to_string(),
                        params: vec![],
                        instructions: vec![
                            Instruction::LoadConst { index: 0 },
                            Instruction::Raise,
                        ],
                        local_count: 0,
                    },
                ],
            }],
        ));

        match call_main(&vm, &[]) {
            CallOutcome::Fault(fault) => {
                assert_eq!(fault.message, "boom");
                assert_eq!(
                    fault.frames,
                    vec!["Test.Main.inner".to_string(), "Test.Main.run".to_string()]
                );
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_division_by_zero_faults() {
        let vm = loaded_vm(image_with(
            vec![Constant::Int(1), Constant::Int(0)],
            vec![single_function(
                "run",
                0,
                vec![
                    Instruction::LoadConst { index: 0 },
                    Instruction::LoadConst { index: 1 },
                    Instruction::Div,
                    Instruction::Return,
                ],
            )],
        ));
        match call_main(&vm, &[]) {
            CallOutcome::Fault(fault) => assert_eq!(fault.message, "Division by zero"),
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_arity_enforced() {
        let vm = loaded_vm(image_with(
            vec![],
            vec![single_function("run", 2, vec![Instruction::Return])],
        ));
        let func = vm.resolve("TestMod", "Test.Main", "run").unwrap();
        assert_eq!(func.param_count, 2);

        let err = vm.call(&func, &[VmValue::Int(1)]).unwrap_err();
        assert!(matches!(err, VmError::ExecutionError(_)));
        assert!(err.to_string().contains("expects 2 argument(s)"));
    }

    #[test]
    fn test_call_depth_limit() {
        let vm = loaded_vm(image_with(
            vec![],
            vec![single_function(
                "run",
                0,
                vec![
                    Instruction::Call {
                        type_name: "Test.Main".to_string(),
                        function: "run".to_string(),
                        arg_count: 0,
                    },
                    Instruction::Return,
                ],
            )],
        ));
        let func = vm.resolve("TestMod", "Test.Main", "run").unwrap();
        let err = vm.call(&func, &[]).unwrap_err();
        assert!(err.to_string().contains("depth limit"));
    }

    #[test]
    fn test_fall_off_end_returns_null() {
        let vm = loaded_vm(image_with(
            vec![],
            vec![single_function("run", 0, vec![Instruction::Nop])],
        ));
        assert_eq!(call_main(&vm, &[]), CallOutcome::Return(VmValue::Null));
    }

    #[test]
    fn test_comparisons_and_logic() {
        let vm = loaded_vm(image_with(
            vec![Constant::Int(3), Constant::Int(5)],
            vec![single_function(
                "run",
                0,
                vec![
                    Instruction::LoadConst { index: 0 },
                    Instruction::LoadConst { index: 1 },
                    Instruction::Lt,
                    Instruction::Not,
                    Instruction::Return,
                ],
            )],
        ));
        assert_eq!(call_main(&vm, &[]), CallOutcome::Return(VmValue::Bool(false)));
    }
}
