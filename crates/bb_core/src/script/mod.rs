//! Behavior-script surface: authored block graphs, authoring-time safety
//! checks, compilation and the sandboxed interpreter.

pub mod blocks;
pub mod compile;
pub mod interp;
pub mod recursion;

pub use blocks::{BlockProgram, EventTrigger};
pub use compile::{CompiledProgram, CompiledPrograms};
pub use interp::ScriptError;
pub use recursion::{check_insertion, check_program, RecursionViolation};
