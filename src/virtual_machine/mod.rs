//! Compiler and virtual machine for the MicroList list-building language.
//!
//! Source text is lowered by the compiler into a flat instruction sequence,
//! which the VM executes against a set of numbered byte lists. Output lists
//! are rendered when `HALT` executes.
//!
//! # Architecture
//!
//! - **Lists**: numbered registers holding bytes; any `i64` id is allowed
//! - **Cursor**: the most recently declared list receives every append
//! - **Execution model**: strictly linear, no jumps; the first error aborts
//! - **Rendering**: printable ASCII is written as-is, every other byte as `[N]`
//!
//! # Modules
//!
//! - [`compiler`]: Source parsing, diagnostics and instruction emission
//! - [`errors`]: Compile, runtime and decoding error types
//! - [`isa`]: Instruction set definition and opcode mappings
//! - [`program`]: The `.mlist` bytecode container (writer and reader)
//! - [`vm`]: Core virtual machine, list registry and output rendering

pub mod compiler;
pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod program;
pub mod vm;
