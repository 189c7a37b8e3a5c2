//! MicroList library.
//!
//! Provides the MicroList compiler, virtual machine, bytecode format and the
//! interactive shell built on top of them.

pub mod cli;
pub mod shell;
pub mod types;
pub mod utils;
pub mod virtual_machine;
