//! Core virtual machine implementation.
//!
//! The VM executes an instruction sequence against a set of numbered byte
//! lists. Execution is strictly linear: the program counter starts at 0 and
//! advances by one after every instruction until `HALT` renders the output
//! lists, an instruction fails, or the sequence runs out.

mod lists;
pub mod render;

pub use lists::MicroList;

use crate::types::encoding::Encode;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Instruction, ListId};
use crate::virtual_machine::program::Program;
use lists::{Cursor, Lists};
use render::render_list;
use std::io::{self, Write};

/// Why a run ended successfully.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitReason {
    /// `HALT` executed and the output lists were rendered.
    Halted,
    /// The sequence ended without a `HALT`; nothing was rendered.
    EndOfProgram,
}

/// What the dispatch loop does after an instruction.
enum Flow {
    Continue,
    Halt,
}

/// MicroList virtual machine.
///
/// Owns the loaded instruction sequence and, during a run, every declared
/// list. Each call to [`VM::execute`] starts from an empty list set.
#[derive(Default)]
pub struct VM {
    /// Loaded instructions.
    instructions: Vec<Instruction>,
    /// Program counter (index into `instructions`).
    pc: usize,
    /// Lists of the current (or last) run.
    lists: Lists,
}

impl VM {
    /// Creates a VM with no program loaded.
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            pc: 0,
            lists: Lists::new(),
        }
    }

    /// Resets all state and binds `instructions` as the program.
    pub fn load_program(&mut self, instructions: Vec<Instruction>) {
        self.instructions = instructions;
        self.pc = 0;
        self.lists.clear();
    }

    /// Decodes a `.mlist` container and loads it.
    pub fn load_bytecode(&mut self, bytes: &[u8]) -> Result<(), VMError> {
        let program = Program::from_bytes(bytes)?;
        self.load_program(program.instructions);
        Ok(())
    }

    /// Runs the loaded program, rendering output lists to stdout.
    pub fn execute(&mut self) -> Result<ExitReason, VMError> {
        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());
        let reason = self.execute_to(&mut out)?;
        out.flush().map_err(|e| VMError::OutputError(e.to_string()))?;
        Ok(reason)
    }

    /// Runs the loaded program, rendering output lists to `out`.
    ///
    /// Nothing is written unless `HALT` is reached.
    pub fn execute_to<W: Write>(&mut self, out: &mut W) -> Result<ExitReason, VMError> {
        self.pc = 0;
        self.lists.clear();

        let VM {
            instructions,
            pc,
            lists,
        } = self;
        let mut cursor: Cursor = None;

        while let Some(instr) = instructions.get(*pc) {
            match step(lists, &mut cursor, instr)? {
                Flow::Continue => *pc += 1,
                Flow::Halt => {
                    render_outputs(lists, out)?;
                    return Ok(ExitReason::Halted);
                }
            }
        }

        Ok(ExitReason::EndOfProgram)
    }

    /// Serializes the loaded program to the `.mlist` container.
    pub fn serialize_to_binary(&self) -> Vec<u8> {
        Encode::to_bytes(self.instructions.as_slice())
    }

    /// The loaded instruction sequence.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Program counter after the last run (index of `HALT` or of the failing instruction).
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Returns list `id` as left by the last run.
    pub fn list(&self, id: ListId) -> Option<&MicroList> {
        self.lists.get(id)
    }

    /// Iterates the lists of the last run in ascending id order.
    pub fn lists(&self) -> impl Iterator<Item = &MicroList> {
        self.lists.iter()
    }

    /// Number of lists declared by the last run.
    pub fn list_count(&self) -> usize {
        self.lists.len()
    }
}

/// Executes one instruction against `lists`, moving `cursor` on declarations.
fn step(lists: &mut Lists, cursor: &mut Cursor, instr: &Instruction) -> Result<Flow, VMError> {
    match instr {
        Instruction::CreateList { list_id } => {
            *cursor = lists.declare(*list_id, false);
        }
        Instruction::OutputList { list_id } => {
            *cursor = lists.declare(*list_id, true);
        }
        Instruction::SetValue { value } => {
            lists.current_mut(*cursor, "value")?.push(*value);
        }
        Instruction::SetString { value } => {
            let list = lists.current_mut(*cursor, "string")?;
            list.extend(&string_bytes(value)?);
        }
        Instruction::ReferenceList { ref_id } => {
            lists.current_mut(*cursor, "reference")?;
            let copy = lists.snapshot(*ref_id)?;
            lists.current_mut(*cursor, "reference")?.replace(copy);
        }
        Instruction::Halt {} => return Ok(Flow::Halt),
    }
    Ok(Flow::Continue)
}

/// Converts a string literal to bytes, one per character.
///
/// Only the upper bound is checked: any code point up to U+00FF, control
/// characters included, becomes the byte of the same value.
fn string_bytes(text: &str) -> Result<Vec<u8>, VMError> {
    text.chars()
        .map(|ch| u8::try_from(ch).map_err(|_| VMError::CharOutOfRange { ch }))
        .collect()
}

/// Renders every output list in ascending id order.
fn render_outputs<W: Write>(lists: &Lists, out: &mut W) -> Result<(), VMError> {
    for list in lists.outputs() {
        render_list(list.values(), out).map_err(|e| VMError::OutputError(e.to_string()))?;
    }
    Ok(())
}
