//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical instruction table and invokes a callback macro for code
//! generation, so the opcode numbers, mnemonics and operand kinds are written
//! down exactly once.
//!
//! This module generates:
//! - The [`Opcode`] enum with its wire byte and `TryFrom<u8>`
//! - The [`Instruction`] enum carrying typed operands
//! - `Display` for [`Instruction`] (disassembly listing)
//!
//! # Operand kinds
//!
//! - `ListId`: list identifier (`i64`, serialized as 16 bits)
//! - `Byte`: literal byte value (`u8`, serialized as decimal text)
//! - `Text`: raw string literal (serialized as UTF-8 text)

use crate::virtual_machine::errors::VMError;
use std::fmt;

/// Identifier of a list register.
pub type ListId = i64;

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            /// N ml ; declare storage list N and make it current
            CreateList = 0x00, "CREATE_LIST" => [list_id: ListId],
            /// N ; append byte N to the current list
            SetValue = 0x01, "SET_VALUE" => [value: Byte],
            /// "text" ; append each character of text to the current list
            SetString = 0x02, "SET_STRING" => [value: Text],
            /// N ml. ; declare output list N and make it current
            OutputList = 0x03, "OUTPUT_LIST" => [list_id: ListId],
            /// N[] ; replace the current list's contents with a copy of list N
            ReferenceList = 0x04, "REFERENCE_LIST" => [ref_id: ListId],
            /// render every output list and stop
            Halt = 0x05, "HALT" => [],
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:expr, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        /// Opcode byte of an instruction.
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<u8> for Opcode {
            type Error = VMError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Opcode::$name), )*
                    _ => Err(VMError::UnknownOpcode { opcode: value }),
                }
            }
        }

        impl Opcode {
            /// Returns the mnemonic used in disassembly listings.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }
        }

        /// A single compiled instruction with its typed operands.
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name {
                    $( $field: define_instructions!(@ty $kind) ),*
                },
            )*
        }

        impl Instruction {
            /// Returns the opcode of this instruction.
            pub const fn opcode(&self) -> Opcode {
                match self {
                    $( Instruction::$name { .. } => Opcode::$name, )*
                }
            }
        }

        impl fmt::Display for Instruction {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(
                        Instruction::$name { $( $field ),* } => {
                            f.write_str($mnemonic)?;
                            $( define_instructions!(@fmt f, $kind, $field)?; )*
                            Ok(())
                        }
                    )*
                }
            }
        }
    };

    // ---------- types ----------
    (@ty ListId) => { ListId };
    (@ty Byte)   => { u8 };
    (@ty Text)   => { String };

    // ---------- listing ----------
    (@fmt $f:ident, Text, $v:ident) => {
        write!($f, " \"{}\"", $v)
    };
    (@fmt $f:ident, $kind:ident, $v:ident) => {
        write!($f, " {}", $v)
    };
}

for_each_instruction!(define_instructions);

impl Instruction {
    /// List declared by `CREATE_LIST`/`OUTPUT_LIST`, 0 for every other opcode.
    pub fn list_id(&self) -> ListId {
        match self {
            Instruction::CreateList { list_id } | Instruction::OutputList { list_id } => *list_id,
            _ => 0,
        }
    }

    /// List copied by `REFERENCE_LIST`, 0 for every other opcode.
    pub fn ref_id(&self) -> ListId {
        match self {
            Instruction::ReferenceList { ref_id } => *ref_id,
            _ => 0,
        }
    }

    /// Text form of the value operand: decimal for `SET_VALUE`, the raw literal
    /// for `SET_STRING`, empty otherwise.
    pub fn value_text(&self) -> String {
        match self {
            Instruction::SetValue { value } => value.to_string(),
            Instruction::SetString { value } => value.clone(),
            _ => String::new(),
        }
    }
}
