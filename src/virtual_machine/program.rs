//! Bytecode program representation and serialization.
//!
//! A [`Program`] is the compiled instruction sequence. Its portable form is the
//! `.mlist` container, big-endian throughout:
//!
//! ```text
//! magic        5 bytes   "MLIST"
//! version      2 bytes   major, minor (1, 0)
//! count        4 bytes   number of instructions
//! per instruction:
//!   opcode     1 byte
//!   list_id    2 bytes   truncated to 16 bits
//!   ref_id     2 bytes   truncated to 16 bits
//!   value_len  1 byte
//!   value      value_len bytes of UTF-8 text
//! ```
//!
//! Value text longer than 255 bytes does not fit the length field and is cut
//! at the last character boundary that does.

use crate::types::encoding::{Decode, Encode, EncodeSink};
use crate::types::short_bytes::ShortBytes;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Instruction, ListId, Opcode};
use microlist_derive::BinaryCodec;

/// Magic bytes identifying a serialized MicroList program.
const MAGIC: &[u8; 5] = b"MLIST";

/// Current bytecode format version.
const CURRENT_VERSION: Version = Version::new(1, 0);

/// Size of [`ProgramHeader`] on the wire.
const HEADER_LEN: usize = 5 + 2 + 4;

/// Bytecode format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, BinaryCodec)]
struct Version {
    major: u8,
    minor: u8,
}

impl Version {
    const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

#[derive(Debug, BinaryCodec)]
struct ProgramHeader {
    magic: [u8; 5],
    version: Version,
    instruction_count: u32,
}

/// Fixed-layout wire record of one instruction.
#[derive(Debug, PartialEq, Eq, BinaryCodec)]
struct InstructionRecord {
    opcode: u8,
    list_id: u16,
    ref_id: u16,
    value: ShortBytes,
}

impl From<&Instruction> for InstructionRecord {
    fn from(instr: &Instruction) -> Self {
        Self {
            opcode: instr.opcode() as u8,
            list_id: instr.list_id() as u16,
            ref_id: instr.ref_id() as u16,
            value: ShortBytes::from_text(&instr.value_text()),
        }
    }
}

impl TryFrom<InstructionRecord> for Instruction {
    type Error = VMError;

    fn try_from(record: InstructionRecord) -> Result<Self, Self::Error> {
        let list_id = ListId::from(record.list_id);
        let ref_id = ListId::from(record.ref_id);

        Ok(match Opcode::try_from(record.opcode)? {
            Opcode::CreateList => Instruction::CreateList { list_id },
            Opcode::OutputList => Instruction::OutputList { list_id },
            Opcode::ReferenceList => Instruction::ReferenceList { ref_id },
            Opcode::SetValue => {
                let text = String::from_utf8_lossy(&record.value);
                let value = text.parse::<u8>().map_err(|_| VMError::InvalidValue {
                    value: text.to_string(),
                })?;
                Instruction::SetValue { value }
            }
            Opcode::SetString => {
                let value = String::from_utf8(record.value.into_inner()).map_err(|_| {
                    VMError::DecodeError {
                        reason: "invalid utf8 in string".to_string(),
                    }
                })?;
                Instruction::SetString { value }
            }
            Opcode::Halt => Instruction::Halt {},
        })
    }
}

/// Compiled MicroList program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions, including the trailing `HALT`.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Serializes the program to the `.mlist` container.
    pub fn to_bytes(&self) -> Vec<u8> {
        Encode::to_bytes(self)
    }

    /// Deserializes a program from its `.mlist` representation.
    ///
    /// Rejects truncated input, a foreign magic tag, any version other than
    /// the current one, unknown opcodes and trailing bytes.
    pub fn from_bytes(mut input: &[u8]) -> Result<Self, VMError> {
        if input.len() < HEADER_LEN {
            return Err(VMError::DecodeError {
                reason: "truncated".to_string(),
            });
        }

        let header = ProgramHeader::decode(&mut input)?;
        if &header.magic != MAGIC {
            return Err(VMError::DecodeError {
                reason: "bad magic".to_string(),
            });
        }

        if header.version != CURRENT_VERSION {
            return Err(VMError::DecodeError {
                reason: "unsupported version".to_string(),
            });
        }

        // Each record is at least 6 bytes, which bounds the allocation.
        let count = header.instruction_count as usize;
        let mut instructions = Vec::with_capacity(count.min(input.len() / 6));
        for _ in 0..count {
            let record = InstructionRecord::decode(&mut input)?;
            instructions.push(Instruction::try_from(record)?);
        }

        if !input.is_empty() {
            return Err(VMError::DecodeError {
                reason: "trailing bytes".to_string(),
            });
        }
        Ok(Self { instructions })
    }
}

impl Encode for [Instruction] {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        ProgramHeader {
            magic: *MAGIC,
            version: CURRENT_VERSION,
            instruction_count: self.len() as u32,
        }
        .encode(out);
        for instr in self {
            InstructionRecord::from(instr).encode(out);
        }
    }
}

impl Encode for Program {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.instructions.as_slice().encode(out);
    }
}
