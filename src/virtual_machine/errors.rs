use crate::types::encoding::DecodeError;
use crate::virtual_machine::isa::ListId;
use microlist_derive::Error;

/// Errors raised while compiling, executing, or (de)serializing a program.
#[derive(Debug, Error)]
pub enum VMError {
    // =========================
    // Compile time
    // =========================
    /// Numeric literal outside the byte range.
    #[error("value {value} out of range (0-255)")]
    ValueOutOfRange { value: i64 },
    /// Line matches none of the grammar rules.
    #[error("unknown instruction: {line}")]
    UnknownInstruction { line: String },
    /// Compile failure tagged with its 1-based source line.
    #[error("line {line}: {source}")]
    CompileError { line: usize, source: Box<VMError> },

    // =========================
    // Runtime
    // =========================
    /// Value, string or reference issued before any list was declared.
    #[error("no current list to add {target} to")]
    NoCurrentList { target: &'static str },
    /// `N[]` names a list that was never declared.
    #[error("referenced list {id} does not exist")]
    UndefinedList { id: ListId },
    /// String literal character above U+00FF.
    #[error("character {ch} out of 8-bit range")]
    CharOutOfRange { ch: char },
    /// Opcode byte outside the instruction set.
    #[error("unknown opcode: {opcode}")]
    UnknownOpcode { opcode: u8 },
    /// `SET_VALUE` payload that is not a decimal byte.
    #[error("invalid value: {value}")]
    InvalidValue { value: String },
    /// Rendering to the output sink failed.
    #[error("output error: {0}")]
    OutputError(String),

    // =========================
    // Files and bytecode
    // =========================
    #[error("io error on {path}: {source}")]
    IoError { path: String, source: String },
    #[error("decoding error: {reason}")]
    DecodeError { reason: String },
}

impl From<DecodeError> for VMError {
    fn from(err: DecodeError) -> Self {
        VMError::DecodeError {
            reason: err.to_string(),
        }
    }
}

impl VMError {
    /// True for errors produced by the compiler rather than the VM.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            VMError::CompileError { .. }
                | VMError::ValueOutOfRange { .. }
                | VMError::UnknownInstruction { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_display_includes_line() {
        let err = VMError::CompileError {
            line: 2,
            source: Box::new(VMError::ValueOutOfRange { value: 999 }),
        };
        assert_eq!(err.to_string(), "line 2: value 999 out of range (0-255)");
        assert!(err.is_compile_error());
    }

    #[test]
    fn runtime_error_messages() {
        assert_eq!(
            VMError::NoCurrentList { target: "string" }.to_string(),
            "no current list to add string to"
        );
        assert_eq!(
            VMError::UndefinedList { id: 5 }.to_string(),
            "referenced list 5 does not exist"
        );
        assert_eq!(
            VMError::CharOutOfRange { ch: 'Ā' }.to_string(),
            "character Ā out of 8-bit range"
        );
        assert!(!VMError::UnknownOpcode { opcode: 9 }.is_compile_error());
    }

    #[test]
    fn decode_error_converts() {
        let err: VMError = DecodeError::UnexpectedEof.into();
        assert!(matches!(
            err,
            VMError::DecodeError { ref reason } if reason == "unexpected end of input"
        ));
    }
}
