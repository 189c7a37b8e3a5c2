//! MicroList source compiler.
//!
//! Lowers newline-delimited source text into a flat [`Instruction`] sequence,
//! one instruction per statement, terminated by a single `HALT`.
//!
//! # Syntax
//!
//! ```text
//! 1 ml        // declare storage list 1 and make it current
//! 2 ml.       // declare output list 2 and make it current
//! "hello"     // append each character to the current list
//! 42          // append the byte 42 (0-255) to the current list
//! 1[]         // replace the current list's contents with a copy of list 1
//! ```
//!
//! Lines are trimmed; blank lines and lines starting with `//` are skipped but
//! still count toward line numbers. Each line is matched against the rules
//! above in a fixed priority order (declaration, reference, string, number)
//! and the first error aborts compilation.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Instruction, ListId};
use std::fmt::Write;
use std::fs;
use std::path::Path;

const COMMENT_PREFIX: &str = "//";
const STORAGE_MARKER: &str = "ml";
const OUTPUT_MARKER: &str = "ml.";
const REFERENCE_SUFFIX: &str = "[]";
const QUOTE: char = '"';

/// Formats a compiler-style diagnostic for a failed compilation.
fn render_compile_diagnostic(file: &str, source: &str, line: usize, message: &str) -> String {
    let mut diag = String::new();
    let _ = writeln!(diag, "error: {message}");
    let _ = writeln!(diag, " --> {file}:{line}");

    if let Some(raw_line) = source.lines().nth(line.saturating_sub(1)) {
        let line_text = raw_line.trim_end_matches('\r');
        let indent = line_text.len() - line_text.trim_start().len();
        let width = line_text.trim().chars().count().max(1);
        let _ = writeln!(diag, "  |");
        let _ = writeln!(diag, "{:>4} | {}", line, line_text);
        let _ = writeln!(diag, "  | {}{}", " ".repeat(indent), "^".repeat(width));
    }

    diag
}

/// Emit a diagnostic to stderr for compile errors.
fn log_compile_error(file: &str, source: &str, err: &VMError) {
    match err {
        VMError::CompileError { line, source: inner } => {
            eprintln!(
                "{}",
                render_compile_diagnostic(file, source, *line, &inner.to_string())
            );
        }
        _ => eprintln!("error: {err}"),
    }
}

/// Single-pass, line-at-a-time compiler.
///
/// The only state carried between lines is the current line index and the
/// instructions emitted so far.
pub struct Compiler<'a> {
    lines: Vec<&'a str>,
    current_line: usize,
    instructions: Vec<Instruction>,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            current_line: 0,
            instructions: Vec::new(),
        }
    }

    /// Compiles every line and appends the terminating `HALT`.
    ///
    /// On error the partially built sequence is dropped together with the
    /// compiler, so callers never observe instructions without a `HALT`.
    pub fn compile(mut self) -> Result<Vec<Instruction>, VMError> {
        while self.current_line < self.lines.len() {
            let line = self.lines[self.current_line].trim();

            if !line.is_empty() && !line.starts_with(COMMENT_PREFIX) {
                let instr = parse_line(line).map_err(|e| VMError::CompileError {
                    line: self.current_line + 1,
                    source: Box::new(e),
                })?;
                self.instructions.push(instr);
            }

            self.current_line += 1;
        }

        self.instructions.push(Instruction::Halt {});
        Ok(self.instructions)
    }
}

/// Parses one trimmed, non-empty, non-comment line.
pub(crate) fn parse_line(line: &str) -> Result<Instruction, VMError> {
    if let Some(instr) = parse_declaration(line) {
        return Ok(instr);
    }

    if let Some(ref_id) = parse_reference(line) {
        return Ok(Instruction::ReferenceList { ref_id });
    }

    if let Some(text) = parse_string(line) {
        return Ok(Instruction::SetString {
            value: text.to_string(),
        });
    }

    if let Ok(value) = line.parse::<i64>() {
        return u8::try_from(value)
            .map(|value| Instruction::SetValue { value })
            .map_err(|_| VMError::ValueOutOfRange { value });
    }

    Err(VMError::UnknownInstruction {
        line: line.to_string(),
    })
}

/// Parses `N ml` / `N ml.`; extra tokens after the marker are ignored.
fn parse_declaration(line: &str) -> Option<Instruction> {
    let mut tokens = line.split_whitespace();
    let list_id = tokens.next()?.parse::<ListId>().ok()?;
    match tokens.next()? {
        STORAGE_MARKER => Some(Instruction::CreateList { list_id }),
        OUTPUT_MARKER => Some(Instruction::OutputList { list_id }),
        _ => None,
    }
}

/// Parses `N[]`.
fn parse_reference(line: &str) -> Option<ListId> {
    line.strip_suffix(REFERENCE_SUFFIX)?.parse::<ListId>().ok()
}

/// Returns the text between a leading and trailing quote. No escapes.
fn parse_string(line: &str) -> Option<&str> {
    line.strip_prefix(QUOTE)?.strip_suffix(QUOTE)
}

/// Compiles MicroList source text into an instruction sequence.
pub fn compile(source: &str) -> Result<Vec<Instruction>, VMError> {
    Compiler::new(source).compile()
}

/// Compiles source with an associated filename, logging a compiler-style
/// diagnostic to stderr on failure.
pub fn compile_source_with_name(
    source: &str,
    source_name: &str,
) -> Result<Vec<Instruction>, VMError> {
    let result = compile(source);
    if let Err(err) = &result {
        log_compile_error(source_name, source, err);
    }
    result
}

/// Convenience: compile directly from a file path.
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<Vec<Instruction>, VMError> {
    let path_ref = path.as_ref();
    let source = fs::read_to_string(path_ref).map_err(|e| VMError::IoError {
        path: path_ref.display().to_string(),
        source: e.to_string(),
    })?;
    compile_source_with_name(&source, &path_ref.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halt() -> Instruction {
        Instruction::Halt {}
    }

    fn compile_err(source: &str) -> (usize, VMError) {
        match compile(source).unwrap_err() {
            VMError::CompileError { line, source } => (line, *source),
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn empty_source_is_just_halt() {
        assert_eq!(compile("").unwrap(), vec![halt()]);
        assert_eq!(compile("\n\n   \n").unwrap(), vec![halt()]);
    }

    #[test]
    fn comments_are_skipped() {
        let source = format!("{COMMENT_PREFIX} header\n   {COMMENT_PREFIX} indented\n1 ml.");
        assert_eq!(
            compile(&source).unwrap(),
            vec![Instruction::OutputList { list_id: 1 }, halt()]
        );
    }

    #[test]
    fn declarations() {
        assert_eq!(
            parse_line("1 ml").unwrap(),
            Instruction::CreateList { list_id: 1 }
        );
        assert_eq!(
            parse_line("12 ml.").unwrap(),
            Instruction::OutputList { list_id: 12 }
        );
        assert_eq!(
            parse_line("-3   ml").unwrap(),
            Instruction::CreateList { list_id: -3 }
        );
        assert_eq!(
            parse_line("4 ml. trailing").unwrap(),
            Instruction::OutputList { list_id: 4 }
        );
    }

    #[test]
    fn declaration_with_bad_marker_falls_through() {
        assert!(matches!(
            parse_line("1 list"),
            Err(VMError::UnknownInstruction { ref line }) if line == "1 list"
        ));
        assert!(matches!(
            parse_line("x ml"),
            Err(VMError::UnknownInstruction { .. })
        ));
    }

    #[test]
    fn references() {
        assert_eq!(
            parse_line("1[]").unwrap(),
            Instruction::ReferenceList { ref_id: 1 }
        );
        assert_eq!(
            parse_line("-7[]").unwrap(),
            Instruction::ReferenceList { ref_id: -7 }
        );
        assert!(matches!(
            parse_line("a[]"),
            Err(VMError::UnknownInstruction { .. })
        ));
        assert!(matches!(
            parse_line("1 []"),
            Err(VMError::UnknownInstruction { .. })
        ));
    }

    #[test]
    fn strings_are_taken_verbatim() {
        assert_eq!(
            parse_line("\"hi\"").unwrap(),
            Instruction::SetString { value: "hi".into() }
        );
        assert_eq!(
            parse_line("\"\"").unwrap(),
            Instruction::SetString { value: String::new() }
        );
        assert_eq!(
            parse_line(r#""a\n"b""#).unwrap(),
            Instruction::SetString {
                value: r#"a\n"b"#.into()
            }
        );
    }

    #[test]
    fn lone_quote_is_not_a_string() {
        assert!(matches!(
            parse_line("\""),
            Err(VMError::UnknownInstruction { .. })
        ));
    }

    #[test]
    fn quoted_brackets_are_a_string() {
        assert_eq!(
            parse_line("\"x[]\"").unwrap(),
            Instruction::SetString { value: "x[]".into() }
        );
    }

    #[test]
    fn numeric_bounds() {
        assert_eq!(parse_line("0").unwrap(), Instruction::SetValue { value: 0 });
        assert_eq!(
            parse_line("255").unwrap(),
            Instruction::SetValue { value: 255 }
        );
        assert_eq!(
            parse_line("+7").unwrap(),
            Instruction::SetValue { value: 7 }
        );
        assert!(matches!(
            parse_line("256"),
            Err(VMError::ValueOutOfRange { value: 256 })
        ));
        assert!(matches!(
            parse_line("-1"),
            Err(VMError::ValueOutOfRange { value: -1 })
        ));
    }

    #[test]
    fn oversized_integer_is_unknown_instruction() {
        assert!(matches!(
            parse_line("99999999999999999999"),
            Err(VMError::UnknownInstruction { .. })
        ));
    }

    #[test]
    fn exactly_one_trailing_halt() {
        let program = compile("1 ml.\n\"hi\"\n33\n2 ml\n1[]").unwrap();
        let halts = program
            .iter()
            .filter(|i| matches!(i, Instruction::Halt {}))
            .count();
        assert_eq!(halts, 1);
        assert_eq!(program.last(), Some(&halt()));
        assert_eq!(program.len(), 6);
    }

    #[test]
    fn scenario_a_compiles() {
        assert_eq!(
            compile("1 ml.\n\"hi\"\n33").unwrap(),
            vec![
                Instruction::OutputList { list_id: 1 },
                Instruction::SetString { value: "hi".into() },
                Instruction::SetValue { value: 33 },
                halt(),
            ]
        );
    }

    #[test]
    fn scenario_c_reports_line_two() {
        let (line, err) = compile_err("1 ml\n999");
        assert_eq!(line, 2);
        assert!(matches!(err, VMError::ValueOutOfRange { value: 999 }));
        assert_eq!(
            compile("1 ml\n999").unwrap_err().to_string(),
            "line 2: value 999 out of range (0-255)"
        );
    }

    #[test]
    fn line_numbers_count_skipped_lines() {
        let (line, err) = compile_err("\n// comment\n\n1 ml\nbogus");
        assert_eq!(line, 5);
        assert!(matches!(err, VMError::UnknownInstruction { ref line } if line == "bogus"));
    }

    #[test]
    fn first_error_wins() {
        let (line, _) = compile_err("1 ml\nfoo\n300");
        assert_eq!(line, 2);
    }

    #[test]
    fn crlf_and_indentation_are_trimmed() {
        assert_eq!(
            compile("  1 ml.  \r\n\t65\r\n").unwrap(),
            vec![
                Instruction::OutputList { list_id: 1 },
                Instruction::SetValue { value: 65 },
                halt(),
            ]
        );
    }

    #[test]
    fn diagnostic_points_at_line() {
        let diag = render_compile_diagnostic(
            "prog.ml",
            "1 ml\n  999",
            2,
            "value 999 out of range (0-255)",
        );
        assert!(diag.starts_with("error: value 999 out of range (0-255)\n"));
        assert!(diag.contains(" --> prog.ml:2\n"));
        assert!(diag.contains("   2 |   999\n"));
        assert!(diag.contains("  |   ^^^\n"));
    }

    #[test]
    fn compile_file_missing() {
        let err = compile_file("/definitely/not/here.ml").unwrap_err();
        assert!(matches!(
            err,
            VMError::IoError { ref path, .. } if path == "/definitely/not/here.ml"
        ));
    }

    #[test]
    fn compile_file_reads_source() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("hello.ml");
        fs::write(&path, "1 ml.\n\"ok\"\n").unwrap();
        let program = compile_file(&path).unwrap();
        assert_eq!(program.len(), 3);
    }
}
