//! Command-line argument parsing.
//!
//! The grammar is small enough to walk by hand:
//!
//! ```text
//! microlist [FLAGS] <source.ml>
//! microlist [FLAGS] -c <source.ml> [-o <out.mlist>]
//! microlist [FLAGS] -x <program.mlist>
//! microlist [FLAGS] -d <program.mlist>
//! microlist [FLAGS] -i
//! ```

use crate::virtual_machine::errors::VMError;
use microlist_derive::Error;
use std::path::{Path, PathBuf};

/// Source file extension stripped when deriving the binary name.
pub const SOURCE_EXTENSION: &str = ".ml";
/// Extension appended to compiled programs.
pub const BINARY_EXTENSION: &str = ".mlist";

pub const USAGE: &str = "\
MicroList Compiler

USAGE:
    {program} [FLAGS] <source.ml>              Compile and run
    {program} [FLAGS] -c <source.ml> [-o out]  Compile to binary
    {program} [FLAGS] -x <program.mlist>       Run a compiled binary
    {program} [FLAGS] -d <program.mlist>       Disassemble a compiled binary
    {program} [FLAGS] -i                       Interactive mode

FLAGS:
    -q, --quiet        Suppress informational log lines
    --no-timestamp     Omit timestamps from log lines
    -h, --help         Print this help message

SYNTAX:
    1 ml          // Create list 1 (no output)
    \"hello\"       // Add string to current list
    42            // Add number (0-255) to current list
    2 ml.         // Create list 2 (with output)
    1[]           // Replace current list with a copy of list 1

Only 'ml.' lists produce output, 'ml' lists are storage only.
";

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compile a source file and run it.
    Run { source: PathBuf },
    /// Compile a source file to a `.mlist` binary.
    Compile { source: PathBuf, output: PathBuf },
    /// Load a `.mlist` binary and run it.
    Execute { binary: PathBuf },
    /// Print the instructions of a `.mlist` binary.
    Disassemble { binary: PathBuf },
    /// Start the interactive shell.
    Interactive,
    /// Print usage and exit successfully.
    Help,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    pub quiet: bool,
    pub show_timestamp: bool,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("no command given")]
    MissingCommand,
    #[error("{flag} requires an argument")]
    MissingOperand { flag: String },
    #[error("unexpected argument: {arg}")]
    UnexpectedArgument { arg: String },
    #[error("-o is only valid together with -c")]
    OutputWithoutCompile,
}

/// Mode selected so far while walking the arguments.
enum Mode {
    Run(PathBuf),
    Compile(PathBuf),
    Execute(PathBuf),
    Disassemble(PathBuf),
    Interactive,
}

/// Parses arguments, excluding the program name.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Cli, CliError> {
    let mut mode: Option<Mode> = None;
    let mut output: Option<PathBuf> = None;
    let mut quiet = false;
    let mut show_timestamp = true;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_ref();
        let mut operand = |flag: &str| -> Result<PathBuf, CliError> {
            i += 1;
            args.get(i)
                .map(|a| PathBuf::from(a.as_ref()))
                .ok_or_else(|| CliError::MissingOperand {
                    flag: flag.to_string(),
                })
        };

        let next = match arg {
            "-h" | "--help" => {
                return Ok(Cli {
                    command: Command::Help,
                    quiet,
                    show_timestamp,
                });
            }
            "-q" | "--quiet" => {
                quiet = true;
                None
            }
            "--no-timestamp" => {
                show_timestamp = false;
                None
            }
            "-o" | "--output" => {
                output = Some(operand(arg)?);
                None
            }
            "-c" => Some(Mode::Compile(operand(arg)?)),
            "-x" => Some(Mode::Execute(operand(arg)?)),
            "-d" => Some(Mode::Disassemble(operand(arg)?)),
            "-i" => Some(Mode::Interactive),
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(CliError::UnexpectedArgument {
                    arg: other.to_string(),
                });
            }
            path => Some(Mode::Run(PathBuf::from(path))),
        };

        if let Some(next) = next {
            if mode.is_some() {
                return Err(CliError::UnexpectedArgument {
                    arg: arg.to_string(),
                });
            }
            mode = Some(next);
        }
        i += 1;
    }

    let command = match mode.ok_or(CliError::MissingCommand)? {
        Mode::Compile(source) => {
            let output = output.unwrap_or_else(|| default_output_path(&source));
            Command::Compile { source, output }
        }
        _ if output.is_some() => return Err(CliError::OutputWithoutCompile),
        Mode::Run(source) => Command::Run { source },
        Mode::Execute(binary) => Command::Execute { binary },
        Mode::Disassemble(binary) => Command::Disassemble { binary },
        Mode::Interactive => Command::Interactive,
    };

    Ok(Cli {
        command,
        quiet,
        show_timestamp,
    })
}

/// Derives the binary path for `source`: a trailing `.ml` is stripped and
/// `.mlist` appended, so `prog.ml` becomes `prog.mlist` and `prog` becomes
/// `prog.mlist`.
pub fn default_output_path(source: &Path) -> PathBuf {
    let text = source.to_string_lossy();
    let stem = text.strip_suffix(SOURCE_EXTENSION).unwrap_or(&text);
    PathBuf::from(format!("{stem}{BINARY_EXTENSION}"))
}

/// Log line for a failed command, or `None` when the failure was already
/// reported. Compile errors are, by the compiler's source diagnostic.
pub fn failure_message(err: &VMError) -> Option<String> {
    match err {
        _ if err.is_compile_error() => None,
        VMError::IoError { .. }
        | VMError::DecodeError { .. }
        | VMError::UnknownOpcode { .. }
        | VMError::InvalidValue { .. } => Some(err.to_string()),
        _ => Some(format!("Runtime error: {err}")),
    }
}

/// Usage text with the program name filled in.
pub fn usage(program: &str) -> String {
    USAGE.replace("{program}", program)
}
