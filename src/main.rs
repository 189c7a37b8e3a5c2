//! MicroList command-line tool.
//!
//! Compiles and runs MicroList source, writes and reads `.mlist` binaries,
//! and hosts the interactive shell.
//!
//! # Usage
//! ```text
//! microlist <source.ml>
//! microlist -c <source.ml> [-o <out.mlist>]
//! microlist -x <program.mlist>
//! microlist -d <program.mlist>
//! microlist -i
//! ```
//!
//! Rendered lists go to stdout; log lines and diagnostics go to stderr.

use microlist::cli::{self, Cli, CliError, Command};
use microlist::shell;
use microlist::utils::log::{QUIET, SHOW_TIMESTAMP};
use microlist::virtual_machine::compiler::compile_file;
use microlist::virtual_machine::errors::VMError;
use microlist::virtual_machine::program::Program;
use microlist::virtual_machine::vm::{ExitReason, VM};
use microlist::{error, info, warn};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::Ordering;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("microlist");

    let Cli {
        command,
        quiet,
        show_timestamp,
    } = match cli::parse_args(&args[1.min(args.len())..]) {
        Ok(cli) => cli,
        Err(CliError::MissingCommand) => {
            eprintln!("{}", cli::usage(program));
            process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{}", cli::usage(program));
            process::exit(1);
        }
    };

    QUIET.store(quiet, Ordering::Relaxed);
    SHOW_TIMESTAMP.store(show_timestamp, Ordering::Relaxed);

    let result = match command {
        Command::Help => {
            println!("{}", cli::usage(program));
            Ok(())
        }
        Command::Run { source } => run_source(&source),
        Command::Compile { source, output } => compile_to_binary(&source, &output),
        Command::Execute { binary } => run_binary(&binary),
        Command::Disassemble { binary } => disassemble(&binary),
        Command::Interactive => {
            shell::run_interactive().map_err(|e| VMError::OutputError(e.to_string()))
        }
    };

    if let Err(e) = result {
        if let Some(message) = cli::failure_message(&e) {
            error!("{message}");
        }
        process::exit(1);
    }
}

/// Compiles `source` and runs it.
fn run_source(source: &Path) -> Result<(), VMError> {
    let instructions = compile_file(source)?;
    let mut vm = VM::new();
    vm.load_program(instructions);
    run(&mut vm)
}

/// Compiles `source` and writes the `.mlist` container to `output`.
fn compile_to_binary(source: &Path, output: &Path) -> Result<(), VMError> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(VMError::IoError {
            path: parent.display().to_string(),
            source: "output directory does not exist".to_string(),
        });
    }

    let program = Program::new(compile_file(source)?);
    let bytecode = program.to_bytes();
    fs::write(output, &bytecode).map_err(|e| VMError::IoError {
        path: output.display().to_string(),
        source: e.to_string(),
    })?;

    info!(
        "Compiled {} -> {} ({} bytes)",
        source.display(),
        output.display(),
        bytecode.len()
    );
    info!("Instructions: {}", program.len());
    Ok(())
}

/// Loads a `.mlist` binary and runs it.
fn run_binary(binary: &Path) -> Result<(), VMError> {
    let bytes = read_binary(binary)?;
    let mut vm = VM::new();
    vm.load_bytecode(&bytes)?;
    run(&mut vm)
}

/// Prints one instruction per line, prefixed with its index.
fn disassemble(binary: &Path) -> Result<(), VMError> {
    let program = Program::from_bytes(&read_binary(binary)?)?;
    if program.is_empty() {
        warn!("{} contains no instructions", binary.display());
    }
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    for (index, instr) in program.instructions.iter().enumerate() {
        writeln!(out, "{index:>4}  {instr}").map_err(|e| VMError::OutputError(e.to_string()))?;
    }
    out.flush().map_err(|e| VMError::OutputError(e.to_string()))
}

fn run(vm: &mut VM) -> Result<(), VMError> {
    if vm.execute()? == ExitReason::EndOfProgram {
        warn!("program ended without HALT; no output rendered");
    }
    Ok(())
}

fn read_binary(path: &Path) -> Result<Vec<u8>, VMError> {
    fs::read(path).map_err(|e| VMError::IoError {
        path: path.display().to_string(),
        source: e.to_string(),
    })
}
