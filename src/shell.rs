//! Interactive MicroList session.
//!
//! Source lines are accumulated until `run`, which compiles everything
//! entered so far and executes it on a fresh VM. The session is generic over
//! its input and output so it can be driven from tests.

use crate::virtual_machine::compiler::compile;
use crate::virtual_machine::vm::VM;
use std::io::{self, BufRead, Write};

const PROMPT: &str = "ML> ";

const BANNER: &str = "\
MicroList Interactive Mode
Enter your code line by line.
Commands: 'run' to execute, 'clear' to reset, 'help' for syntax, 'quit' to exit
Example:
  1 ml
  \"hello\"
  2 ml.
  1[]
  run
";

pub const SYNTAX_HELP: &str = "\
MicroList Syntax:
  NUM ml        - Create storage list
  NUM ml.       - Create output list
  \"text\"        - Add string to current list
  123           - Add number (0-255) to current list
  NUM[]         - Reference another list's content
  // comment    - Comment line
";

/// One line of shell input, classified.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Run,
    Clear,
    Help,
    Source(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line {
            "quit" | "exit" => Command::Quit,
            "run" => Command::Run,
            "clear" => Command::Clear,
            "help" => Command::Help,
            source => Command::Source(source),
        }
    }
}

/// An interactive session reading from `input` and writing to `output`.
pub struct Shell<R, W> {
    input: R,
    output: W,
    source: Vec<String>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            source: Vec::new(),
        }
    }

    /// Lines accumulated since the last `clear`.
    pub fn source_lines(&self) -> &[String] {
        &self.source
    }

    /// Runs the read-eval loop until `quit`, `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        self.output.write_all(BANNER.as_bytes())?;
        writeln!(self.output)?;

        let mut line = String::new();
        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }

            match Command::parse(line.trim()) {
                Command::Quit => break,
                Command::Run => self.run_source()?,
                Command::Clear => {
                    self.source.clear();
                    writeln!(self.output, "Source cleared.")?;
                }
                Command::Help => self.output.write_all(SYNTAX_HELP.as_bytes())?,
                Command::Source(text) => {
                    self.source.push(text.to_string());
                    writeln!(self.output, "    [{} lines entered]", self.source.len())?;
                }
            }
        }

        self.output.flush()
    }

    /// Compiles and executes the accumulated source. The source is kept.
    fn run_source(&mut self) -> io::Result<()> {
        let program = match compile(&self.source.join("\n")) {
            Ok(program) => program,
            Err(err) => return writeln!(self.output, "Compilation error: {err}"),
        };

        let mut vm = VM::new();
        vm.load_program(program);
        if let Err(err) = vm.execute_to(&mut self.output) {
            writeln!(self.output, "Runtime error: {err}")?;
        }
        writeln!(self.output)
    }
}

/// Runs an interactive session on stdin/stdout.
pub fn run_interactive() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(stdin.lock(), stdout.lock()).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> (Vec<String>, String) {
        let mut out = Vec::new();
        let mut shell = Shell::new(input.as_bytes(), &mut out);
        shell.run().unwrap();
        let lines = shell.source_lines().to_vec();
        drop(shell);
        let text = String::from_utf8(out).unwrap();
        // Everything before the first prompt is the banner.
        let body = text
            .split_once(PROMPT)
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default();
        (lines, body)
    }

    #[test]
    fn command_classification() {
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert_eq!(Command::parse("run"), Command::Run);
        assert_eq!(Command::parse("clear"), Command::Clear);
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse("1 ml"), Command::Source("1 ml"));
        assert_eq!(Command::parse("RUN"), Command::Source("RUN"));
    }

    #[test]
    fn lines_are_counted() {
        let (lines, out) = session("1 ml.\n  \"hi\"  \nquit\n");
        assert_eq!(lines, vec!["1 ml.", "\"hi\""]);
        assert!(out.contains("    [1 lines entered]\n"));
        assert!(out.contains("    [2 lines entered]\n"));
    }

    #[test]
    fn run_prints_output_and_blank_line() {
        let (lines, out) = session("1 ml.\n\"hi\"\n33\nrun\n");
        assert!(out.contains("ML> hi!\n\nML> "));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn run_keeps_source_for_next_run() {
        let (_, out) = session("1 ml.\n65\nrun\n66\nrun\n");
        assert!(out.contains("ML> A\n\n"));
        assert!(out.contains("ML> AB\n\n"));
    }

    #[test]
    fn compilation_error_is_reported() {
        let (_, out) = session("1 ml\n999\nrun\n");
        assert!(out.contains("Compilation error: line 2: value 999 out of range (0-255)\nML> "));
    }

    #[test]
    fn runtime_error_is_reported() {
        let (_, out) = session("\"oops\"\nrun\n");
        assert!(out.contains("Runtime error: no current list to add string to\n\n"));
    }

    #[test]
    fn clear_discards_source() {
        let (lines, out) = session("1 ml.\n\"x\"\nclear\nrun\n");
        assert!(lines.is_empty());
        assert!(out.contains("Source cleared.\n"));
        // Empty program: no output, just the separating blank line.
        assert!(out.contains("Source cleared.\nML> \nML> "));
    }

    #[test]
    fn help_does_not_add_source() {
        let (lines, out) = session("help\n");
        assert!(lines.is_empty());
        assert!(out.contains("NUM ml.       - Create output list"));
    }

    #[test]
    fn quit_stops_reading() {
        let (lines, _) = session("1 ml\nexit\n2 ml\n");
        assert_eq!(lines, vec!["1 ml"]);
    }

    #[test]
    fn end_of_input_ends_session() {
        let (lines, out) = session("1 ml");
        assert_eq!(lines, vec!["1 ml"]);
        assert!(out.ends_with("ML> "));
    }
}
