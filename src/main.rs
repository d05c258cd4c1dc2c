// ABOUTME: CLI entry point: run a script file or start the interactive REPL

use clap::Parser;
use moonlet::config::{HELP_TEXT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use moonlet::{ExecError, Interpreter, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;

/// Sandboxed Lua-flavored script interpreter
#[derive(Parser, Debug)]
#[command(name = "moonlet")]
#[command(version = VERSION)]
#[command(about = "A sandboxed Lua-flavored scripting interpreter")]
#[command(long_about = "Runs untrusted scripts with captured output and no ambient I/O")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Treat the input file as prose and run each fenced code block
    #[arg(long = "extract-blocks")]
    extract_blocks: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let mut interpreter = Interpreter::default();

    match args.script {
        Some(path) => run_script(&mut interpreter, &path, args.extract_blocks),
        None => run_repl(&mut interpreter),
    }
}

fn run_script(interpreter: &mut Interpreter, path: &PathBuf, extract_blocks: bool) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let sources = if extract_blocks {
        Interpreter::find_code_blocks(&source)
    } else {
        vec![source]
    };

    for source in sources {
        if let Err(err) = interpreter.execute(&source) {
            print!("{}", interpreter.logs());
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    }
    print!("{}", interpreter.logs());
    ExitCode::SUCCESS
}

fn run_repl(interpreter: &mut Interpreter) -> ExitCode {
    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);
    println!("Type 'help' for help, Ctrl-D to exit.\n");

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("error: cannot start line editor: {}", err);
            return ExitCode::FAILURE;
        }
    };

    loop {
        match editor.readline("moonlet> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" {
                    break;
                }
                if trimmed == "help" {
                    println!("{}", HELP_TEXT);
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                evaluate_line(interpreter, &line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }
    println!("Goodbye!");
    ExitCode::SUCCESS
}

fn evaluate_line(interpreter: &mut Interpreter, line: &str) {
    match interpreter.execute(line) {
        Ok(value) => {
            print!("{}", interpreter.logs());
            interpreter.clear_logs();
            if !matches!(value, Value::Nil) {
                println!("=> {}", value);
            }
        }
        Err(ExecError::Syntax(err)) => {
            interpreter.clear_logs();
            eprintln!("syntax error: {}", err);
        }
        Err(ExecError::Runtime(err)) => {
            print!("{}", interpreter.logs());
            interpreter.clear_logs();
            eprintln!("runtime error: {}", err);
        }
    }
}
