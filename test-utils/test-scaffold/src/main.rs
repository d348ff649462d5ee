//! test-scaffold: interactive scaffolding CLI used in end-to-end tests.
//!
//! Behaves like a project generator driven by a prompt library: every
//! question is printed without a trailing newline and redrawn with escape
//! sequences once answered. Generated files are written below the current
//! directory.
//!
//! Usage: test-scaffold [command] [name] [--skip-next-steps]
//!
//! Commands:
//!   app [name]    - Create a project (default command)
//!   model [name]  - Add a model under common/models
//!   property      - Add a property to an existing model
//!   remote-method - Add a remote method to an existing model
//!   relation      - Add a relation between two models
//!   acl           - Add an access control entry to the models
//!   middleware    - Add an entry to server/middleware.json
//!   datasource    - Add an entry to server/datasources.json
//!   boot-script   - Add a script under server/boot
//!   crash         - Ask one question and abort
//!   mystery       - Ask a question no rule recognizes
//!   --version, -v - Print the version
//!   --commands, -l - List the commands

mod generators;
mod prompt;

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use generators::{Generator, Options};
use prompt::Prompter;

const COMMANDS: &[&str] = &[
    "app",
    "model",
    "property",
    "remote-method",
    "relation",
    "acl",
    "middleware",
    "datasource",
    "boot-script",
    "crash",
    "mystery",
];

#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input closed before the question was answered")]
    InputClosed,

    #[error("{0}")]
    Usage(String),
}

fn main() -> ExitCode {
    let mut command = None;
    let mut options = Options::default();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("test-scaffold {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            "--commands" | "-l" => {
                println!("Available commands:");
                for name in COMMANDS {
                    println!("  lb {name}");
                }
                return ExitCode::SUCCESS;
            }
            "--skip-next-steps" => options.skip_next_steps = true,
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {other}");
                return ExitCode::from(2);
            }
            _ if command.is_none() => command = Some(arg),
            _ if options.name.is_none() => options.name = Some(arg),
            _ => {
                eprintln!("Unexpected argument: {arg}");
                return ExitCode::from(2);
            }
        }
    }

    let output = match stdout_writer() {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let prompter = Prompter::new(io::stdin().lock(), output);
    let mut generator = Generator::new(prompter, ".");

    let result = match command.as_deref().unwrap_or("app") {
        "app" => generator.app(&options),
        "model" => generator.model(&options),
        "property" => generator.property(),
        "remote-method" => generator.remote_method(),
        "relation" => generator.relation(),
        "acl" => generator.acl(),
        "middleware" => generator.middleware(),
        "datasource" => generator.datasource(),
        "boot-script" => generator.boot_script(),
        "crash" => generator.crash(),
        "mystery" => generator.mystery(),
        other => Err(ScaffoldError::Usage(format!("Unknown command: {other}"))),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Stdout without line buffering, so each question reaches the pipe in one
/// write.
#[cfg(unix)]
fn stdout_writer() -> io::Result<Box<dyn Write>> {
    use std::os::fd::AsFd;

    let fd = io::stdout().as_fd().try_clone_to_owned()?;
    Ok(Box::new(BufWriter::new(std::fs::File::from(fd))))
}

#[cfg(not(unix))]
fn stdout_writer() -> io::Result<Box<dyn Write>> {
    Ok(Box::new(BufWriter::new(io::stdout())))
}
