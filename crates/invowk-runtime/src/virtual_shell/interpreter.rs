//! Executes lexed statements against a small builtin table, falling
//! back to spawning an external binary found on `PATH` (§4.5).

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command as ProcessCommand;

use invowk_core::InvowkError;

use super::lexer::{lex, Statement};

pub struct ShellState {
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
}

pub struct RunOutcome {
    pub exit_code: i32,
}

/// Runs every lexed statement in `script` sequentially against
/// `state`, mutating it as `cd`/`export` are encountered. Returns the
/// last statement's exit code (or 0 for an empty script).
pub fn run(script: &str, state: &mut ShellState) -> Result<RunOutcome, InvowkError> {
    let mut exit_code = 0;
    for statement in lex(script) {
        exit_code = run_statement(&statement, state)?;
    }
    Ok(RunOutcome { exit_code })
}

fn run_statement(statement: &Statement, state: &mut ShellState) -> Result<i32, InvowkError> {
    let Some(name) = statement.words.first() else {
        return Ok(0);
    };
    let args = &statement.words[1..];

    match name.as_str() {
        "cd" => builtin_cd(args, state),
        "echo" => builtin_echo(args),
        "pwd" => builtin_pwd(state),
        "true" => Ok(0),
        "false" => Ok(1),
        "test" => builtin_test(args),
        "printenv" => builtin_printenv(args, state),
        "export" => builtin_export(args, state),
        ":" => Ok(0),
        _ => run_external(name, args, state),
    }
}

fn builtin_cd(args: &[String], state: &mut ShellState) -> Result<i32, InvowkError> {
    let target = match args.first() {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_absolute() {
                path
            } else {
                state.cwd.join(path)
            }
        }
        None => return Ok(0),
    };
    if target.is_dir() {
        state.cwd = target;
        Ok(0)
    } else {
        eprintln!("cd: no such directory: {}", target.display());
        Ok(1)
    }
}

fn builtin_echo(args: &[String]) -> Result<i32, InvowkError> {
    println!("{}", args.join(" "));
    Ok(0)
}

fn builtin_pwd(state: &ShellState) -> Result<i32, InvowkError> {
    println!("{}", state.cwd.display());
    Ok(0)
}

fn builtin_test(args: &[String]) -> Result<i32, InvowkError> {
    match args {
        [flag, path] if flag == "-e" => Ok(i32::from(!PathBuf::from(path).exists())),
        [flag, path] if flag == "-d" => Ok(i32::from(!PathBuf::from(path).is_dir())),
        [flag, path] if flag == "-f" => Ok(i32::from(!PathBuf::from(path).is_file())),
        [a, op, b] if op == "=" => Ok(i32::from(a != b)),
        [a, op, b] if op == "!=" => Ok(i32::from(a == b)),
        _ => Ok(1),
    }
}

fn builtin_printenv(args: &[String], state: &ShellState) -> Result<i32, InvowkError> {
    match args.first() {
        Some(name) => match state.env.get(name) {
            Some(value) => {
                println!("{value}");
                Ok(0)
            }
            None => Ok(1),
        },
        None => {
            for (k, v) in &state.env {
                println!("{k}={v}");
            }
            Ok(0)
        }
    }
}

fn builtin_export(args: &[String], state: &mut ShellState) -> Result<i32, InvowkError> {
    for assignment in args {
        if let Some((key, value)) = assignment.split_once('=') {
            state.env.insert(key.to_string(), value.to_string());
        }
    }
    Ok(0)
}

fn run_external(name: &str, args: &[String], state: &ShellState) -> Result<i32, InvowkError> {
    if which::which(name).is_err() {
        return Err(InvowkError::ScriptExecutionFailed {
            message: format!("'{name}' is not a recognized builtin and was not found on PATH"),
        });
    }
    let status = ProcessCommand::new(name)
        .args(args)
        .current_dir(&state.cwd)
        .envs(&state.env)
        .status()
        .map_err(|e| InvowkError::ScriptExecutionFailed {
            message: format!("failed to run '{name}': {e}"),
        })?;
    Ok(status.code().unwrap_or(1))
}
