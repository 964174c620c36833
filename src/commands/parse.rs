//! Command Parsing
//!
//! Turns a raw input line into a [`Command`]. The line is split by a
//! shell-style tokenizer that honors double-quoted arguments, the first
//! token (uppercased) selects the verb, and the remaining tokens are its
//! arguments. TTL arguments are whole seconds.

use chrono::Duration;

use crate::commands::Command;
use crate::error::{CacheError, Result};

// == Argument Counts ==
const GET_NUM_ARGS: usize = 1;
const SET_NUM_ARGS: usize = 2;
const SET_WITH_TTL_NUM_ARGS: usize = 3;
const UNSET_NUM_ARGS: usize = 1;
const GET_TTL_NUM_ARGS: usize = 1;
const SET_TTL_NUM_ARGS: usize = 2;
const UNSET_TTL_NUM_ARGS: usize = 1;
const UNSET_ALL_NUM_ARGS: usize = 0;

/// Parses one command line.
///
/// Example: `GET "Key"` yields a command that retrieves the key `Key`.
pub fn parse(input: &str) -> Result<Command> {
    let tokens = shell_words::split(input)?;
    let Some((verb, args)) = tokens.split_first() else {
        return Err(CacheError::CmdNotFound(input.to_string()));
    };

    let verb = verb.to_uppercase();
    match verb.as_str() {
        "GET" => {
            check_num_args(&verb, args, GET_NUM_ARGS)?;
            Ok(Command::get(&args[0]))
        }
        "SET" => parse_set(&verb, args),
        "UNSET" => {
            check_num_args(&verb, args, UNSET_NUM_ARGS)?;
            Ok(Command::unset(&args[0]))
        }
        "GETTTL" => {
            check_num_args(&verb, args, GET_TTL_NUM_ARGS)?;
            Ok(Command::get_ttl(&args[0]))
        }
        "SETTTL" => parse_set_ttl(&verb, args),
        "UNSETTTL" => {
            check_num_args(&verb, args, UNSET_TTL_NUM_ARGS)?;
            Ok(Command::unset_ttl(&args[0]))
        }
        "UNSETALL" => {
            check_num_args(&verb, args, UNSET_ALL_NUM_ARGS)?;
            Ok(Command::unset_all())
        }
        _ => Err(CacheError::CmdNotFound(verb)),
    }
}

fn check_num_args(cmd: &str, args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(CacheError::InvalidArgs {
            cmd: cmd.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn parse_set(cmd: &str, args: &[String]) -> Result<Command> {
    if args.len() != SET_NUM_ARGS && args.len() != SET_WITH_TTL_NUM_ARGS {
        return Err(CacheError::InvalidArgs {
            cmd: cmd.to_string(),
            expected: SET_NUM_ARGS,
            actual: args.len(),
        });
    }

    let ttl = match args.get(2) {
        Some(raw) => Duration::seconds(parse_seconds(cmd, raw)?),
        None => Duration::zero(),
    };

    Ok(Command::set(&args[0], &args[1], ttl))
}

fn parse_set_ttl(cmd: &str, args: &[String]) -> Result<Command> {
    check_num_args(cmd, args, SET_TTL_NUM_ARGS)?;
    let secs = parse_seconds(cmd, &args[1])?;
    Ok(Command::set_ttl(&args[0], Duration::seconds(secs)))
}

fn parse_seconds(cmd: &str, raw: &str) -> Result<i64> {
    raw.parse().map_err(|cause| CacheError::InvalidArg {
        cmd: cmd.to_string(),
        arg: "TTL",
        value: raw.to_string(),
        cause,
    })
}
