//! Error types for the cache
//!
//! Provides the unified error taxonomy using thiserror. Failures are
//! values carried on operation results, never panics.

use chrono::Duration;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations and command parsing.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The referenced key is not present in the table
    #[error("Could not find key: {0}")]
    KeyNotFound(String),

    /// The key has no registered TTL (the key itself may still exist)
    #[error("Couldn't find a ttl for key {0}")]
    TtlNotFound(String),

    /// A non-positive duration was handed to the TTL registry
    #[error("Couldn't use {0} as a ttl")]
    InvalidTtl(Duration),

    /// Unrecognized command verb
    #[error("Couldn't find command {0}")]
    CmdNotFound(String),

    /// A command received the wrong number of arguments
    #[error("Invalid arguments for {cmd} command. Expected {expected} args but got {actual} args")]
    InvalidArgs {
        cmd: String,
        expected: usize,
        actual: usize,
    },

    /// A command argument could not be parsed
    #[error("Invalid argument for {cmd} command. Couldn't parse {value:?} as the {arg} argument")]
    InvalidArg {
        cmd: String,
        arg: &'static str,
        value: String,
        #[source]
        cause: std::num::ParseIntError,
    },

    /// The tokenizer rejected the raw input line
    #[error("Couldn't split command input: {0}")]
    Tokenize(#[from] shell_words::ParseError),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
