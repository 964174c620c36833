//! Command Module
//!
//! Textual commands over the cache. A parsed [`Command`] executes against
//! the facade and renders back to its canonical text form.

mod parse;

pub use parse::parse;

use std::fmt;

use chrono::Duration;

use crate::cache::{Cache, Outcome, Table};
use crate::error::Result;

// == Command ==
/// A parsed client request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `GET "<key>"`
    Get { key: String },
    /// `SET "<key>" "<value>" [<seconds>]` — a non-positive TTL means the
    /// entry never expires
    Set {
        key: String,
        value: String,
        ttl: Duration,
    },
    /// `UNSET "<key>"`
    Unset { key: String },
    /// `GETTTL "<key>"`
    GetTtl { key: String },
    /// `SETTTL "<key>" <seconds>`
    SetTtl { key: String, ttl: Duration },
    /// `UNSETTTL "<key>"`
    UnsetTtl { key: String },
    /// `UNSETALL`
    UnsetAll,
}

impl Command {
    /// A command that retrieves a key.
    pub fn get(key: impl Into<String>) -> Self {
        Command::Get { key: key.into() }
    }

    /// A command that sets a key to a value, with a TTL when `ttl` is
    /// positive.
    pub fn set(key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Self {
        Command::Set {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }

    /// A command that unsets a key.
    pub fn unset(key: impl Into<String>) -> Self {
        Command::Unset { key: key.into() }
    }

    /// A command that retrieves the TTL for a key.
    pub fn get_ttl(key: impl Into<String>) -> Self {
        Command::GetTtl { key: key.into() }
    }

    /// A command that sets the TTL for a key.
    pub fn set_ttl(key: impl Into<String>, ttl: Duration) -> Self {
        Command::SetTtl {
            key: key.into(),
            ttl,
        }
    }

    /// A command that drops the TTL for a key.
    pub fn unset_ttl(key: impl Into<String>) -> Self {
        Command::UnsetTtl { key: key.into() }
    }

    /// A command that wipes every key.
    pub fn unset_all() -> Self {
        Command::UnsetAll
    }

    /// Runs the command against the cache.
    pub async fn execute<T: Table>(&self, cache: &Cache<T>) -> Result<Outcome> {
        match self {
            Command::Get { key } => cache.get(key).await,
            Command::Set { key, value, ttl } => cache.set(key, value, *ttl).await,
            Command::Unset { key } => cache.unset(key).await,
            Command::GetTtl { key } => cache.get_ttl(key).await,
            Command::SetTtl { key, ttl } => cache.set_ttl(key, *ttl).await,
            Command::UnsetTtl { key } => cache.unset_ttl(key).await,
            Command::UnsetAll => cache.unset_all().await,
        }
    }
}

impl fmt::Display for Command {
    /// Canonical text form, matching what [`parse`] accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get { key } => write!(f, "GET \"{}\"", key),
            Command::Set { key, value, ttl } => {
                if *ttl > Duration::zero() {
                    write!(f, "SET \"{}\" \"{}\" {}", key, value, ttl.num_seconds())
                } else {
                    write!(f, "SET \"{}\" \"{}\"", key, value)
                }
            }
            Command::Unset { key } => write!(f, "UNSET \"{}\"", key),
            Command::GetTtl { key } => write!(f, "GETTTL \"{}\"", key),
            Command::SetTtl { key, ttl } => {
                write!(f, "SETTTL \"{}\" {}", key, ttl.num_seconds())
            }
            Command::UnsetTtl { key } => write!(f, "UNSETTTL \"{}\"", key),
            Command::UnsetAll => write!(f, "UNSETALL"),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Action;
    use crate::error::CacheError;

    #[test]
    fn test_canonical_text_forms() {
        assert_eq!(Command::get("Key").to_string(), "GET \"Key\"");
        assert_eq!(
            Command::set("k", "v", Duration::seconds(5)).to_string(),
            "SET \"k\" \"v\" 5"
        );
        assert_eq!(
            Command::set("k", "v", Duration::zero()).to_string(),
            "SET \"k\" \"v\""
        );
        assert_eq!(Command::unset("k").to_string(), "UNSET \"k\"");
        assert_eq!(Command::get_ttl("k").to_string(), "GETTTL \"k\"");
        assert_eq!(
            Command::set_ttl("k", Duration::seconds(30)).to_string(),
            "SETTTL \"k\" 30"
        );
        assert_eq!(Command::unset_ttl("k").to_string(), "UNSETTTL \"k\"");
        assert_eq!(Command::unset_all().to_string(), "UNSETALL");
    }

    #[test]
    fn test_canonical_form_reparses() {
        let commands = [
            Command::get("some key"),
            Command::set("k", "a value", Duration::seconds(12)),
            Command::unset("k"),
            Command::set_ttl("k", Duration::seconds(3)),
            Command::unset_all(),
        ];
        for command in commands {
            assert_eq!(parse(&command.to_string()).unwrap(), command);
        }
    }

    #[tokio::test]
    async fn test_execute_set_and_get() {
        let cache = Cache::new();

        let set = Command::set("k", "v", Duration::zero());
        assert_eq!(set.execute(&cache).await.unwrap().action(), Action::Created);

        let get = Command::get("k");
        let outcome = get.execute(&cache).await.unwrap();
        assert_eq!(outcome.entry().unwrap().value, "v");
    }

    #[tokio::test]
    async fn test_execute_ttl_commands() {
        let cache = Cache::new();
        Command::set("k", "v", Duration::seconds(60))
            .execute(&cache)
            .await
            .unwrap();

        let ttl = Command::get_ttl("k")
            .execute(&cache)
            .await
            .unwrap()
            .ttl()
            .unwrap();
        assert!(ttl > Duration::seconds(59));

        Command::unset_ttl("k").execute(&cache).await.unwrap();
        assert!(matches!(
            Command::get_ttl("k").execute(&cache).await,
            Err(CacheError::TtlNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_unset_and_unset_all() {
        let cache = Cache::new();
        Command::set("a", "1", Duration::zero())
            .execute(&cache)
            .await
            .unwrap();
        Command::set("b", "2", Duration::zero())
            .execute(&cache)
            .await
            .unwrap();

        let unset = Command::unset("a").execute(&cache).await.unwrap();
        assert_eq!(unset.action(), Action::Deleted);

        let cleared = Command::unset_all().execute(&cache).await.unwrap();
        assert_eq!(cleared.action(), Action::Cleared);
        assert!(Command::get("b").execute(&cache).await.is_err());
    }
}
