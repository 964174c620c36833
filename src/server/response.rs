//! Wire Responses
//!
//! Defines the JSON body written back for each command line.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{Action, Outcome};
use crate::error::Result;

// == Command Response ==
/// One response line. `error` is present exactly when `action` is
/// `"failed"`; the entry fields are present when the action produced a
/// snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    /// What the command did
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    /// Builds the wire form of an execution result.
    pub fn from_result(result: &Result<Outcome>) -> Self {
        match result {
            Ok(outcome) => {
                let entry = outcome.entry();
                Self {
                    action: outcome.action().as_str(),
                    key: entry.map(|e| e.key.clone()),
                    value: entry.map(|e| e.value.clone()),
                    created_at: entry.map(|e| e.created_at),
                    ttl_seconds: outcome.ttl().map(|ttl| ttl.num_seconds()),
                    error: None,
                }
            }
            Err(err) => Self {
                action: Action::Failed.as_str(),
                key: None,
                value: None,
                created_at: None,
                ttl_seconds: None,
                error: Some(err.to_string()),
            },
        }
    }
}
