//! Account bootstrap and profile synchronization for a wildlink game session.
//!
//! A [Session] drives the ordered bootstrap of a freshly authenticated account
//! (legal screen, avatar, codename, starter, first-time experience) over a
//! [Dispatcher], and keeps a [ProfileMirror] of the server-authoritative
//! player record consistent after every mutating call.

pub mod badges;
pub mod codename;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod inventory;
pub mod listener;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod profile;
pub mod random;
pub mod rewards;
pub mod session;
pub mod settings;

pub use badges::BadgeSync;
pub use codename::CodenameClaim;
pub use config::{Config, ConfigError, ValidatedConfig};
pub use dispatch::{DispatchError, Dispatcher, StandardBatch, StandardResponses};
pub use http::{HttpDispatcher, RetryPolicy};
pub use inventory::Inventories;
pub use listener::{BootstrapListener, Listeners};
pub use profile::{Currency, CurrencyLedger, ProfileMirror, Snapshot, TutorialProgress};
pub use rewards::LevelRewards;
pub use session::{BootstrapReport, Rejection, Session, StepOutcome};
pub use settings::Settings;

use std::fmt;
use thiserror::Error;
use wildlink_types::DecodeError;

/// A server-side action that may have committed before a later step failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommittedAction {
    AvatarSelection,
    StarterEncounter,
    ClaimCodename,
}

impl fmt::Display for CommittedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommittedAction::AvatarSelection => write!(f, "avatar selection"),
            CommittedAction::StarterEncounter => write!(f, "starter encounter"),
            CommittedAction::ClaimCodename => write!(f, "codename claim"),
        }
    }
}

/// Error type for session operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("dispatch failed: {0}")]
    Dispatch(DispatchError),
    #[error("session rejected: {0}")]
    Session(String),
    #[error("remote server error: {0}")]
    RemoteServer(#[from] DecodeError),
    #[error("invalid currency kind: {0}")]
    InvalidCurrencyKind(String),
    #[error("{action} committed but its follow-up failed: {source}")]
    PartialSync {
        action: CommittedAction,
        #[source]
        source: Box<Error>,
    },
    #[error("no codename claimed after {attempts} attempts (last tried {last_attempt:?})")]
    CodenameExhausted {
        attempts: usize,
        last_attempt: String,
    },
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl From<DispatchError> for Error {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Auth(reason) => Error::Session(reason),
            err => Error::Dispatch(err),
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
