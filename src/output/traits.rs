//! Sink trait and error types
//!
//! A sink receives every finished ranking of a pull and makes it durable or
//! visible. Rankings are staged one at a time and the pull is committed once
//! after every term has been handled.

use crate::ranking::{Pull, Ranking};
use crate::storage::StorageError;
use crate::ExitStatus;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while handing rankings to a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cannot prepare output location {path}: {source}")]
    Unreachable {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

impl SinkError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Storage(e) => e.exit_status(),
            Self::Unreachable { .. } => ExitStatus::SinkUnreachable,
            Self::Write { .. } => ExitStatus::SinkRejected,
        }
    }
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// The configured destination for rankings (`query-type` in config)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// SQLite database, committed once per pull
    Database,

    /// Standard output
    #[default]
    Console,

    /// One `.out` file per search term
    File,
}

impl SinkKind {
    /// Transactional sinks abort the whole pull on a write failure; the
    /// others log the failure and carry on with the next term
    pub fn is_transactional(&self) -> bool {
        matches!(self, Self::Database)
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Database => "database",
            Self::Console => "console",
            Self::File => "file",
        };
        f.write_str(name)
    }
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" => Ok(Self::Database),
            "console" => Ok(Self::Console),
            "file" => Ok(Self::File),
            other => Err(format!(
                "query-type must be one of database, console, file; got '{}'",
                other
            )),
        }
    }
}

/// Destination for the rankings of a pull
pub trait Sink {
    /// Which kind of sink this is
    fn kind(&self) -> SinkKind;

    /// Highest pull id this sink has already recorded
    ///
    /// Sinks without history return `None`, which starts numbering at 1.
    fn max_pull_id(&self) -> SinkResult<Option<i64>> {
        Ok(None)
    }

    /// Hands one term's finished ranking to the sink
    fn stage_ranking(&mut self, pull: &Pull, ranking: &Ranking) -> SinkResult<()>;

    /// Makes everything staged for `pull` durable as a single unit
    fn commit(&mut self, _pull: &Pull) -> SinkResult<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn kind(&self) -> SinkKind {
        (**self).kind()
    }

    fn max_pull_id(&self) -> SinkResult<Option<i64>> {
        (**self).max_pull_id()
    }

    fn stage_ranking(&mut self, pull: &Pull, ranking: &Ranking) -> SinkResult<()> {
        (**self).stage_ranking(pull, ranking)
    }

    fn commit(&mut self, pull: &Pull) -> SinkResult<()> {
        (**self).commit(pull)
    }
}
