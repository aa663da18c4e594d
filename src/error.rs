//src/error.rs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures. Per-line problems in the inputs are not errors; they are
/// logged and skipped where they occur.
#[derive(Debug, Error)]
pub enum TaxCountError {
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no usable rows in {table} table {origin}")]
    EmptyTable { table: &'static str, origin: String },

    #[error("invalid rank filter: {0}")]
    InvalidRankFilter(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Option combinations rejected before any file is opened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--ranks and --full-path cannot be used together")]
    RanksWithFullPath,

    #[error("{0} requires the nodes.dmp file (-t)")]
    MissingNodes(&'static str),

    #[error("{0} requires the names.dmp file (-n)")]
    MissingNames(&'static str),
}
