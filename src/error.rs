//! Error taxonomy shared by the resolution chain and its collaborators.
//!
//! "File absent" is never an error here; it is `LoadOutcome::NotFound` and
//! drives chain continuation. Everything below surfaces to the caller.

use crate::identity::Identifier;
use crate::translator::Translator;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid startup configuration: bad directories, unknown translators,
    /// a double diagnostic install, or an empty chain.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A translator was registered after the diagnostic stage sealed the chain.
    #[error(
        "diagnostic stage already installed; cannot register '{translator}'. Register every translator before sealing the chain"
    )]
    ChainSealed { translator: Translator },

    /// A candidate unit exists but could not be loaded.
    #[error("failed to load unit {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// Raised by the diagnostic stage once every translator reported not-found.
    #[error(
        "autoloading failed for '{identifier}': no definition file was found (tried: {})",
        format_candidates(candidates)
    )]
    ResolutionFailed {
        identifier: Identifier,
        candidates: Vec<PathBuf>,
    },

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable snake_case name for machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::ChainSealed { .. } => "chain_sealed",
            Error::Load { .. } => "load",
            Error::ResolutionFailed { .. } => "resolution_failed",
            Error::InvalidIdentifier(_) => "invalid_identifier",
            Error::Io(_) => "io",
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub(crate) fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Load {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        return "nothing".to_string();
    }
    candidates
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
