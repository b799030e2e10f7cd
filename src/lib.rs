//! Application bootstrap and identifier-to-file resolution.
//!
//! An application is started by building a [`Bootstrap`]: it validates the
//! application root, configures the ordered [`SearchPath`], and owns the
//! [`ResolutionChain`] of naming-convention translators. Resolving an
//! identifier walks the chain in registration order, loads the first
//! candidate unit that exists, and, when the chain is sealed with the
//! diagnostic stage, reports a [`Error::ResolutionFailed`] naming the
//! identifier once every translator came up empty.
//!
//! ```text
//! identifier -> Translator -> fragment -> SearchPath -> unit file -> UnitRegistry
//! ```

pub mod app_root;
pub mod bootstrap;
pub mod chain;
pub mod config;
pub mod error;
pub mod identity;
pub mod loader;
pub mod registry;
pub mod search_path;
pub mod translator;
pub mod unit;

pub use app_root::{AppRoot, CONFIG_FILE, ROOT_ENV, find_app_root, find_app_root_from};
pub use bootstrap::Bootstrap;
pub use chain::{
    AttemptOutcome, LoadAttempt, Resolution, ResolutionChain, ResolutionReport, SharedChain,
    diagnose,
};
pub use config::BootstrapConfig;
pub use error::{Error, Result};
pub use identity::Identifier;
pub use loader::{FileLoader, LoadOutcome, UnitLoader};
pub use registry::UnitRegistry;
pub use search_path::{AddMode, INCLUDE_ENV, SearchPath};
pub use translator::{Translator, TranslatorKind};
pub use unit::{UnitFile, UnitSchema};
