//! Loading candidate fragments into the unit registry.
//!
//! A missing file is the expected outcome when a translator does not match
//! the naming convention of an identifier, so it is reported as
//! `LoadOutcome::NotFound` and never logged above `trace`. Anything that
//! goes wrong once a file exists is an `Error::Load` and stops the chain.

use crate::error::{Error, Result};
use crate::identity::Identifier;
use crate::registry::UnitRegistry;
use crate::search_path::SearchPath;
use crate::unit::UnitSchema;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { path: PathBuf },
    NotFound,
}

/// Seam between the resolution chain and whatever makes definitions available.
pub trait UnitLoader {
    /// Attempt to load the unit behind `fragment`.
    fn load(&self, fragment: &Path) -> Result<LoadOutcome>;

    /// Where `identifier` was defined, when a previous load already did so.
    fn defined_in(&self, identifier: &Identifier) -> Option<PathBuf>;
}

/// Filesystem loader backed by a `SearchPath`.
#[derive(Debug)]
pub struct FileLoader {
    search_path: SearchPath,
    schema: UnitSchema,
    registry: Mutex<UnitRegistry>,
}

impl FileLoader {
    pub fn new(search_path: SearchPath) -> Result<Self> {
        Ok(Self {
            search_path,
            schema: UnitSchema::bundled()?,
            registry: Mutex::new(UnitRegistry::default()),
        })
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn search_path_mut(&mut self) -> &mut SearchPath {
        &mut self.search_path
    }

    /// Lock the registry for inspection.
    pub fn registry(&self) -> MutexGuard<'_, UnitRegistry> {
        // Registration either completes or leaves the registry untouched, so
        // a poisoned lock still guards consistent state.
        self.registry.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn read_unit(&self, path: &Path) -> Result<LoadOutcome> {
        let canonical = fs::canonicalize(path).map_err(|err| Error::load(path, err.to_string()))?;
        if self.registry().contains_unit(&canonical) {
            trace!(path = %canonical.display(), "unit already loaded");
            return Ok(LoadOutcome::Loaded { path: canonical });
        }

        let contents = match fs::read_to_string(&canonical) {
            Ok(contents) => contents,
            // Removed between locate and read.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::NotFound),
            Err(err) => return Err(Error::load(&canonical, err.to_string())),
        };
        let unit = self.schema.parse(&canonical, &contents)?;
        let defines = unit.defines.len();
        self.registry().register(canonical.clone(), unit)?;
        debug!(path = %canonical.display(), defines, "unit loaded");
        Ok(LoadOutcome::Loaded { path: canonical })
    }
}

impl UnitLoader for FileLoader {
    fn load(&self, fragment: &Path) -> Result<LoadOutcome> {
        if !stays_inside(fragment) {
            trace!(fragment = %fragment.display(), "fragment escapes the search path");
            return Ok(LoadOutcome::NotFound);
        }
        let Some(path) = self.search_path.locate(fragment) else {
            trace!(fragment = %fragment.display(), "no candidate file");
            return Ok(LoadOutcome::NotFound);
        };
        self.read_unit(&path).inspect_err(|err| {
            warn!(path = %path.display(), error = %err, "unit failed to load");
        })
    }

    fn defined_in(&self, identifier: &Identifier) -> Option<PathBuf> {
        self.registry()
            .defined_in(identifier)
            .map(Path::to_path_buf)
    }
}

/// Fragments must stay relative and free of `..` so joining them onto a
/// search directory cannot leave it.
fn stays_inside(fragment: &Path) -> bool {
    !fragment.as_os_str().is_empty()
        && fragment
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
