//! Definitions made available by loaded units.
//!
//! Units are keyed by canonical path so loading the same file twice is a
//! no-op. An identifier may only be defined by one unit.

use crate::error::{Error, Result};
use crate::identity::Identifier;
use crate::unit::UnitFile;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: BTreeMap<PathBuf, UnitFile>,
    definitions: BTreeMap<Identifier, PathBuf>,
}

impl UnitRegistry {
    pub fn contains_unit(&self, path: &Path) -> bool {
        self.units.contains_key(path)
    }

    /// Path of the unit that defines `identifier`, if any.
    pub fn defined_in(&self, identifier: &Identifier) -> Option<&Path> {
        self.definitions.get(identifier).map(PathBuf::as_path)
    }

    pub fn unit(&self, path: &Path) -> Option<&UnitFile> {
        self.units.get(path)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.definitions.keys()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Record `unit` as loaded from `path`.
    ///
    /// Re-registering a known path is accepted and changes nothing. A unit
    /// that redefines an identifier owned by another unit is rejected as a
    /// whole.
    pub fn register(&mut self, path: PathBuf, unit: UnitFile) -> Result<()> {
        if self.units.contains_key(&path) {
            return Ok(());
        }
        for id in &unit.defines {
            if let Some(owner) = self.definitions.get(id) {
                return Err(Error::load(
                    &path,
                    format!("'{id}' is already defined by {}", owner.display()),
                ));
            }
        }
        for id in &unit.defines {
            self.definitions.insert(id.clone(), path.clone());
        }
        self.units.insert(path, unit);
        Ok(())
    }
}
