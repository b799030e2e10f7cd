//! Naming-convention translators.
//!
//! A translator maps an identifier onto a relative path fragment by
//! substituting its structural delimiter with the platform path separator.
//! No filesystem access happens here; the fragment carries no extension.

use crate::error::{Error, Result};
use crate::identity::Identifier;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{MAIN_SEPARATOR_STR, PathBuf};

/// Separator used by hierarchical identifiers unless configured otherwise.
pub const DEFAULT_NAMESPACE_SEPARATOR: char = '.';

const NAMESPACE_NAMES: [&str; 2] = ["namespace", "hierarchical"];
const ZENDSTYLE_NAMES: [&str; 2] = ["zendstyle", "flat"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Translator {
    /// Namespace-style names: `demo.AppDemo` -> `demo/AppDemo`.
    Hierarchical { separator: char },
    /// Zend-style names: `Zend_Db_Table` -> `Zend/Db/Table`.
    Flat,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslatorKind {
    Hierarchical,
    Flat,
}

impl Translator {
    pub fn hierarchical() -> Self {
        Translator::Hierarchical {
            separator: DEFAULT_NAMESPACE_SEPARATOR,
        }
    }

    pub fn hierarchical_with(separator: char) -> Self {
        Translator::Hierarchical { separator }
    }

    pub fn flat() -> Self {
        Translator::Flat
    }

    /// Parse a configuration name. Hierarchical translators take `separator`.
    pub fn from_name(name: &str, separator: char) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        if NAMESPACE_NAMES.contains(&normalized.as_str()) {
            return Ok(Translator::hierarchical_with(separator));
        }
        if ZENDSTYLE_NAMES.contains(&normalized.as_str()) {
            return Ok(Translator::Flat);
        }
        Err(Error::config(format!(
            "unknown translator '{name}'; available translators are 'namespace' or 'zendstyle'"
        )))
    }

    pub fn kind(&self) -> TranslatorKind {
        match self {
            Translator::Hierarchical { .. } => TranslatorKind::Hierarchical,
            Translator::Flat => TranslatorKind::Flat,
        }
    }

    /// Stable configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Translator::Hierarchical { .. } => NAMESPACE_NAMES[0],
            Translator::Flat => ZENDSTYLE_NAMES[0],
        }
    }

    pub fn translate(&self, identifier: &Identifier) -> PathBuf {
        let raw = identifier.as_str();
        let fragment = match self {
            Translator::Hierarchical { separator } => raw.replace(*separator, MAIN_SEPARATOR_STR),
            Translator::Flat => raw.replace('_', MAIN_SEPARATOR_STR),
        };
        PathBuf::from(fragment)
    }
}

impl fmt::Display for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Translator {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}
