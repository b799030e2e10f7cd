//! Bootstrap settings read from `bootpath.json`.

use crate::error::{Error, Result};
use crate::search_path::DEFAULT_EXTENSION;
use crate::translator::DEFAULT_NAMESPACE_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BootstrapConfig {
    /// Top directory of the application's units, relative to the root.
    pub source_dir: String,
    /// Replace the search path with `source_dir` instead of prepending it.
    pub replace_search_path: bool,
    /// Library directories appended after the source directory.
    pub lib_dirs: Vec<String>,
    /// Translator names in priority order.
    pub translators: Vec<String>,
    /// Seal the chain with the diagnostic stage.
    pub diagnostic: bool,
    pub extension: String,
    pub namespace_separator: char,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            replace_search_path: true,
            lib_dirs: Vec::new(),
            translators: vec!["namespace".to_string(), "zendstyle".to_string()],
            diagnostic: true,
            extension: DEFAULT_EXTENSION.to_string(),
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR,
        }
    }
}

impl BootstrapConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|err| {
            Error::config(format!("reading config {}: {err}", path.display()))
        })?;
        Self::parse(&data)
            .map_err(|err| Error::config(format!("parsing config {}: {err}", path.display())))
    }

    pub fn parse(data: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
