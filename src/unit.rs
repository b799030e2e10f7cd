//! Unit files: the JSON documents a loader turns into definitions.
//!
//! Every unit is checked against the bundled `schema/unit_v1.json` before it
//! is deserialized, so malformed content is reported with the schema's
//! complaints instead of a generic serde error.

use crate::error::{Error, Result};
use crate::identity::Identifier;
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

const UNIT_SCHEMA: &str = include_str!("../schema/unit_v1.json");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitFile {
    pub defines: Vec<Identifier>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body: Value,
}

/// Compiled unit schema.
pub struct UnitSchema {
    compiled: JSONSchema,
}

impl fmt::Debug for UnitSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitSchema").finish_non_exhaustive()
    }
}

impl UnitSchema {
    pub fn bundled() -> Result<Self> {
        let raw: Value = serde_json::from_str(UNIT_SCHEMA)
            .map_err(|err| Error::config(format!("parsing bundled unit schema: {err}")))?;
        let compiled = JSONSchema::compile(&raw)
            .map_err(|err| Error::config(format!("compiling bundled unit schema: {err}")))?;
        Ok(Self { compiled })
    }

    /// Parse and validate the contents of the unit at `path`.
    pub fn parse(&self, path: &Path, contents: &str) -> Result<UnitFile> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|err| Error::load(path, format!("invalid JSON: {err}")))?;

        if let Err(errors) = self.compiled.validate(&value) {
            let details = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::load(path, format!("schema violation: {details}")));
        }

        serde_json::from_value(value).map_err(|err| Error::load(path, err.to_string()))
    }
}
