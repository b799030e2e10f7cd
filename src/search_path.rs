//! Ordered search path consulted when locating unit files.
//!
//! Directories are validated when added, never at load time: a bad entry
//! fails immediately and leaves the list untouched.

use crate::app_root::AppRoot;
use crate::error::{Error, Result};
use serde::Serialize;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default extension of unit files.
pub const DEFAULT_EXTENSION: &str = "json";

/// Path-list environment variable whose entries are appended at startup.
pub const INCLUDE_ENV: &str = "BOOTPATH_INCLUDE";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddMode {
    /// Discard every previous entry.
    Replace,
    /// Insert ahead of existing entries.
    Prepend,
    /// Insert after existing entries.
    Append,
}

#[derive(Clone, Debug)]
pub struct SearchPath {
    root: AppRoot,
    extension: String,
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(root: AppRoot) -> Self {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    pub fn with_extension(root: AppRoot, extension: &str) -> Self {
        Self {
            root,
            extension: extension.trim_start_matches('.').to_string(),
            dirs: Vec::new(),
        }
    }

    pub fn root(&self) -> &AppRoot {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Add `dir` (relative to the app root, `.`, or absolute) in `mode`.
    pub fn add(&mut self, dir: &str, mode: AddMode) -> Result<()> {
        let resolved = self.root.resolve(dir);
        if !resolved.is_dir() {
            return Err(Error::config(format!(
                "given path is not a dir: {}",
                resolved.display()
            )));
        }
        debug!(dir = %resolved.display(), ?mode, "search path updated");
        match mode {
            AddMode::Replace => {
                self.dirs.clear();
                self.dirs.push(resolved);
            }
            AddMode::Prepend => self.dirs.insert(0, resolved),
            AddMode::Append => self.dirs.push(resolved),
        }
        Ok(())
    }

    /// Append a library directory.
    pub fn add_lib_dir(&mut self, dir: &str) -> Result<()> {
        self.add(dir, AddMode::Append)
    }

    /// Append every entry of a platform path list (`a:b:c` on unix).
    ///
    /// Returns how many entries were added.
    pub fn append_path_list(&mut self, value: &OsStr) -> Result<usize> {
        let mut added = 0;
        for entry in env::split_paths(value) {
            if entry.as_os_str().is_empty() {
                continue;
            }
            let entry = entry.to_str().ok_or_else(|| {
                Error::config(format!(
                    "search path entry is not valid UTF-8: {}",
                    entry.display()
                ))
            })?;
            self.add(entry, AddMode::Append)?;
            added += 1;
        }
        Ok(added)
    }

    /// Join entries with the platform path-list separator.
    pub fn to_path_list(&self) -> Result<OsString> {
        env::join_paths(&self.dirs)
            .map_err(|err| Error::config(format!("cannot join search path: {err}")))
    }

    /// File name a fragment maps to once the extension is applied.
    pub fn file_for(&self, fragment: &Path) -> PathBuf {
        let mut file = fragment.as_os_str().to_os_string();
        if !self.extension.is_empty() {
            file.push(".");
            file.push(&self.extension);
        }
        PathBuf::from(file)
    }

    /// First existing file for `fragment`, in search order.
    pub fn locate(&self, fragment: &Path) -> Option<PathBuf> {
        let file = self.file_for(fragment);
        self.dirs
            .iter()
            .map(|dir| dir.join(&file))
            .find(|candidate| candidate.is_file())
    }
}
