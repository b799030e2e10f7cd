//! Application root derivation and discovery.
//!
//! The root is the base against which every relative search directory is
//! resolved. It is validated once, when constructed, and stored canonical.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File that marks an application root and holds its bootstrap settings.
pub const CONFIG_FILE: &str = "bootpath.json";

/// Environment variable naming an explicit application root.
pub const ROOT_ENV: &str = "BOOTPATH_ROOT";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppRoot {
    path: PathBuf,
}

impl AppRoot {
    /// Validate `dir` as the application root.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::config(format!(
                "given application root is not a dir: {}",
                dir.display()
            )));
        }
        let path = fs::canonicalize(dir)?;
        Ok(Self { path })
    }

    /// Directory containing `file`, for entry points living in the root itself.
    pub fn same_dir(file: impl AsRef<Path>) -> PathBuf {
        dirname(file.as_ref())
    }

    /// Parent of the directory containing `file`, for entry points one level
    /// below the root (e.g., `root/web/index`).
    pub fn parent_dir(file: impl AsRef<Path>) -> PathBuf {
        dirname(&dirname(file.as_ref()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a configured directory against the root.
    ///
    /// `.` is the root itself, absolute paths are taken as given, and
    /// everything else is joined onto the root.
    pub fn resolve(&self, dir: &str) -> PathBuf {
        let trimmed = trim_trailing_separators(dir);
        if trimmed == "." || trimmed.is_empty() {
            return self.path.clone();
        }
        let candidate = Path::new(trimmed);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.path.join(candidate)
        }
    }

    /// Stable hex id derived from the root path.
    pub fn application_id(&self) -> String {
        let digest = Sha256::digest(self.path.to_string_lossy().as_bytes());
        format!("{digest:x}")
    }
}

fn dirname(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}

fn trim_trailing_separators(dir: &str) -> &str {
    let trimmed = dir.trim_end_matches(std::path::is_separator);
    // Keep "/" itself intact.
    if trimmed.is_empty() && !dir.is_empty() {
        &dir[..1]
    } else {
        trimmed
    }
}

fn is_app_root(candidate: &Path) -> bool {
    candidate.join(CONFIG_FILE).is_file()
}

fn root_from_hint(hint: &str) -> Option<AppRoot> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !is_app_root(&hint_path) {
        return None;
    }
    AppRoot::new(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<AppRoot> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_app_root(&dir) {
            return AppRoot::new(&dir).ok();
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the application root.
///
/// Honors `BOOTPATH_ROOT` when it points at a directory holding
/// `bootpath.json`, then climbs up from the current directory.
pub fn find_app_root() -> Result<AppRoot> {
    if let Ok(hint) = env::var(ROOT_ENV) {
        if let Some(root) = root_from_hint(&hint) {
            return Ok(root);
        }
    }

    let cwd = env::current_dir()?;
    if let Some(root) = search_upwards(&cwd) {
        return Ok(root);
    }

    Err(Error::config(format!(
        "unable to locate application root from {}; set {ROOT_ENV} to a directory containing {CONFIG_FILE}",
        cwd.display()
    )))
}

/// Walk upwards from `start` looking for `bootpath.json`.
pub fn find_app_root_from(start: &Path) -> Result<AppRoot> {
    search_upwards(start).ok_or_else(|| {
        Error::config(format!(
            "no {CONFIG_FILE} found in {} or any parent directory",
            start.display()
        ))
    })
}
