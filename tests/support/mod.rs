#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use bootpath::{AppRoot, Bootstrap, Translator};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Temporary application tree: `<root>/src`, `<root>/lib`, `<root>/web`.
pub struct AppFixture {
    temp: TempDir,
}

impl AppFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        for dir in ["src", "lib", "web"] {
            fs::create_dir_all(temp.path().join(dir)).expect("fixture dirs");
        }
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn app_root(&self) -> AppRoot {
        AppRoot::new(self.root()).expect("fixture root")
    }

    /// Write a unit under `dir` (relative to the root) defining `ids`.
    pub fn unit(&self, dir: &str, rel: &str, ids: &[&str]) -> PathBuf {
        self.raw(dir, rel, &json!({ "defines": ids }).to_string())
    }

    pub fn raw(&self, dir: &str, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(dir).join(rel);
        fs::create_dir_all(path.parent().expect("unit parent")).expect("unit dirs");
        fs::write(&path, contents).expect("write unit");
        path
    }

    pub fn config(&self, config: &Value) {
        fs::write(self.root().join("bootpath.json"), config.to_string()).expect("write config");
    }

    /// `src` as the only source dir with the namespace/zendstyle/diagnostic chain.
    pub fn demo_bootstrap(&self) -> Bootstrap {
        let mut bootstrap = Bootstrap::init(self.app_root(), "src", true).expect("init");
        bootstrap.add_lib_dir("lib").expect("lib dir");
        bootstrap
            .add_translator(Translator::hierarchical())
            .expect("namespace translator");
        bootstrap
            .add_translator(Translator::flat())
            .expect("zendstyle translator");
        bootstrap.seal_with_diagnostic().expect("diagnostic");
        bootstrap
    }
}

pub fn bootpath_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_bootpath"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Parse NDJSON stdout into one value per line.
pub fn json_lines(stdout: &[u8]) -> Result<Vec<Value>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("line {} is not JSON: {line}", idx + 1))
        })
        .collect()
}
