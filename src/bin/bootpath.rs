//! Command-line front end for the bootstrap resolver.
//!
//! `translate` shows the fragment a naming convention derives, `resolve`
//! runs the configured chain and emits one JSON report per identifier, and
//! `search-path` prints the directories the chain would consult.

use anyhow::{Context, Result, bail};
use bootpath::{
    AppRoot, Bootstrap, BootstrapConfig, CONFIG_FILE, Identifier, Translator, find_app_root,
};
use serde_json::{Value, json};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BOOTPATH_LOG";

fn main() {
    init_logging();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<i32> {
    match parse_args(env::args_os().skip(1))? {
        Command::Translate {
            translator,
            identifiers,
        } => {
            for identifier in identifiers {
                println!("{}", translator.translate(&identifier).display());
            }
            Ok(0)
        }
        Command::Resolve {
            location,
            identifiers,
        } => {
            let bootstrap = location.bootstrap()?;
            let mut failed = false;
            for identifier in identifiers {
                let (record, ok) = resolve_record(&bootstrap, &identifier);
                failed |= !ok;
                println!("{}", serde_json::to_string(&record)?);
            }
            Ok(if failed { 1 } else { 0 })
        }
        Command::SearchPath { location } => {
            let bootstrap = location.bootstrap()?;
            for dir in bootstrap.search_path().dirs() {
                println!("{}", dir.display());
            }
            Ok(0)
        }
        Command::Help => {
            print!("{}", usage());
            Ok(0)
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Translate {
        translator: Translator,
        identifiers: Vec<Identifier>,
    },
    Resolve {
        location: Location,
        identifiers: Vec<Identifier>,
    },
    SearchPath {
        location: Location,
    },
    Help,
}

/// Where the application lives and which config applies.
#[derive(Debug, Default, PartialEq)]
struct Location {
    root: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl Location {
    fn bootstrap(&self) -> Result<Bootstrap> {
        let root = match &self.root {
            Some(dir) => AppRoot::new(dir)?,
            None => find_app_root()?,
        };
        let config_path = self
            .config
            .clone()
            .unwrap_or_else(|| root.path().join(CONFIG_FILE));
        let config = if config_path.is_file() {
            BootstrapConfig::load(&config_path)?
        } else if self.config.is_some() {
            bail!("config file not found: {}", config_path.display());
        } else {
            BootstrapConfig::default()
        };
        Bootstrap::from_config(root, &config)
            .with_context(|| format!("bootstrapping from {}", config_path.display()))
    }
}

fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let Some(subcommand) = args.next() else {
        bail!(usage());
    };
    let rest = args
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| anyhow::anyhow!("argument is not valid UTF-8: {raw:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    match subcommand.to_str() {
        Some("translate") => {
            let mut rest = rest.into_iter();
            let Some(name) = rest.next() else {
                bail!("translate expects a translator name and at least one identifier");
            };
            let identifiers: Vec<Identifier> = rest.map(Identifier::from).collect();
            if identifiers.is_empty() {
                bail!("translate expects at least one identifier");
            }
            Ok(Command::Translate {
                translator: Translator::from_name(&name, '.')?,
                identifiers,
            })
        }
        Some("resolve") => {
            let (location, positional) = parse_location(rest)?;
            if positional.is_empty() {
                bail!("resolve expects at least one identifier");
            }
            Ok(Command::Resolve {
                location,
                identifiers: positional.into_iter().map(Identifier::from).collect(),
            })
        }
        Some("search-path") => {
            let (location, positional) = parse_location(rest)?;
            if !positional.is_empty() {
                bail!("search-path takes no positional arguments");
            }
            Ok(Command::SearchPath { location })
        }
        Some("--help") | Some("-h") => Ok(Command::Help),
        Some(other) => bail!("Unknown subcommand: {other}"),
        None => bail!("Subcommand must be valid Unicode"),
    }
}

fn parse_location(args: Vec<String>) -> Result<(Location, Vec<String>)> {
    let mut location = Location::default();
    let mut positional = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--root" => {
                let value = args.next().context("--root expects a directory")?;
                location.root = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = args.next().context("--config expects a file")?;
                location.config = Some(PathBuf::from(value));
            }
            _ => positional.push(arg),
        }
    }
    Ok((location, positional))
}

/// JSON report for one identifier plus whether it resolved without error.
fn resolve_record(bootstrap: &Bootstrap, identifier: &Identifier) -> (Value, bool) {
    let report = bootstrap.resolve_traced(identifier);
    let attempts = serde_json::to_value(&report.attempts).unwrap_or(Value::Null);
    match report.outcome {
        Ok(resolution) => (
            json!({
                "identifier": report.identifier,
                "resolution": resolution,
                "attempts": attempts,
            }),
            true,
        ),
        Err(err) => (
            json!({
                "identifier": report.identifier,
                "error": { "kind": err.kind(), "message": err.to_string() },
                "attempts": attempts,
            }),
            false,
        ),
    }
}

fn usage() -> &'static str {
    "Usage: bootpath <translate|resolve|search-path> [args]\n\nCommands:\n  translate <namespace|zendstyle> <id>...      Print the path fragment each identifier maps to.\n  resolve [--root DIR] [--config FILE] <id>...  Resolve identifiers and emit one JSON report each.\n  search-path [--root DIR] [--config FILE]      Print the configured search directories.\n\nEnvironment:\n  BOOTPATH_ROOT     application root (directory holding bootpath.json)\n  BOOTPATH_INCLUDE  extra search directories appended when the search path is not replaced\n  BOOTPATH_LOG      log filter (default: warn)\n"
}
