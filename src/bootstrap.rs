//! Application startup: one owner for the search path, loader, and chain.
//!
//! Build a `Bootstrap` once, register translators, optionally seal it with
//! the diagnostic stage, then hand `&Bootstrap` to whatever performs dynamic
//! lookups.

use crate::app_root::AppRoot;
use crate::chain::{Resolution, ResolutionChain, ResolutionReport};
use crate::config::BootstrapConfig;
use crate::error::Result;
use crate::identity::Identifier;
use crate::loader::FileLoader;
use crate::registry::UnitRegistry;
use crate::search_path::{AddMode, INCLUDE_ENV, SearchPath};
use crate::translator::{DEFAULT_NAMESPACE_SEPARATOR, Translator};
use std::env;
use std::ffi::OsStr;
use std::sync::MutexGuard;
use tracing::info;

#[derive(Debug)]
pub struct Bootstrap {
    chain: ResolutionChain,
    loader: FileLoader,
    namespace_separator: char,
}

impl Bootstrap {
    /// Start an application rooted at `root` whose units live in `source_dir`.
    ///
    /// With `replace` the search path holds only `source_dir`; otherwise
    /// `source_dir` is prepended to the entries of `BOOTPATH_INCLUDE`.
    pub fn init(root: AppRoot, source_dir: &str, replace: bool) -> Result<Self> {
        let include = env::var_os(INCLUDE_ENV);
        Self::init_with(SearchPath::new(root), source_dir, replace, include.as_deref())
    }

    /// `include` stands in for the pre-existing search path the source dir
    /// is prepended to; it is ignored when `replace` is set.
    fn init_with(
        mut search: SearchPath,
        source_dir: &str,
        replace: bool,
        include: Option<&OsStr>,
    ) -> Result<Self> {
        let mode = if replace {
            AddMode::Replace
        } else {
            if let Some(include) = include {
                search.append_path_list(include)?;
            }
            AddMode::Prepend
        };
        search.add(source_dir, mode)?;
        info!(
            root = %search.root().path().display(),
            application_id = %search.root().application_id(),
            "application initialised"
        );
        Ok(Self {
            chain: ResolutionChain::new(),
            loader: FileLoader::new(search)?,
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR,
        })
    }

    /// Apply a whole configuration: source dir, lib dirs, translators, then
    /// the diagnostic stage.
    pub fn from_config(root: AppRoot, config: &BootstrapConfig) -> Result<Self> {
        let search = SearchPath::with_extension(root, &config.extension);
        let include = env::var_os(INCLUDE_ENV);
        let mut bootstrap = Self::init_with(
            search,
            &config.source_dir,
            config.replace_search_path,
            include.as_deref(),
        )?;
        bootstrap.namespace_separator = config.namespace_separator;
        for dir in &config.lib_dirs {
            bootstrap.add_lib_dir(dir)?;
        }
        for name in &config.translators {
            bootstrap.add_translator_named(name)?;
        }
        if config.diagnostic {
            bootstrap.seal_with_diagnostic()?;
        }
        Ok(bootstrap)
    }

    /// Append a library directory (relative to the root, or absolute).
    pub fn add_lib_dir(&mut self, dir: &str) -> Result<()> {
        self.loader.search_path_mut().add_lib_dir(dir)
    }

    pub fn add_translator(&mut self, translator: Translator) -> Result<()> {
        self.chain.register(translator)
    }

    /// Register a translator by configuration name (`namespace`, `zendstyle`).
    pub fn add_translator_named(&mut self, name: &str) -> Result<()> {
        let translator = Translator::from_name(name, self.namespace_separator)?;
        self.add_translator(translator)
    }

    /// Install the diagnostic stage; no translator can be added afterwards.
    pub fn seal_with_diagnostic(&mut self) -> Result<()> {
        self.chain.register_diagnostic()
    }

    pub fn resolve(&self, identifier: &Identifier) -> Result<Resolution> {
        self.chain.resolve(identifier, &self.loader)
    }

    pub fn resolve_traced(&self, identifier: &Identifier) -> ResolutionReport {
        self.chain.resolve_traced(identifier, &self.loader)
    }

    pub fn chain(&self) -> &ResolutionChain {
        &self.chain
    }

    pub fn search_path(&self) -> &SearchPath {
        self.loader.search_path()
    }

    pub fn registry(&self) -> MutexGuard<'_, UnitRegistry> {
        self.loader.registry()
    }
}
