//! Ordered translator chain with an optional terminal diagnostic stage.
//!
//! Registration order is priority order: `resolve` walks translators in the
//! order they were registered and stops at the first candidate that loads
//! and defines the identifier. A unit that loads without defining it does
//! not stop the chain.
//! Installing the diagnostic stage seals the chain; exhaustion of a sealed
//! chain is `Error::ResolutionFailed`, exhaustion of an open chain is
//! `Resolution::Unresolved`.

use crate::error::{Error, Result};
use crate::identity::Identifier;
use crate::loader::{LoadOutcome, UnitLoader};
use crate::translator::Translator;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// A translator's candidate loaded and defined the identifier; later
    /// translators were skipped.
    Loaded {
        translator: Translator,
        path: PathBuf,
    },
    /// A previous load already defined the identifier.
    AlreadyDefined { path: PathBuf },
    /// No candidate defined the identifier and no diagnostic is installed.
    Unresolved,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Loaded { path: PathBuf },
    /// The candidate loaded but does not define the identifier.
    LoadedWithoutDefinition { path: PathBuf },
    NotFound,
    Error { message: String },
}

/// One translator tried during a resolution.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LoadAttempt {
    pub translator: Translator,
    pub fragment: PathBuf,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// Everything a single `resolve_traced` call did.
#[derive(Debug)]
pub struct ResolutionReport {
    pub identifier: Identifier,
    pub attempts: Vec<LoadAttempt>,
    pub outcome: Result<Resolution>,
}

impl ResolutionReport {
    fn finish(
        identifier: &Identifier,
        attempts: Vec<LoadAttempt>,
        outcome: Result<Resolution>,
    ) -> Self {
        Self {
            identifier: identifier.clone(),
            attempts,
            outcome,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResolutionChain {
    translators: Vec<Translator>,
    sealed: bool,
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translators(&self) -> &[Translator] {
        &self.translators
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Append a translator; fails once the diagnostic stage is installed.
    pub fn register(&mut self, translator: Translator) -> Result<()> {
        if self.sealed {
            return Err(Error::ChainSealed { translator });
        }
        self.translators.push(translator);
        debug!(%translator, position = self.translators.len(), "translator registered");
        Ok(())
    }

    /// Install the diagnostic stage, sealing the chain.
    pub fn register_diagnostic(&mut self) -> Result<()> {
        if self.sealed {
            return Err(Error::config("diagnostic stage is already installed"));
        }
        self.sealed = true;
        debug!(translators = self.translators.len(), "diagnostic stage installed");
        Ok(())
    }

    pub fn resolve<L>(&self, identifier: &Identifier, loader: &L) -> Result<Resolution>
    where
        L: UnitLoader + ?Sized,
    {
        self.resolve_traced(identifier, loader).outcome
    }

    /// Resolve `identifier`, keeping a record of every attempt.
    pub fn resolve_traced<L>(&self, identifier: &Identifier, loader: &L) -> ResolutionReport
    where
        L: UnitLoader + ?Sized,
    {
        let mut attempts = Vec::with_capacity(self.translators.len());

        if identifier.is_blank() {
            let err = Error::InvalidIdentifier(identifier.to_string());
            return ResolutionReport::finish(identifier, attempts, Err(err));
        }
        if self.translators.is_empty() {
            let err = Error::config(format!(
                "no translators registered; cannot resolve '{identifier}'"
            ));
            return ResolutionReport::finish(identifier, attempts, Err(err));
        }
        if let Some(path) = loader.defined_in(identifier) {
            trace!(%identifier, path = %path.display(), "already defined");
            let resolution = Resolution::AlreadyDefined { path };
            return ResolutionReport::finish(identifier, attempts, Ok(resolution));
        }

        for translator in &self.translators {
            let fragment = translator.translate(identifier);
            trace!(%identifier, %translator, fragment = %fragment.display(), "trying candidate");
            match loader.load(&fragment) {
                Ok(LoadOutcome::Loaded { path }) if loader.defined_in(identifier).is_none() => {
                    trace!(
                        %identifier,
                        path = %path.display(),
                        "unit does not define identifier"
                    );
                    attempts.push(LoadAttempt {
                        translator: *translator,
                        fragment,
                        outcome: AttemptOutcome::LoadedWithoutDefinition { path },
                    });
                }
                Ok(LoadOutcome::Loaded { path }) => {
                    attempts.push(LoadAttempt {
                        translator: *translator,
                        fragment,
                        outcome: AttemptOutcome::Loaded { path: path.clone() },
                    });
                    debug!(%identifier, %translator, path = %path.display(), "resolved");
                    let resolution = Resolution::Loaded {
                        translator: *translator,
                        path,
                    };
                    return ResolutionReport::finish(identifier, attempts, Ok(resolution));
                }
                Ok(LoadOutcome::NotFound) => attempts.push(LoadAttempt {
                    translator: *translator,
                    fragment,
                    outcome: AttemptOutcome::NotFound,
                }),
                Err(err) => {
                    attempts.push(LoadAttempt {
                        translator: *translator,
                        fragment,
                        outcome: AttemptOutcome::Error {
                            message: err.to_string(),
                        },
                    });
                    return ResolutionReport::finish(identifier, attempts, Err(err));
                }
            }
        }

        let outcome = if self.sealed {
            let candidates = attempts.iter().map(|a| a.fragment.clone()).collect();
            Err(diagnose(identifier, candidates))
        } else {
            trace!(%identifier, "unresolved");
            Ok(Resolution::Unresolved)
        };
        ResolutionReport::finish(identifier, attempts, outcome)
    }
}

/// The diagnostic stage: turn exhaustion into an identifier-bearing failure.
pub fn diagnose(identifier: &Identifier, candidates: Vec<PathBuf>) -> Error {
    Error::ResolutionFailed {
        identifier: identifier.clone(),
        candidates,
    }
}

/// Chain shared between threads.
///
/// Registration takes the write lock; resolution only needs the read lock,
/// so lookups proceed in parallel once startup finishes.
#[derive(Clone, Debug, Default)]
pub struct SharedChain {
    inner: Arc<RwLock<ResolutionChain>>,
}

impl SharedChain {
    pub fn new(chain: ResolutionChain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    // Mutations either complete or return before touching the chain, so a
    // poisoned lock never exposes half-written state.
    fn read(&self) -> RwLockReadGuard<'_, ResolutionChain> {
        self.inner.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ResolutionChain> {
        self.inner.write().unwrap_or_else(|err| err.into_inner())
    }

    pub fn register(&self, translator: Translator) -> Result<()> {
        self.write().register(translator)
    }

    pub fn register_diagnostic(&self) -> Result<()> {
        self.write().register_diagnostic()
    }

    pub fn is_sealed(&self) -> bool {
        self.read().is_sealed()
    }

    pub fn resolve<L>(&self, identifier: &Identifier, loader: &L) -> Result<Resolution>
    where
        L: UnitLoader + ?Sized,
    {
        self.read().resolve(identifier, loader)
    }

    pub fn snapshot(&self) -> ResolutionChain {
        self.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::Path;

    /// Loader over in-memory fragments, each defining a list of identifiers.
    /// Records every call.
    #[derive(Default)]
    struct FakeLoader {
        present: BTreeMap<PathBuf, Vec<Identifier>>,
        broken: BTreeSet<PathBuf>,
        defined: RefCell<BTreeMap<Identifier, PathBuf>>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl FakeLoader {
        fn with(present: &[(PathBuf, &str)], broken: &[&str]) -> Self {
            Self {
                present: present
                    .iter()
                    .map(|(fragment, id)| (fragment.clone(), vec![Identifier::new(*id)]))
                    .collect(),
                broken: broken.iter().map(PathBuf::from).collect(),
                ..Self::default()
            }
        }
    }

    impl UnitLoader for FakeLoader {
        fn load(&self, fragment: &Path) -> Result<LoadOutcome> {
            self.calls.borrow_mut().push(fragment.to_path_buf());
            if self.broken.contains(fragment) {
                return Err(Error::load(fragment, "syntax error"));
            }
            if let Some(ids) = self.present.get(fragment) {
                let mut defined = self.defined.borrow_mut();
                for id in ids {
                    defined.insert(id.clone(), fragment.to_path_buf());
                }
                return Ok(LoadOutcome::Loaded {
                    path: fragment.to_path_buf(),
                });
            }
            Ok(LoadOutcome::NotFound)
        }

        fn defined_in(&self, identifier: &Identifier) -> Option<PathBuf> {
            self.defined.borrow().get(identifier).cloned()
        }
    }

    fn full_chain() -> ResolutionChain {
        let mut chain = ResolutionChain::new();
        chain.register(Translator::hierarchical()).unwrap();
        chain.register(Translator::flat()).unwrap();
        chain.register_diagnostic().unwrap();
        chain
    }

    fn frag(parts: &[&str]) -> PathBuf {
        parts.iter().collect()
    }

    #[test]
    fn first_loaded_translator_wins() {
        let target = frag(&["demo", "AppDemo"]);
        let loader = FakeLoader::with(&[(target.clone(), "demo.AppDemo")], &[]);
        let resolution = full_chain()
            .resolve(&Identifier::new("demo.AppDemo"), &loader)
            .unwrap();

        assert_eq!(
            resolution,
            Resolution::Loaded {
                translator: Translator::hierarchical(),
                path: target.clone()
            }
        );
        assert_eq!(*loader.calls.borrow(), vec![target]);
    }

    #[test]
    fn falls_through_to_flat_translator() {
        let target = frag(&["Zendstyle", "Demo", "AppDemo"]);
        let loader = FakeLoader::with(&[(target, "Zendstyle_Demo_AppDemo")], &[]);
        let report =
            full_chain().resolve_traced(&Identifier::new("Zendstyle_Demo_AppDemo"), &loader);

        assert_eq!(report.attempts.len(), 2);
        assert_eq!(report.attempts[0].outcome, AttemptOutcome::NotFound);
        assert_eq!(
            report.attempts[0].fragment,
            PathBuf::from("Zendstyle_Demo_AppDemo")
        );
        assert!(matches!(
            report.outcome,
            Ok(Resolution::Loaded {
                translator: Translator::Flat,
                ..
            })
        ));
    }

    #[test]
    fn unit_without_definition_does_not_stop_the_chain() {
        let loader = FakeLoader::with(
            &[
                (PathBuf::from("Zend_Db_Table"), "Something_Else"),
                (frag(&["Zend", "Db", "Table"]), "Zend_Db_Table"),
            ],
            &[],
        );
        let report = full_chain().resolve_traced(&Identifier::new("Zend_Db_Table"), &loader);

        assert!(matches!(
            report.attempts[0].outcome,
            AttemptOutcome::LoadedWithoutDefinition { .. }
        ));
        assert!(matches!(
            report.outcome,
            Ok(Resolution::Loaded {
                translator: Translator::Flat,
                ..
            })
        ));
    }

    #[test]
    fn sealed_chain_fails_when_no_unit_defines_identifier() {
        let loader = FakeLoader::with(&[(frag(&["demo", "AppDemo"]), "demo.Other")], &[]);
        let chain = full_chain();

        for _ in 0..2 {
            let err = chain
                .resolve(&Identifier::new("demo.AppDemo"), &loader)
                .unwrap_err();
            assert_eq!(err.kind(), "resolution_failed");
        }
    }

    #[test]
    fn sealed_chain_exhaustion_names_identifier() {
        let loader = FakeLoader::default();
        let err = full_chain()
            .resolve(&Identifier::new("NonExistingAppDemo"), &loader)
            .unwrap_err();

        match &err {
            Error::ResolutionFailed {
                identifier,
                candidates,
            } => {
                assert_eq!(identifier.as_str(), "NonExistingAppDemo");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("NonExistingAppDemo"));
        assert_eq!(loader.calls.borrow().len(), 2);
    }

    #[test]
    fn open_chain_exhaustion_is_silent() {
        let mut chain = ResolutionChain::new();
        chain.register(Translator::hierarchical()).unwrap();
        chain.register(Translator::flat()).unwrap();
        let resolution = chain
            .resolve(&Identifier::new("NonExistingAppDemo"), &FakeLoader::default())
            .unwrap();
        assert_eq!(resolution, Resolution::Unresolved);
    }

    #[test]
    fn load_errors_stop_the_chain() {
        let loader = FakeLoader::with(
            &[(frag(&["Broken", "Unit"]), "Broken_Unit")],
            &["Broken_Unit"],
        );
        let err = full_chain()
            .resolve(&Identifier::new("Broken_Unit"), &loader)
            .unwrap_err();
        assert_eq!(err.kind(), "load");
        // Hierarchical leaves the name unchanged, so the broken fragment is
        // hit first and the flat translator never runs.
        assert_eq!(*loader.calls.borrow(), vec![PathBuf::from("Broken_Unit")]);
    }

    #[test]
    fn register_after_seal_always_fails() {
        for count in 0..3 {
            let mut chain = ResolutionChain::new();
            for _ in 0..count {
                chain.register(Translator::flat()).unwrap();
            }
            chain.register_diagnostic().unwrap();
            let err = chain.register(Translator::hierarchical()).unwrap_err();
            assert!(matches!(err, Error::ChainSealed { .. }));
            assert_eq!(chain.translators().len(), count);
        }
    }

    #[test]
    fn double_diagnostic_is_a_configuration_error() {
        let mut chain = full_chain();
        let err = chain.register_diagnostic().unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert!(chain.is_sealed());
    }

    #[test]
    fn empty_chain_and_blank_identifier_are_rejected() {
        let mut chain = ResolutionChain::new();
        let err = chain
            .resolve(&Identifier::new("Anything"), &FakeLoader::default())
            .unwrap_err();
        assert_eq!(err.kind(), "configuration");

        chain.register(Translator::flat()).unwrap();
        let err = chain
            .resolve(&Identifier::new("   "), &FakeLoader::default())
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_identifier");
    }

    #[test]
    fn already_defined_skips_translators() {
        let loader = FakeLoader::default();
        loader
            .defined
            .borrow_mut()
            .insert(
                Identifier::new("demo.AppDemo"),
                PathBuf::from("/app/src/demo/AppDemo.json"),
            );
        let resolution = full_chain()
            .resolve(&Identifier::new("demo.AppDemo"), &loader)
            .unwrap();
        assert!(matches!(resolution, Resolution::AlreadyDefined { .. }));
        assert!(loader.calls.borrow().is_empty());
    }

    #[test]
    fn shared_chain_enforces_seal_across_clones() {
        let shared = SharedChain::new(ResolutionChain::new());
        let other = shared.clone();
        shared.register(Translator::hierarchical()).unwrap();
        other.register_diagnostic().unwrap();

        assert!(shared.is_sealed());
        assert!(shared.register(Translator::flat()).is_err());
        assert_eq!(
            shared.snapshot().translators(),
            &[Translator::hierarchical()]
        );
    }
}
