//! Translations
//!
//! The catalog keeps one flat key -> string mapping per language together
//! with an explicit load state, so partial availability can be inspected
//! instead of inferred.
//!
//! Lookup order for a key is: active language, base language, the key
//! itself. Lookups never fail.
//!
//! ```
//! use influencer_hub::i18n::TranslationCatalog;
//! use influencer_hub::models::Language;
//!
//! let mut catalog = TranslationCatalog::new(Language::En);
//! catalog.insert(Language::En, [("hello".to_string(), "Hello {{name}}".to_string())].into());
//!
//! assert_eq!(catalog.translate(Language::Fr, "hello", &[("name", "Ada")]), "Hello Ada");
//! assert_eq!(catalog.translate(Language::Fr, "missing", &[]), "missing");
//! ```

pub mod loader;
pub mod source;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use crate::models::{Language, BASE_LANGUAGE};

pub use loader::TranslationLoader;
pub use source::{
    create_locale_source, DirectoryLocaleSource, EmbeddedLocaleSource, HttpLocaleSource,
    LocaleError, LocaleSource,
};

/// Flat mapping of translation key to localized string
pub type TranslationMap = HashMap<String, String>;

/// Load state of one language's mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotStarted,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    /// Whether the fetch for this language has finished, either way
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }
}

/// Overall progress of the translation loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPhase {
    /// Base language not yet available
    Loading,
    /// Base language settled, other languages still arriving
    PartiallyReady,
    /// Every language has been attempted
    Ready,
}

/// Per-language mappings plus their load states.
#[derive(Debug, Clone)]
pub struct TranslationCatalog {
    base: Language,
    mappings: HashMap<Language, TranslationMap>,
    states: HashMap<Language, LoadState>,
}

impl Default for TranslationCatalog {
    fn default() -> Self {
        Self::new(BASE_LANGUAGE)
    }
}

impl TranslationCatalog {
    pub fn new(base: Language) -> Self {
        Self {
            base,
            mappings: HashMap::new(),
            states: HashMap::new(),
        }
    }

    pub fn base(&self) -> Language {
        self.base
    }

    pub fn state(&self, language: Language) -> LoadState {
        self.states.get(&language).copied().unwrap_or_default()
    }

    pub fn mark_loading(&mut self, language: Language) {
        self.states.insert(language, LoadState::Loading);
    }

    /// Store a fetched mapping, replacing any previous one for that language
    pub fn insert(&mut self, language: Language, mapping: TranslationMap) {
        self.mappings.insert(language, mapping);
        self.states.insert(language, LoadState::Loaded);
    }

    /// Record a failed fetch. The base language gets an empty mapping so
    /// lookups degrade to raw keys.
    pub fn mark_failed(&mut self, language: Language) {
        if language == self.base {
            self.mappings.entry(language).or_default();
        }
        self.states.insert(language, LoadState::Failed);
    }

    pub fn mapping(&self, language: Language) -> Option<&TranslationMap> {
        self.mappings.get(&language)
    }

    /// Value for `key` in exactly `language`. Empty strings count as missing.
    pub fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.mappings
            .get(&language)
            .and_then(|m| m.get(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Resolve `key` for `active`: active mapping, then base mapping, then the key.
    pub fn resolve<'a>(&'a self, active: Language, key: &'a str) -> &'a str {
        self.lookup(active, key)
            .or_else(|| self.lookup(self.base, key))
            .unwrap_or(key)
    }

    /// Resolve `key` and substitute `{{name}}` placeholders.
    pub fn translate(&self, active: Language, key: &str, replacements: &[(&str, &str)]) -> String {
        interpolate(self.resolve(active, key), replacements)
    }

    /// Loader progress derived from the per-language states
    pub fn phase(&self) -> LoaderPhase {
        if !self.state(self.base).is_settled() {
            return LoaderPhase::Loading;
        }
        let others_pending = Language::ALL
            .iter()
            .filter(|l| **l != self.base)
            .any(|l| !self.state(*l).is_settled());
        if others_pending {
            LoaderPhase::PartiallyReady
        } else {
            LoaderPhase::Ready
        }
    }

    /// Languages whose mapping is loaded
    pub fn loaded_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|l| self.state(*l) == LoadState::Loaded)
            .collect()
    }
}

/// Replace every `{{name}}` in `template` with its value. Placeholders
/// without a replacement are left as they are.
pub fn interpolate(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in replacements {
        let placeholder = format!("{{{{{}}}}}", name);
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, value);
        }
    }
    out
}

/// Shared handle to a [`TranslationCatalog`].
///
/// Cloning is cheap; all clones see the same catalog.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    inner: Arc<RwLock<TranslationCatalog>>,
}

impl Translations {
    pub fn new(base: Language) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TranslationCatalog::new(base))),
        }
    }

    /// Wrap an already populated catalog
    pub fn from_catalog(catalog: TranslationCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TranslationCatalog> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with exclusive access to the catalog
    pub fn update<R>(&self, f: impl FnOnce(&mut TranslationCatalog) -> R) -> R {
        let mut catalog = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut catalog)
    }

    pub fn translate(&self, active: Language, key: &str, replacements: &[(&str, &str)]) -> String {
        self.read().translate(active, key, replacements)
    }

    pub fn phase(&self) -> LoaderPhase {
        self.read().phase()
    }

    pub fn state(&self, language: Language) -> LoadState {
        self.read().state(language)
    }
}
