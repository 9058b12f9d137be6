//! Translation loader
//!
//! Loads the base language first and lets the caller await it; every other
//! language is then fetched concurrently in the background and merged into
//! the shared catalog as each one arrives. Failures are logged and leave
//! the language marked failed; nothing is retried.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{LoaderPhase, LocaleSource, Translations};
use crate::models::Language;
use crate::state::StateEvent;

pub struct TranslationLoader {
    source: Arc<dyn LocaleSource>,
    translations: Translations,
    events: Option<broadcast::Sender<StateEvent>>,
}

impl TranslationLoader {
    pub fn new(source: Arc<dyn LocaleSource>, translations: Translations) -> Self {
        Self {
            source,
            translations,
            events: None,
        }
    }

    /// Announce each settled language on `events`
    pub fn with_events(mut self, events: broadcast::Sender<StateEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Fetch the base language and wait for it to settle.
    ///
    /// Returns the loader phase afterwards, which is never
    /// [`LoaderPhase::Loading`].
    pub async fn load_base(&self) -> LoaderPhase {
        let base = self.translations.read().base();
        info!("Loading base translations ({}) from {}", base, self.source.describe());

        load_language(&*self.source, &self.translations, self.events.as_ref(), base).await;

        let empty = self
            .translations
            .read()
            .mapping(base)
            .map_or(true, |m| m.is_empty());
        if empty {
            warn!("Base translations are empty; keys will be shown as-is");
        }
        self.translations.phase()
    }

    /// Start fetching every non-base language in the background.
    ///
    /// All of them are marked loading before this returns. The returned
    /// handle completes once every fetch has settled.
    pub fn spawn_remaining(&self) -> JoinHandle<()> {
        let base = self.translations.read().base();
        let pending: Vec<Language> = Language::ALL
            .into_iter()
            .filter(|l| *l != base)
            .collect();

        self.translations.update(|catalog| {
            for lang in &pending {
                catalog.mark_loading(*lang);
            }
        });

        let source = self.source.clone();
        let translations = self.translations.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let fetches = pending
                .into_iter()
                .map(|lang| load_language(&*source, &translations, events.as_ref(), lang));
            join_all(fetches).await;

            let loaded = translations.read().loaded_languages();
            info!("Translation loading finished; loaded: {:?}", loaded);
        })
    }

    /// Load the base language, then every other language, waiting for all.
    pub async fn load_all(&self) -> LoaderPhase {
        self.load_base().await;
        if let Err(e) = self.spawn_remaining().await {
            error!("Translation loader task failed: {}", e);
        }
        self.translations.phase()
    }
}

async fn load_language(
    source: &dyn LocaleSource,
    translations: &Translations,
    events: Option<&broadcast::Sender<StateEvent>>,
    language: Language,
) {
    translations.update(|catalog| catalog.mark_loading(language));

    match source.fetch(language).await {
        Ok(mapping) => {
            debug!("Loaded {} translations for {}", mapping.len(), language);
            translations.update(|catalog| catalog.insert(language, mapping));
        }
        Err(e) => {
            if language.is_base() {
                error!("Failed to load base translations: {}", e);
            } else {
                warn!("Failed to load translations for {}: {}", language, e);
            }
            translations.update(|catalog| catalog.mark_failed(language));
        }
    }

    if let Some(events) = events {
        // No subscribers is fine
        let _ = events.send(StateEvent::TranslationsUpdated(language));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{LoadState, LocaleError, TranslationMap};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    /// Source serving fixed mappings with per-language delays and failures
    #[derive(Default)]
    struct FakeSource {
        mappings: HashMap<Language, TranslationMap>,
        failing: HashSet<Language>,
        delays: HashMap<Language, Duration>,
    }

    impl FakeSource {
        fn with(mut self, lang: Language, entries: &[(&str, &str)]) -> Self {
            self.mappings.insert(
                lang,
                entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            );
            self
        }

        fn failing(mut self, lang: Language) -> Self {
            self.failing.insert(lang);
            self
        }

        fn delayed(mut self, lang: Language, delay: Duration) -> Self {
            self.delays.insert(lang, delay);
            self
        }
    }

    #[async_trait]
    impl LocaleSource for FakeSource {
        async fn fetch(&self, language: Language) -> Result<TranslationMap, LocaleError> {
            if let Some(delay) = self.delays.get(&language) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(&language) {
                return Err(LocaleError::Status { language, status: 500 });
            }
            self.mappings
                .get(&language)
                .cloned()
                .ok_or(LocaleError::NotFound(language))
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    #[tokio::test]
    async fn test_base_then_partially_ready() {
        let source = FakeSource::default()
            .with(Language::En, &[("save", "Save")])
            .delayed(Language::Fr, Duration::from_secs(60));
        let loader = TranslationLoader::new(Arc::new(source), Translations::new(Language::En));

        let phase = loader.load_base().await;

        assert_eq!(phase, LoaderPhase::PartiallyReady);
        assert_eq!(loader.translations().translate(Language::En, "save", &[]), "Save");
        assert_eq!(loader.translations().state(Language::Fr), LoadState::NotStarted);
    }

    #[tokio::test]
    async fn test_base_failure_falls_back_to_keys() {
        let source = FakeSource::default().failing(Language::En);
        let loader = TranslationLoader::new(Arc::new(source), Translations::new(Language::En));

        let phase = loader.load_base().await;

        assert_eq!(phase, LoaderPhase::PartiallyReady);
        assert_eq!(loader.translations().state(Language::En), LoadState::Failed);
        assert_eq!(loader.translations().translate(Language::En, "save", &[]), "save");
    }

    #[tokio::test]
    async fn test_load_all_reaches_ready_with_partial_failures() {
        let source = FakeSource::default()
            .with(Language::En, &[("save", "Save"), ("cancel", "Cancel")])
            .with(Language::Fr, &[("save", "Enregistrer")])
            .with(Language::Es, &[("save", "Guardar")])
            .failing(Language::Nl);
        let loader = TranslationLoader::new(Arc::new(source), Translations::new(Language::En));

        let phase = loader.load_all().await;
        let translations = loader.translations();

        assert_eq!(phase, LoaderPhase::Ready);
        assert_eq!(translations.state(Language::Fr), LoadState::Loaded);
        assert_eq!(translations.state(Language::Nl), LoadState::Failed);
        // Hi and Ta have no resource at all
        assert_eq!(translations.state(Language::Hi), LoadState::Failed);
        assert_eq!(translations.translate(Language::Fr, "save", &[]), "Enregistrer");
        assert_eq!(translations.translate(Language::Fr, "cancel", &[]), "Cancel");
        assert_eq!(translations.translate(Language::Nl, "save", &[]), "Save");
        assert_eq!(translations.translate(Language::Es, "save", &[]), "Guardar");
    }

    #[tokio::test(start_paused = true)]
    async fn test_languages_merge_in_arrival_order() {
        let source = FakeSource::default()
            .with(Language::En, &[("k", "en")])
            .with(Language::Fr, &[("k", "fr")])
            .with(Language::Es, &[("k", "es")])
            .delayed(Language::Fr, Duration::from_secs(1))
            .delayed(Language::Es, Duration::from_secs(10));
        let (tx, mut rx) = broadcast::channel(16);
        let loader = TranslationLoader::new(Arc::new(source), Translations::new(Language::En))
            .with_events(tx);

        loader.load_base().await;
        let handle = loader.spawn_remaining();
        assert_eq!(loader.translations().state(Language::Es), LoadState::Loading);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(loader.translations().state(Language::Fr), LoadState::Loaded);
        assert_eq!(loader.translations().state(Language::Es), LoadState::Loading);
        assert_eq!(loader.translations().phase(), LoaderPhase::PartiallyReady);

        handle.await.unwrap();
        assert_eq!(loader.translations().phase(), LoaderPhase::Ready);

        let mut order = Vec::new();
        while let Ok(StateEvent::TranslationsUpdated(lang)) = rx.try_recv() {
            order.push(lang);
        }
        assert_eq!(order.first(), Some(&Language::En));
        let fr = order.iter().position(|l| *l == Language::Fr).unwrap();
        let es = order.iter().position(|l| *l == Language::Es).unwrap();
        assert!(fr < es);
    }
}
