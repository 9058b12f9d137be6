//! Application startup
//!
//! Startup runs in a fixed order:
//! 1. evaluate the API credential once
//! 2. build the store from persisted state and apply its theme markers
//! 3. await the base-language translations, then fetch the others in the
//!    background
//!
//! The returned [`App`] is usable as soon as step 3 has awaited the base
//! language, whether that fetch succeeded or not.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::ai::{GeminiClient, TextGenerator};
use crate::config::{mask_api_key, Config};
use crate::i18n::{create_locale_source, LoaderPhase, LocaleSource, TranslationLoader, Translations};
use crate::models::{ApiKeyStatus, BASE_LANGUAGE};
use crate::services::{AssistantSession, CompareService, DiscoveryService};
use crate::state::AppStore;
use crate::storage::{create_store, PersistentStore};
use crate::theme::ThemeTarget;

/// Startup options. Anything not overridden is built from the config.
pub struct Startup {
    config: Config,
    credential: Option<String>,
    storage: Option<PersistentStore>,
    locale_source: Option<Arc<dyn LocaleSource>>,
    theme_target: Option<Arc<dyn ThemeTarget>>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Startup {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            credential: None,
            storage: None,
            locale_source: None,
            theme_target: None,
            generator: None,
        }
    }

    /// Credential for the AI service, usually from the environment
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_storage(mut self, storage: PersistentStore) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_locale_source(mut self, source: Arc<dyn LocaleSource>) -> Self {
        self.locale_source = Some(source);
        self
    }

    pub fn with_theme_target(mut self, target: Arc<dyn ThemeTarget>) -> Self {
        self.theme_target = Some(target);
        self
    }

    /// Use `generator` instead of a Gemini client built from the credential
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub async fn run(self) -> anyhow::Result<App> {
        let config = self.config;

        // 1. Credential
        let api_key_status = ApiKeyStatus::from_credential(self.credential.as_deref());
        let api_key_hint = match (&self.credential, api_key_status) {
            (Some(key), ApiKeyStatus::Ok) => Some(mask_api_key(key)),
            _ => None,
        };
        let generator: Option<Arc<dyn TextGenerator>> = match (self.generator, &self.credential) {
            (Some(generator), _) => Some(generator),
            (None, Some(key)) if api_key_status.is_ok() => {
                Some(Arc::new(GeminiClient::new(&config.ai, key.clone())?))
            }
            _ => None,
        };
        match &api_key_hint {
            Some(hint) => info!("AI features enabled (key {})", hint),
            None => warn!("API key missing; AI features are disabled"),
        }

        // 2. Store and theme
        let storage = match self.storage {
            Some(storage) => storage,
            None => PersistentStore::new(create_store(&config.storage)?),
        };
        let translations = Translations::new(BASE_LANGUAGE);
        let mut store = AppStore::new(storage, translations.clone())
            .with_toast_ttl(config.toast.ttl())
            .with_api_key_status(api_key_status);
        if let Some(target) = self.theme_target {
            store = store.with_theme_target(target);
        }
        let store = Arc::new(store);
        store.apply_theme_markers();

        // 3. Translations
        let source = match self.locale_source {
            Some(source) => source,
            None => create_locale_source(&config.locales)?,
        };
        let loader = TranslationLoader::new(source, translations).with_events(store.event_sender());
        let phase = loader.load_base().await;
        info!("Base translations settled ({:?})", phase);
        let loading = loader.spawn_remaining();

        Ok(App {
            config,
            store,
            generator,
            api_key_hint,
            loading: Some(loading),
        })
    }
}

/// A started application.
pub struct App {
    config: Config,
    store: Arc<AppStore>,
    generator: Option<Arc<dyn TextGenerator>>,
    api_key_hint: Option<String>,
    loading: Option<JoinHandle<()>>,
}

impl App {
    /// Start with everything built from `config`
    pub async fn start(config: Config, credential: Option<String>) -> anyhow::Result<App> {
        Startup::new(config).with_credential(credential).run().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<AppStore> {
        &self.store
    }

    /// Masked credential, when one is configured
    pub fn api_key_hint(&self) -> Option<&str> {
        self.api_key_hint.as_deref()
    }

    pub fn translation_phase(&self) -> LoaderPhase {
        self.store.translations().phase()
    }

    /// Wait until every language has been attempted
    pub async fn wait_for_translations(&mut self) -> LoaderPhase {
        if let Some(handle) = self.loading.take() {
            if let Err(e) = handle.await {
                error!("Translation loader task failed: {}", e);
            }
        }
        self.translation_phase()
    }

    pub fn discovery(&self) -> DiscoveryService {
        let service = DiscoveryService::new(self.store.clone());
        match &self.generator {
            Some(generator) => service.with_generator(generator.clone()),
            None => service,
        }
    }

    pub fn compare(&self) -> CompareService {
        CompareService::new(self.store.clone())
    }

    pub fn assistant(&self) -> AssistantSession {
        let session = AssistantSession::new(self.store.clone());
        match &self.generator {
            Some(generator) => session.with_generator(generator.clone()),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageDriver;
    use crate::i18n::{EmbeddedLocaleSource, LoadState};
    use crate::models::{Language, Theme};
    use crate::storage::keys;
    use crate::theme::DocumentClasses;
    use tempfile::TempDir;

    fn startup() -> Startup {
        Startup::new(Config::default()).with_storage(PersistentStore::in_memory())
    }

    #[tokio::test]
    async fn test_base_language_ready_after_start() {
        let app = startup().run().await.unwrap();

        assert_ne!(app.translation_phase(), LoaderPhase::Loading);
        assert_eq!(app.store().translations().state(Language::En), LoadState::Loaded);
        assert_eq!(app.store().translate("darkMode", &[]), "Dark");
    }

    #[tokio::test]
    async fn test_all_languages_load_eventually() {
        let mut app = startup()
            .with_locale_source(Arc::new(EmbeddedLocaleSource))
            .run()
            .await
            .unwrap();

        assert_eq!(app.wait_for_translations().await, LoaderPhase::Ready);
        for lang in Language::ALL {
            assert_eq!(app.store().translations().state(lang), LoadState::Loaded);
        }
    }

    #[tokio::test]
    async fn test_api_key_evaluation() {
        let missing = startup().run().await.unwrap();
        assert_eq!(missing.store().api_key_status(), ApiKeyStatus::Missing);
        assert!(missing.api_key_hint().is_none());

        let placeholder = startup()
            .with_credential(Some("YOUR_GEMINI_API_KEY".into()))
            .run()
            .await
            .unwrap();
        assert_eq!(placeholder.store().api_key_status(), ApiKeyStatus::Missing);

        let ok = startup()
            .with_credential(Some("AIzaSyExampleKey123".into()))
            .run()
            .await
            .unwrap();
        assert_eq!(ok.store().api_key_status(), ApiKeyStatus::Ok);
        assert_eq!(ok.api_key_hint(), Some("AIza...y123"));
    }

    #[tokio::test]
    async fn test_persisted_theme_is_applied() {
        let storage = PersistentStore::in_memory();
        storage.set(keys::THEME, &Theme::Dark);
        let doc = Arc::new(DocumentClasses::new());

        let app = Startup::new(Config::default())
            .with_storage(storage)
            .with_theme_target(doc.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(app.store().theme(), Theme::Dark);
        assert_eq!(doc.current(), Some(Theme::Dark));
        // Restoring the theme is not a change
        assert!(app.store().toasts().is_empty());
    }

    #[tokio::test]
    async fn test_file_storage_from_config() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.driver = StorageDriver::File;
        config.storage.path = dir.path().join("state.json");

        {
            let app = App::start(config.clone(), None).await.unwrap();
            app.store().set_language(Language::Nl);
        }

        let app = App::start(config, None).await.unwrap();
        assert_eq!(app.store().language(), Language::Nl);
    }
}
