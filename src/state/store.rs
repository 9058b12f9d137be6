//! Application store
//!
//! Owns the application state and runs the effects of every change:
//! persistence, theme markers and toasts. Changes are announced on a
//! broadcast channel so front ends can re-render.

use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::toast::{ToastQueue, DEFAULT_TOAST_TTL};
use super::transition::{Action, AppSnapshot, Effect, Slice, ToastText};
use super::StateEvent;
use crate::i18n::{interpolate, Translations};
use crate::models::{
    ApiKeyStatus, BrandPreferences, Influencer, Language, Notification, Severity, Theme,
    ToastMessage, UserProfile, MAX_NOTIFICATIONS,
};
use crate::storage::{keys, PersistentStore};
use crate::theme::{DocumentClasses, ThemeTarget};

const EVENT_CAPACITY: usize = 64;

/// Used when no translation of `languageChangedTo` is available at all
const LANGUAGE_CHANGED_FALLBACK: &str = "Language changed to {{languageName}}";

/// The shared application state container.
///
/// Every mutator runs to completion under the state lock, so the state,
/// its persisted copy and any toast it raises are all visible as soon as
/// the call returns. Theme targets must not call back into the store.
pub struct AppStore {
    state: RwLock<AppSnapshot>,
    storage: PersistentStore,
    translations: Translations,
    toasts: ToastQueue,
    api_key_status: RwLock<ApiKeyStatus>,
    theme_target: Arc<dyn ThemeTarget>,
    events: broadcast::Sender<StateEvent>,
}

impl AppStore {
    /// Create a store from whatever `storage` holds. Slices that are absent
    /// or cannot be decoded start from their defaults.
    pub fn new(storage: PersistentStore, translations: Translations) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = load_snapshot(&storage);
        info!(
            "Loaded state: theme={}, language={}, {} saved influencers, {} notifications",
            state.theme,
            state.language,
            state.saved_influencers.len(),
            state.notifications.len()
        );

        Self {
            state: RwLock::new(state),
            storage,
            translations,
            toasts: ToastQueue::with_events(DEFAULT_TOAST_TTL, events.clone()),
            api_key_status: RwLock::new(ApiKeyStatus::default()),
            theme_target: Arc::new(DocumentClasses::new()),
            events,
        }
    }

    pub fn with_toast_ttl(mut self, ttl: Duration) -> Self {
        self.toasts = ToastQueue::with_events(ttl, self.events.clone());
        self
    }

    pub fn with_api_key_status(self, status: ApiKeyStatus) -> Self {
        *self.api_key_status.write().unwrap_or_else(|e| e.into_inner()) = status;
        self
    }

    pub fn with_theme_target(mut self, target: Arc<dyn ThemeTarget>) -> Self {
        self.theme_target = target;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, AppSnapshot> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `action`, commit the new state and run its effects in order.
    pub fn dispatch(&self, action: Action) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let transition = state.apply(action);
        if transition.is_noop() {
            return;
        }
        *state = transition.state;

        let mut events = Vec::new();
        for effect in transition.effects {
            match effect {
                Effect::Persist(slice) => {
                    self.persist(slice, &state);
                    events.push(slice_event(slice, &state));
                }
                Effect::ApplyTheme(theme) => self.theme_target.apply_theme(theme),
                Effect::Toast { kind, text } => {
                    let message = self.localize(state.language, &text);
                    self.toasts.push(message, kind);
                }
            }
        }
        drop(state);

        for event in events {
            self.emit(event);
        }
    }

    fn persist(&self, slice: Slice, state: &AppSnapshot) {
        let key = slice.key();
        match slice {
            Slice::Theme => self.storage.set(key, &state.theme),
            Slice::Language => self.storage.set(key, &state.language),
            Slice::BrandPreferences => self.storage.set(key, &state.brand_preferences),
            Slice::SavedInfluencers => self.storage.set(key, &state.saved_influencers),
            Slice::Notifications => self.storage.set(key, &state.notifications),
            Slice::UserProfile => self.storage.set(key, &state.user_profile),
        }
    }

    fn localize(&self, active: Language, text: &ToastText) -> String {
        let catalog = self.translations.read();
        match text {
            ToastText::ThemeChanged(theme) => {
                let theme_name = catalog.translate(active, theme.label_key(), &[]);
                catalog.translate(active, "themeChangedTo", &[("theme", theme_name.as_str())])
            }
            ToastText::LanguageChanged(language) => {
                let base = catalog.base();
                let name_key = language.name_key();
                let name = catalog
                    .lookup(*language, &name_key)
                    .or_else(|| catalog.lookup(base, &name_key))
                    .unwrap_or_else(|| language.native_name());
                let template = catalog
                    .lookup(*language, "languageChangedTo")
                    .or_else(|| catalog.lookup(base, "languageChangedTo"))
                    .unwrap_or(LANGUAGE_CHANGED_FALLBACK);
                interpolate(template, &[("languageName", name)])
            }
            ToastText::PreferencesSaved => catalog.translate(active, "preferencesSaved", &[]),
            ToastText::InfluencerSaved(name) => {
                catalog.translate(active, "influencerSaved", &[("name", name.as_str())])
            }
            ToastText::InfluencerRemoved(name) => {
                catalog.translate(active, "influencerRemoved", &[("name", name.as_str())])
            }
        }
    }

    fn emit(&self, event: StateEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    /// Receive every change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Sender for collaborators that announce their own changes
    pub fn event_sender(&self) -> broadcast::Sender<StateEvent> {
        self.events.clone()
    }

    /// Copy of the persisted part of the state
    pub fn snapshot(&self) -> AppSnapshot {
        self.read().clone()
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Translate `key` in the active language.
    pub fn translate(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        let active = self.language();
        self.translations.translate(active, key, replacements)
    }

    // Theme

    pub fn theme(&self) -> Theme {
        self.read().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        self.dispatch(Action::SetTheme(theme));
    }

    /// Push the current theme to the theme target without changing it
    pub fn apply_theme_markers(&self) {
        let theme = self.theme();
        debug!("Applying persisted {} theme", theme);
        self.theme_target.apply_theme(theme);
    }

    // Language

    pub fn language(&self) -> Language {
        self.read().language
    }

    pub fn set_language(&self, language: Language) {
        self.dispatch(Action::SetLanguage(language));
    }

    // Brand preferences

    pub fn brand_preferences(&self) -> BrandPreferences {
        self.read().brand_preferences.clone()
    }

    pub fn set_brand_preferences(&self, preferences: BrandPreferences) {
        self.dispatch(Action::SetBrandPreferences(preferences));
    }

    // Saved influencers

    pub fn saved_influencers(&self) -> Vec<Influencer> {
        self.read().saved_influencers.clone()
    }

    /// Save `influencer` unless one with the same id is already saved
    pub fn add_saved_influencer(&self, influencer: Influencer) {
        self.dispatch(Action::SaveInfluencer(influencer));
    }

    pub fn remove_saved_influencer(&self, id: &str) {
        self.dispatch(Action::RemoveInfluencer(id.to_string()));
    }

    pub fn is_influencer_saved(&self, id: &str) -> bool {
        self.read().is_influencer_saved(id)
    }

    // Notifications

    pub fn notifications(&self) -> Vec<Notification> {
        self.read().notifications.clone()
    }

    /// Add an unread notification stamped now. Returns its id.
    pub fn add_notification(&self, message: impl Into<String>, kind: Severity) -> String {
        let notification = Notification::new(message, kind);
        let id = notification.id.clone();
        self.dispatch(Action::AddNotification(notification));
        id
    }

    pub fn clear_notification(&self, id: &str) {
        self.dispatch(Action::ClearNotification(id.to_string()));
    }

    pub fn mark_notification_read(&self, id: &str) {
        self.dispatch(Action::MarkNotificationRead(id.to_string()));
    }

    pub fn clear_all_notifications(&self) {
        self.dispatch(Action::ClearAllNotifications);
    }

    // Toasts

    pub fn toasts(&self) -> Vec<ToastMessage> {
        self.toasts.active()
    }

    /// Show a toast. Returns its id.
    pub fn add_toast(&self, message: impl Into<String>, kind: Severity) -> String {
        self.toasts.push(message, kind)
    }

    /// Dismiss a toast; unknown ids are ignored
    pub fn remove_toast(&self, id: &str) -> bool {
        self.toasts.dismiss(id)
    }

    // API key

    pub fn api_key_status(&self) -> ApiKeyStatus {
        *self.api_key_status.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_api_key_status(&self, status: ApiKeyStatus) {
        *self.api_key_status.write().unwrap_or_else(|e| e.into_inner()) = status;
        self.emit(StateEvent::ApiKeyStatusChanged(status));
    }

    // User profile

    pub fn user_profile(&self) -> Option<UserProfile> {
        self.read().user_profile.clone()
    }

    /// Replace the profile; `None` resets it
    pub fn set_user_profile(&self, profile: Option<UserProfile>) {
        self.dispatch(Action::SetUserProfile(profile));
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &*self.read())
            .field("api_key_status", &self.api_key_status())
            .finish_non_exhaustive()
    }
}

fn slice_event(slice: Slice, state: &AppSnapshot) -> StateEvent {
    match slice {
        Slice::Theme => StateEvent::ThemeChanged(state.theme),
        Slice::Language => StateEvent::LanguageChanged(state.language),
        Slice::BrandPreferences => StateEvent::BrandPreferencesChanged,
        Slice::SavedInfluencers => StateEvent::SavedInfluencersChanged,
        Slice::Notifications => StateEvent::NotificationsChanged,
        Slice::UserProfile => StateEvent::UserProfileChanged,
    }
}

fn load_snapshot(storage: &PersistentStore) -> AppSnapshot {
    let mut saved_influencers: Vec<Influencer> = storage.get(keys::SAVED_INFLUENCERS, Vec::new());
    let mut seen = std::collections::HashSet::new();
    saved_influencers.retain(|i| seen.insert(i.id.clone()));

    let mut notifications: Vec<Notification> = storage.get(keys::NOTIFICATIONS, Vec::new());
    notifications.truncate(MAX_NOTIFICATIONS);

    AppSnapshot {
        theme: storage.get(keys::THEME, Theme::default()),
        language: storage.get(keys::LANGUAGE, Language::default()),
        brand_preferences: storage.get(keys::BRAND_PREFERENCES, BrandPreferences::default()),
        saved_influencers,
        notifications,
        user_profile: storage.get(keys::USER_PROFILE, None),
    }
}
