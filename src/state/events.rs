//! Events broadcast by the store after each committed change

use crate::models::{ApiKeyStatus, Language, Theme};

/// Something observable changed.
///
/// Events carry only what changed; subscribers read the rest from the
/// store.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    ThemeChanged(Theme),
    LanguageChanged(Language),
    BrandPreferencesChanged,
    SavedInfluencersChanged,
    NotificationsChanged,
    ToastsChanged,
    UserProfileChanged,
    ApiKeyStatusChanged(ApiKeyStatus),
    /// A language's translations settled, loaded or failed
    TranslationsUpdated(Language),
}
