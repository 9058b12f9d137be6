//! Pure state transitions
//!
//! [`AppSnapshot::apply`] computes the next state and the list of effects a
//! change implies, without touching storage, the theme target or the toast
//! queue. The store commits the state and then runs the effects in order.

use serde::{Deserialize, Serialize};

use crate::models::{
    BrandPreferences, Influencer, Language, Notification, Severity, Theme, UserProfile,
    MAX_NOTIFICATIONS,
};
use crate::storage::keys;

/// The persisted part of the application state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub theme: Theme,
    pub language: Language,
    pub brand_preferences: BrandPreferences,
    pub saved_influencers: Vec<Influencer>,
    /// Newest first, at most [`MAX_NOTIFICATIONS`]
    pub notifications: Vec<Notification>,
    pub user_profile: Option<UserProfile>,
}

/// A requested change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTheme(Theme),
    SetLanguage(Language),
    SetBrandPreferences(BrandPreferences),
    SaveInfluencer(Influencer),
    RemoveInfluencer(String),
    AddNotification(Notification),
    ClearNotification(String),
    MarkNotificationRead(String),
    ClearAllNotifications,
    /// `None` resets the profile
    SetUserProfile(Option<UserProfile>),
}

/// A persisted slice of [`AppSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Theme,
    Language,
    BrandPreferences,
    SavedInfluencers,
    Notifications,
    UserProfile,
}

impl Slice {
    /// Storage key the slice lives under
    pub fn key(&self) -> &'static str {
        match self {
            Slice::Theme => keys::THEME,
            Slice::Language => keys::LANGUAGE,
            Slice::BrandPreferences => keys::BRAND_PREFERENCES,
            Slice::SavedInfluencers => keys::SAVED_INFLUENCERS,
            Slice::Notifications => keys::NOTIFICATIONS,
            Slice::UserProfile => keys::USER_PROFILE,
        }
    }
}

/// Toast content, localized when the effect runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastText {
    ThemeChanged(Theme),
    LanguageChanged(Language),
    PreferencesSaved,
    InfluencerSaved(String),
    InfluencerRemoved(String),
}

/// Side effect of a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Persist(Slice),
    ApplyTheme(Theme),
    Toast { kind: Severity, text: ToastText },
}

/// Result of applying an [`Action`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppSnapshot,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: AppSnapshot) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    /// Whether the transition does anything at all
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

impl AppSnapshot {
    pub fn is_influencer_saved(&self, id: &str) -> bool {
        self.saved_influencers.iter().any(|i| i.id == id)
    }

    /// Compute the state after `action` and the effects it implies.
    pub fn apply(&self, action: Action) -> Transition {
        let mut state = self.clone();

        let effects = match action {
            Action::SetTheme(theme) => {
                state.theme = theme;
                vec![
                    Effect::Persist(Slice::Theme),
                    Effect::ApplyTheme(theme),
                    Effect::Toast {
                        kind: Severity::Info,
                        text: ToastText::ThemeChanged(theme),
                    },
                ]
            }
            Action::SetLanguage(language) => {
                let changed = state.language != language;
                state.language = language;
                let mut effects = vec![Effect::Persist(Slice::Language)];
                if changed {
                    effects.push(Effect::Toast {
                        kind: Severity::Info,
                        text: ToastText::LanguageChanged(language),
                    });
                }
                effects
            }
            Action::SetBrandPreferences(preferences) => {
                state.brand_preferences = preferences;
                vec![
                    Effect::Persist(Slice::BrandPreferences),
                    Effect::Toast {
                        kind: Severity::Success,
                        text: ToastText::PreferencesSaved,
                    },
                ]
            }
            Action::SaveInfluencer(influencer) => {
                if self.is_influencer_saved(&influencer.id) {
                    return Transition::unchanged(state);
                }
                let name = influencer.name.clone();
                state.saved_influencers.push(influencer);
                vec![
                    Effect::Persist(Slice::SavedInfluencers),
                    Effect::Toast {
                        kind: Severity::Success,
                        text: ToastText::InfluencerSaved(name),
                    },
                ]
            }
            Action::RemoveInfluencer(id) => {
                let Some(pos) = state.saved_influencers.iter().position(|i| i.id == id) else {
                    return Transition::unchanged(state);
                };
                let removed = state.saved_influencers.remove(pos);
                vec![
                    Effect::Persist(Slice::SavedInfluencers),
                    Effect::Toast {
                        kind: Severity::Info,
                        text: ToastText::InfluencerRemoved(removed.name),
                    },
                ]
            }
            Action::AddNotification(notification) => {
                state.notifications.insert(0, notification);
                state.notifications.truncate(MAX_NOTIFICATIONS);
                vec![Effect::Persist(Slice::Notifications)]
            }
            Action::ClearNotification(id) => {
                state.notifications.retain(|n| n.id != id);
                vec![Effect::Persist(Slice::Notifications)]
            }
            Action::MarkNotificationRead(id) => {
                for n in state.notifications.iter_mut().filter(|n| n.id == id) {
                    n.read = true;
                }
                vec![Effect::Persist(Slice::Notifications)]
            }
            Action::ClearAllNotifications => {
                state.notifications.clear();
                vec![Effect::Persist(Slice::Notifications)]
            }
            Action::SetUserProfile(profile) => {
                state.user_profile = profile;
                vec![Effect::Persist(Slice::UserProfile)]
            }
        };

        Transition { state, effects }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SocialPlatform;

    fn influencer(id: &str, name: &str) -> Influencer {
        Influencer::new(id, name, SocialPlatform::Instagram, "10K", "3.1%", "Travel")
    }

    fn toasts(effects: &[Effect]) -> Vec<&ToastText> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Toast { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_set_theme_persists_applies_and_toasts() {
        let t = AppSnapshot::default().apply(Action::SetTheme(Theme::Dark));
        assert_eq!(t.state.theme, Theme::Dark);
        assert_eq!(
            t.effects,
            vec![
                Effect::Persist(Slice::Theme),
                Effect::ApplyTheme(Theme::Dark),
                Effect::Toast {
                    kind: Severity::Info,
                    text: ToastText::ThemeChanged(Theme::Dark)
                },
            ]
        );
    }

    #[test]
    fn test_same_language_has_no_toast() {
        let t = AppSnapshot::default().apply(Action::SetLanguage(Language::En));
        assert_eq!(t.effects, vec![Effect::Persist(Slice::Language)]);
    }

    #[test]
    fn test_new_language_has_one_toast() {
        let t = AppSnapshot::default().apply(Action::SetLanguage(Language::Fr));
        assert_eq!(t.state.language, Language::Fr);
        assert_eq!(toasts(&t.effects), vec![&ToastText::LanguageChanged(Language::Fr)]);
    }

    #[test]
    fn test_duplicate_save_is_noop() {
        let state = AppSnapshot::default()
            .apply(Action::SaveInfluencer(influencer("a", "Ana")))
            .state;
        let t = state.apply(Action::SaveInfluencer(influencer("a", "Other name")));
        assert!(t.is_noop());
        assert_eq!(t.state, state);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let t = AppSnapshot::default().apply(Action::RemoveInfluencer("ghost".into()));
        assert!(t.is_noop());
    }

    #[test]
    fn test_remove_names_the_influencer() {
        let state = AppSnapshot::default()
            .apply(Action::SaveInfluencer(influencer("a", "Ana")))
            .state
            .apply(Action::SaveInfluencer(influencer("b", "Ben")))
            .state;
        let t = state.apply(Action::RemoveInfluencer("a".into()));

        let ids: Vec<_> = t.state.saved_influencers.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(toasts(&t.effects), vec![&ToastText::InfluencerRemoved("Ana".into())]);
    }

    #[test]
    fn test_mark_read_only_touches_match() {
        let first = Notification::new("one", Severity::Info);
        let second = Notification::new("two", Severity::Info);
        let state = AppSnapshot::default()
            .apply(Action::AddNotification(first.clone()))
            .state
            .apply(Action::AddNotification(second.clone()))
            .state;

        let t = state.apply(Action::MarkNotificationRead(first.id.clone()));
        assert_eq!(t.state.notifications[0].id, second.id);
        assert!(!t.state.notifications[0].read);
        assert!(t.state.notifications[1].read);
    }

    #[test]
    fn test_user_profile_has_no_toast() {
        let t = AppSnapshot::default().apply(Action::SetUserProfile(Some(UserProfile::default())));
        assert_eq!(t.effects, vec![Effect::Persist(Slice::UserProfile)]);
        assert!(t.state.user_profile.is_some());

        let t = t.state.apply(Action::SetUserProfile(None));
        assert_eq!(t.effects, vec![Effect::Persist(Slice::UserProfile)]);
        assert!(t.state.user_profile.is_none());
    }

    #[test]
    fn test_slice_keys_are_distinct() {
        let slices = [
            Slice::Theme,
            Slice::Language,
            Slice::BrandPreferences,
            Slice::SavedInfluencers,
            Slice::Notifications,
            Slice::UserProfile,
        ];
        let keys: std::collections::HashSet<_> = slices.iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), slices.len());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::SocialPlatform;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[derive(Debug, Clone)]
    enum Op {
        Save(u8),
        Remove(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Save),
            (0u8..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The saved list never holds duplicate ids and tracks exactly the
        /// ids added and not yet removed.
        #[test]
        fn prop_saved_list_matches_model(ops in prop::collection::vec(op_strategy(), 0..60)) {
            let mut state = AppSnapshot::default();
            let mut model = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Save(n) => {
                        let id = format!("inf-{}", n);
                        let item = Influencer::new(&id, "x", SocialPlatform::TikTok, "1K", "1%", "Food");
                        state = state.apply(Action::SaveInfluencer(item)).state;
                        model.insert(id);
                    }
                    Op::Remove(n) => {
                        let id = format!("inf-{}", n);
                        state = state.apply(Action::RemoveInfluencer(id.clone())).state;
                        model.remove(&id);
                    }
                }
            }

            let ids: Vec<_> = state.saved_influencers.iter().map(|i| i.id.clone()).collect();
            let unique: BTreeSet<_> = ids.iter().cloned().collect();
            prop_assert_eq!(ids.len(), unique.len());
            prop_assert_eq!(&unique, &model);
            for n in 0u8..8 {
                let id = format!("inf-{}", n);
                prop_assert_eq!(state.is_influencer_saved(&id), model.contains(&id));
            }
        }

        /// Notifications are capped and keep the newest entries first.
        #[test]
        fn prop_notifications_capped(count in 0usize..60) {
            let mut state = AppSnapshot::default();
            for i in 0..count {
                let n = Notification::new(format!("n{}", i), Severity::Info);
                state = state.apply(Action::AddNotification(n)).state;
            }

            prop_assert_eq!(state.notifications.len(), count.min(MAX_NOTIFICATIONS));
            if count > 0 {
                let newest = format!("n{}", count - 1);
                prop_assert_eq!(&state.notifications[0].message, &newest);
            }
        }
    }
}
