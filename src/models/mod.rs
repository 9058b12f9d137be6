//! Data models
//!
//! This module contains the data structures shared by the state container,
//! the services and the persisted state layout:
//! - Persisted slices (Theme, Language, BrandPreferences, Influencer list,
//!   Notification list, UserProfile)
//! - Transient values (ToastMessage, ChatMessage, ApiKeyStatus)

mod api_key;
mod chat;
mod influencer;
mod language;
mod notification;
mod preferences;
mod theme;

pub use api_key::{ApiKeyStatus, API_KEY_PLACEHOLDER};
pub use chat::{ChatMessage, ChatSender};
pub use influencer::{
    AgeShare, AudienceDemographics, ContentExample, ContentKind, EngagementMetrics, GenderShare,
    Influencer, LocationShare, SocialPlatform, AVAILABLE_CATEGORIES,
};
pub use language::{Language, BASE_LANGUAGE};
pub use notification::{Notification, Severity, ToastMessage, MAX_NOTIFICATIONS};
pub use preferences::{BrandPreferences, UserProfile};
pub use theme::Theme;
