//! Language model
//!
//! Supported UI languages and their native display names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported UI language, identified by its locale code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (base language)
    #[default]
    En,
    /// Hindi
    Hi,
    /// Tamil
    Ta,
    /// French
    Fr,
    /// Dutch
    Nl,
    /// Spanish
    Es,
}

/// Language whose mapping backs every other language.
pub const BASE_LANGUAGE: Language = Language::En;

impl Language {
    /// All supported languages, base language first.
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Hi,
        Language::Ta,
        Language::Fr,
        Language::Nl,
        Language::Es,
    ];

    /// Locale code, e.g. `"fr"`
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Ta => "ta",
            Language::Fr => "fr",
            Language::Nl => "nl",
            Language::Es => "es",
        }
    }

    /// Name of the language written in that language
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिन्दी",
            Language::Ta => "தமிழ்",
            Language::Fr => "Français",
            Language::Nl => "Nederlands",
            Language::Es => "Español",
        }
    }

    /// Translation key holding the display name of this language
    pub fn name_key(&self) -> String {
        format!("languageName.{}", self.code())
    }

    /// Whether this is the base language
    pub fn is_base(&self) -> bool {
        *self == BASE_LANGUAGE
    }

    /// Resolve a BCP 47 style tag (`"fr-FR"`, `"nl"`) to a supported language.
    ///
    /// Only the primary subtag is considered.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        primary.parse().ok()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "hi" => Ok(Language::Hi),
            "ta" => Ok(Language::Ta),
            "fr" => Ok(Language::Fr),
            "nl" => Ok(Language::Nl),
            "es" => Ok(Language::Es),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trips_through_from_str() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_serde_uses_lowercase_code() {
        assert_eq!(serde_json::to_string(&Language::Nl).unwrap(), "\"nl\"");
        let lang: Language = serde_json::from_str("\"ta\"").unwrap();
        assert_eq!(lang, Language::Ta);
    }

    #[test]
    fn test_from_tag_uses_primary_subtag() {
        assert_eq!(Language::from_tag("fr-FR"), Some(Language::Fr));
        assert_eq!(Language::from_tag("es_MX"), Some(Language::Es));
        assert_eq!(Language::from_tag("de-DE"), None);
        assert_eq!(Language::from_tag(""), None);
    }

    #[test]
    fn test_base_language_is_first() {
        assert_eq!(Language::ALL[0], BASE_LANGUAGE);
        assert!(Language::En.is_base());
        assert!(!Language::Hi.is_base());
    }
}
