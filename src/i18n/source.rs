//! Translation resource sources
//!
//! Each supported language has one resource: a flat JSON object mapping
//! key to localized string, named `<code>.json`. Sources:
//! - Embedded - files under `locales/` compiled into the binary
//! - Directory - files read from disk at runtime
//! - Http - files fetched from a base URL

use anyhow::Context;
use async_trait::async_trait;
use rust_embed::RustEmbed;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::TranslationMap;
use crate::config::{LocaleSourceKind, LocalesConfig};
use crate::models::Language;

/// Errors fetching a translation resource
#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("No translation resource for '{0}'")]
    NotFound(Language),

    #[error("Failed to read translations for '{language}': {source}")]
    Io {
        language: Language,
        source: std::io::Error,
    },

    #[error("Failed to fetch translations for '{language}': {source}")]
    Http {
        language: Language,
        source: reqwest::Error,
    },

    #[error("Translation resource for '{language}' returned HTTP {status}")]
    Status { language: Language, status: u16 },

    #[error("Invalid translation resource for '{language}': {source}")]
    Parse {
        language: Language,
        source: serde_json::Error,
    },
}

/// Somewhere translation resources can be fetched from.
#[async_trait]
pub trait LocaleSource: Send + Sync {
    /// Fetch the full mapping for one language
    async fn fetch(&self, language: Language) -> Result<TranslationMap, LocaleError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

fn parse(language: Language, bytes: &[u8]) -> Result<TranslationMap, LocaleError> {
    serde_json::from_slice(bytes).map_err(|source| LocaleError::Parse { language, source })
}

#[derive(RustEmbed)]
#[folder = "locales/"]
#[include = "*.json"]
struct EmbeddedLocaleFiles;

/// Resources compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedLocaleSource;

#[async_trait]
impl LocaleSource for EmbeddedLocaleSource {
    async fn fetch(&self, language: Language) -> Result<TranslationMap, LocaleError> {
        let file = EmbeddedLocaleFiles::get(&format!("{}.json", language.code()))
            .ok_or(LocaleError::NotFound(language))?;
        parse(language, &file.data)
    }

    fn describe(&self) -> String {
        "embedded".to_string()
    }
}

/// Resources read from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryLocaleSource {
    dir: PathBuf,
}

impl DirectoryLocaleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl LocaleSource for DirectoryLocaleSource {
    async fn fetch(&self, language: Language) -> Result<TranslationMap, LocaleError> {
        let path = self.dir.join(format!("{}.json", language.code()));
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LocaleError::NotFound(language)
            } else {
                LocaleError::Io { language, source }
            }
        })?;
        parse(language, &bytes)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// Resources fetched over HTTP from `{base_url}/{code}.json`.
#[derive(Debug, Clone)]
pub struct HttpLocaleSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLocaleSource {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, language: Language) -> String {
        format!("{}/{}.json", self.base_url, language.code())
    }
}

#[async_trait]
impl LocaleSource for HttpLocaleSource {
    async fn fetch(&self, language: Language) -> Result<TranslationMap, LocaleError> {
        let response = self
            .client
            .get(self.url_for(language))
            .send()
            .await
            .map_err(|source| LocaleError::Http { language, source })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LocaleError::NotFound(language));
        }
        if !status.is_success() {
            return Err(LocaleError::Status {
                language,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| LocaleError::Http { language, source })?;
        parse(language, &bytes)
    }

    fn describe(&self) -> String {
        format!("http {}", self.base_url)
    }
}

/// Create a locale source based on configuration
pub fn create_locale_source(config: &LocalesConfig) -> anyhow::Result<Arc<dyn LocaleSource>> {
    match config.source {
        LocaleSourceKind::Embedded => Ok(Arc::new(EmbeddedLocaleSource)),
        LocaleSourceKind::Directory => Ok(Arc::new(DirectoryLocaleSource::new(&config.path))),
        LocaleSourceKind::Http => {
            let base_url = config
                .base_url
                .as_deref()
                .context("locales.base_url is required for the http locale source")?;
            Ok(Arc::new(HttpLocaleSource::new(base_url)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_embedded_source_has_every_language() {
        let source = EmbeddedLocaleSource;
        for lang in Language::ALL {
            let mapping = source.fetch(lang).await.unwrap();
            assert!(
                mapping.contains_key("languageChangedTo"),
                "{} is missing languageChangedTo",
                lang
            );
            assert!(mapping.contains_key(&lang.name_key()));
        }
    }

    #[tokio::test]
    async fn test_embedded_base_has_every_key_of_other_languages() {
        let source = EmbeddedLocaleSource;
        let base = source.fetch(Language::En).await.unwrap();
        for lang in Language::ALL.into_iter().filter(|l| !l.is_base()) {
            let mapping = source.fetch(lang).await.unwrap();
            for key in mapping.keys() {
                assert!(base.contains_key(key), "{} has key '{}' missing from en", lang, key);
            }
        }
    }

    #[tokio::test]
    async fn test_directory_source_reads_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nl.json"), r#"{"save": "Opslaan"}"#).unwrap();
        let source = DirectoryLocaleSource::new(dir.path());

        let mapping = source.fetch(Language::Nl).await.unwrap();
        assert_eq!(mapping.get("save").map(String::as_str), Some("Opslaan"));

        let missing = source.fetch(Language::Es).await;
        assert!(matches!(missing, Err(LocaleError::NotFound(Language::Es))));
    }

    #[tokio::test]
    async fn test_directory_source_rejects_nested_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("fr.json"), r#"{"menu": {"save": "x"}}"#).unwrap();
        let source = DirectoryLocaleSource::new(dir.path());

        let result = source.fetch(Language::Fr).await;
        assert!(matches!(result, Err(LocaleError::Parse { .. })));
    }

    #[test]
    fn test_http_source_url() {
        let source = HttpLocaleSource::with_client(reqwest::Client::new(), "https://cdn.test/locales/");
        assert_eq!(source.url_for(Language::Ta), "https://cdn.test/locales/ta.json");
    }

    #[test]
    fn test_create_http_source_requires_base_url() {
        let config = LocalesConfig {
            source: LocaleSourceKind::Http,
            ..LocalesConfig::default()
        };
        assert!(create_locale_source(&config).is_err());
    }
}
