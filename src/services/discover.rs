//! Influencer discovery
//!
//! Searches the built-in catalogue, or asks the AI service for suggestions
//! when requested and a key is configured. AI failures fall back to the
//! catalogue and are reported as toasts.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::mock_data::mock_influencers;
use crate::ai::{parse_json_reply, GenerateRequest, TextGenerator};
use crate::models::{BrandPreferences, Influencer, Severity, SocialPlatform};
use crate::state::AppStore;

/// What to search for.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchCriteria {
    /// Matched against influencer names
    pub term: String,
    pub platform: Option<SocialPlatform>,
    /// Matched against niches
    pub category: Option<String>,
    pub use_ai: bool,
}

impl SearchCriteria {
    /// Criteria prefilled from the brand preferences: all audience keywords,
    /// the first preferred platform and the first preferred category.
    pub fn from_preferences(preferences: &BrandPreferences) -> Self {
        Self {
            term: preferences.target_audience_keywords.join(", "),
            platform: preferences.preferred_platforms.first().copied(),
            category: preferences.preferred_categories.first().cloned(),
            use_ai: false,
        }
    }

    pub fn with_ai(mut self, use_ai: bool) -> Self {
        self.use_ai = use_ai;
        self
    }

    /// Whether `influencer` passes the catalogue filter
    pub fn matches(&self, influencer: &Influencer) -> bool {
        let term = self.term.to_lowercase();
        influencer.name.to_lowercase().contains(&term)
            && self.platform.map_or(true, |p| influencer.platform == p)
            && self.category.as_deref().map_or(true, |c| {
                influencer.niche.to_lowercase().contains(&c.to_lowercase())
            })
    }

    /// Prompt asking the AI service for matching influencers as JSON
    pub fn prompt(&self) -> String {
        let audience = if self.term.trim().is_empty() {
            "general audience"
        } else {
            self.term.trim()
        };
        let category = self.category.as_deref().unwrap_or("any category");
        let platform = self
            .platform
            .map(|p| p.to_string())
            .unwrap_or_else(|| "any platform".to_string());
        let platforms: Vec<String> = SocialPlatform::ALL.iter().map(|p| p.to_string()).collect();

        format!(
            "Suggest 3 to 5 social media influencers for a brand targeting '{audience}', \
             interested in '{category}', on '{platform}'. \
             Reply with a JSON array only. Each element must have the fields \
             \"id\", \"name\", \"platform\" (one of {platforms}), \"followers\" (e.g. \"1.5M\"), \
             \"engagementRate\" (e.g. \"2.5%\"), \"niche\", \"profilePictureUrl\", \
             \"samplePostIdea\" and \"isVerified\" (boolean). Escape quotes and newlines \
             inside string values.",
            platforms = platforms.join(", ")
        )
    }
}

/// Where results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Catalogue,
    Ai,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<Influencer>,
    pub source: ResultSource,
}

/// Discovery search against the store.
pub struct DiscoveryService {
    store: Arc<AppStore>,
    generator: Option<Arc<dyn TextGenerator>>,
    catalogue: Vec<Influencer>,
}

impl DiscoveryService {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self {
            store,
            generator: None,
            catalogue: mock_influencers(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_catalogue(mut self, catalogue: Vec<Influencer>) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// Default criteria for the current brand preferences
    pub fn default_criteria(&self) -> SearchCriteria {
        SearchCriteria::from_preferences(&self.store.brand_preferences())
    }

    /// Catalogue entries matching `criteria`, in catalogue order
    pub fn filter_catalogue(&self, criteria: &SearchCriteria) -> Vec<Influencer> {
        self.catalogue
            .iter()
            .filter(|i| criteria.matches(i))
            .cloned()
            .collect()
    }

    /// Run a search. Never fails; problems are reported as toasts and the
    /// catalogue is searched instead.
    pub async fn search(&self, criteria: &SearchCriteria) -> SearchOutcome {
        if criteria.use_ai {
            match (&self.generator, self.store.api_key_status().is_ok()) {
                (Some(generator), true) => return self.search_ai(generator.as_ref(), criteria).await,
                _ => {
                    self.toast("apiKeyMissingAI", Severity::Warning);
                }
            }
        }

        SearchOutcome {
            results: self.filter_catalogue(criteria),
            source: ResultSource::Catalogue,
        }
    }

    async fn search_ai(&self, generator: &dyn TextGenerator, criteria: &SearchCriteria) -> SearchOutcome {
        let reply = generator.generate(GenerateRequest::json(criteria.prompt())).await;
        let parsed = reply.and_then(|text| parse_json_reply::<Vec<Influencer>>(&text));

        match parsed {
            Ok(mut results) => {
                for influencer in &mut results {
                    fill_missing_fields(influencer);
                }
                info!("AI suggested {} influencers", results.len());
                self.toast("aiSuggestionsLoaded", Severity::Success);
                SearchOutcome {
                    results,
                    source: ResultSource::Ai,
                }
            }
            Err(e) => {
                warn!("AI search failed: {}", e);
                self.toast("aiSearchFailed", Severity::Error);
                SearchOutcome {
                    results: self.filter_catalogue(criteria),
                    source: ResultSource::Catalogue,
                }
            }
        }
    }

    /// Save `influencer`, or remove it if already saved. Returns whether it
    /// is saved afterwards.
    pub fn toggle_saved(&self, influencer: &Influencer) -> bool {
        if self.store.is_influencer_saved(&influencer.id) {
            self.store.remove_saved_influencer(&influencer.id);
            false
        } else {
            self.store.add_saved_influencer(influencer.clone());
            true
        }
    }

    fn toast(&self, key: &str, kind: Severity) {
        let message = self.store.translate(key, &[]);
        self.store.add_toast(message, kind);
    }
}

fn fill_missing_fields(influencer: &mut Influencer) {
    if influencer.id.trim().is_empty() {
        influencer.id = Uuid::new_v4().simple().to_string();
    }
    if influencer.profile_picture_url.trim().is_empty() {
        influencer.profile_picture_url = format!("https://i.pravatar.cc/300?u={}", influencer.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use crate::i18n::Translations;
    use crate::models::{ApiKeyStatus, Language};
    use crate::storage::PersistentStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Generator returning a canned reply and recording prompts
    struct FakeGenerator {
        reply: Result<String, String>,
        prompts: Mutex<Vec<GenerateRequest>>,
    }

    impl FakeGenerator {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("boom".to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, request: GenerateRequest) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(AiError::Api {
                    status: 500,
                    message: message.clone(),
                }),
            }
        }
    }

    fn store(status: ApiKeyStatus) -> Arc<AppStore> {
        // No translations loaded, so toasts carry their keys
        Arc::new(
            AppStore::new(PersistentStore::in_memory(), Translations::new(Language::En))
                .with_api_key_status(status),
        )
    }

    fn toast_messages(store: &AppStore) -> Vec<(String, Severity)> {
        store
            .toasts()
            .into_iter()
            .map(|t| (t.message, t.kind))
            .collect()
    }

    #[test]
    fn test_criteria_from_preferences() {
        let preferences = BrandPreferences {
            brand_name: "Acme".into(),
            target_audience_keywords: vec!["gen z".into(), "students".into()],
            preferred_categories: vec!["Tech".into(), "Gaming".into()],
            preferred_platforms: vec![SocialPlatform::YouTube, SocialPlatform::TikTok],
        };
        let criteria = SearchCriteria::from_preferences(&preferences);
        assert_eq!(criteria.term, "gen z, students");
        assert_eq!(criteria.platform, Some(SocialPlatform::YouTube));
        assert_eq!(criteria.category.as_deref(), Some("Tech"));
        assert!(!criteria.use_ai);
    }

    #[test]
    fn test_catalogue_filter() {
        let service = DiscoveryService::new(store(ApiKeyStatus::Missing));

        let all = service.filter_catalogue(&SearchCriteria::default());
        assert_eq!(all.len(), 5);

        let by_name = service.filter_catalogue(&SearchCriteria {
            term: "ALICE".into(),
            ..SearchCriteria::default()
        });
        assert_eq!(by_name.len(), 1);

        let by_platform = service.filter_catalogue(&SearchCriteria {
            platform: Some(SocialPlatform::Instagram),
            ..SearchCriteria::default()
        });
        let names: Vec<_> = by_platform.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Alice Wonderland", "Edward Scissorhands"]);

        let by_category = service.filter_catalogue(&SearchCriteria {
            category: Some("design".into()),
            ..SearchCriteria::default()
        });
        assert_eq!(by_category[0].id, "5");
    }

    #[tokio::test]
    async fn test_plain_search_has_no_toast() {
        let store = store(ApiKeyStatus::Ok);
        let service = DiscoveryService::new(store.clone());

        let outcome = service.search(&SearchCriteria::default()).await;

        assert_eq!(outcome.source, ResultSource::Catalogue);
        assert_eq!(outcome.results.len(), 5);
        assert!(store.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_ai_without_key_warns_and_uses_catalogue() {
        let store = store(ApiKeyStatus::Missing);
        let generator = FakeGenerator::ok("[]");
        let service = DiscoveryService::new(store.clone()).with_generator(generator.clone());

        let outcome = service.search(&SearchCriteria::default().with_ai(true)).await;

        assert_eq!(outcome.source, ResultSource::Catalogue);
        assert_eq!(
            toast_messages(&store),
            vec![("apiKeyMissingAI".to_string(), Severity::Warning)]
        );
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ai_results_are_completed() {
        let store = store(ApiKeyStatus::Ok);
        let reply = r#"```json
[
  {"id": "", "name": "Ada Codes", "platform": "YouTube", "followers": "300K",
   "engagementRate": "6.0%", "niche": "Tech", "isVerified": true},
  {"id": "x1", "name": "Lin Eats", "platform": "TikTok", "followers": "1M",
   "engagementRate": "8.2%", "niche": "Food", "profilePictureUrl": "https://img.test/lin"}
]
```"#;
        let generator = FakeGenerator::ok(reply);
        let service = DiscoveryService::new(store.clone()).with_generator(generator.clone());

        let outcome = service.search(&SearchCriteria::default().with_ai(true)).await;

        assert_eq!(outcome.source, ResultSource::Ai);
        assert_eq!(outcome.results.len(), 2);
        assert!(!outcome.results[0].id.is_empty());
        assert!(outcome.results[0].profile_picture_url.contains(&outcome.results[0].id));
        assert_eq!(outcome.results[1].profile_picture_url, "https://img.test/lin");
        assert_eq!(
            toast_messages(&store),
            vec![("aiSuggestionsLoaded".to_string(), Severity::Success)]
        );

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts[0].format, crate::ai::ResponseFormat::Json);
        assert!(prompts[0].prompt.contains("general audience"));
    }

    #[tokio::test]
    async fn test_ai_failure_falls_back() {
        let store = store(ApiKeyStatus::Ok);
        let service = DiscoveryService::new(store.clone()).with_generator(FakeGenerator::failing());
        let criteria = SearchCriteria {
            term: "bob".into(),
            use_ai: true,
            ..SearchCriteria::default()
        };

        let outcome = service.search(&criteria).await;

        assert_eq!(outcome.source, ResultSource::Catalogue);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(
            toast_messages(&store),
            vec![("aiSearchFailed".to_string(), Severity::Error)]
        );
    }

    #[tokio::test]
    async fn test_unparseable_ai_reply_falls_back() {
        let store = store(ApiKeyStatus::Ok);
        let service = DiscoveryService::new(store.clone())
            .with_generator(FakeGenerator::ok("Sorry, I can't help with that."));

        let outcome = service.search(&SearchCriteria::default().with_ai(true)).await;

        assert_eq!(outcome.source, ResultSource::Catalogue);
        assert_eq!(toast_messages(&store)[0].0, "aiSearchFailed");
    }

    #[test]
    fn test_toggle_saved() {
        let store = store(ApiKeyStatus::Missing);
        let service = DiscoveryService::new(store.clone());
        let alice = service.filter_catalogue(&SearchCriteria::default())[0].clone();

        assert!(service.toggle_saved(&alice));
        assert!(store.is_influencer_saved(&alice.id));
        assert!(!service.toggle_saved(&alice));
        assert!(!store.is_influencer_saved(&alice.id));
    }

    #[test]
    fn test_prompt_mentions_criteria() {
        let criteria = SearchCriteria {
            term: "runners".into(),
            platform: Some(SocialPlatform::Instagram),
            category: Some("Fitness".into()),
            use_ai: true,
        };
        let prompt = criteria.prompt();
        assert!(prompt.contains("'runners'"));
        assert!(prompt.contains("'Fitness'"));
        assert!(prompt.contains("'Instagram'"));
    }
}
