//! Assistant chat
//!
//! A conversation with the AI service about influencer marketing and the
//! app itself. The session keeps its own message history; nothing in it is
//! persisted.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::ai::{GenerateRequest, TextGenerator};
use crate::models::{ChatMessage, Language, Severity};
use crate::state::AppStore;

/// Translation keys of the suggested opening questions
const SUGGESTION_KEYS: [&str; 4] = ["aiSuggestion1", "aiSuggestion2", "aiSuggestion3", "aiSuggestion4"];

/// What to do about a language detected in the user's speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSuggestion {
    /// Detected language is already active
    AlreadyActive,
    /// A supported language other than the active one; offer to switch
    Switch(Language),
    /// Not a supported language; a warning toast has been raised
    Unsupported(String),
}

fn system_instruction(language: Language) -> String {
    format!(
        "You are the assistant of an influencer marketing app. Help users find and \
         evaluate influencers, read analytics and use the app's features. Keep answers \
         short and relevant. Answer in the language the question is written in, \
         falling back to English. The app is currently set to {}.",
        language.native_name()
    )
}

/// One chat conversation.
pub struct AssistantSession {
    store: Arc<AppStore>,
    generator: Option<Arc<dyn TextGenerator>>,
    messages: Vec<ChatMessage>,
}

impl AssistantSession {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self {
            store,
            generator: None,
            messages: Vec::new(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Suggested questions in the active language
    pub fn suggestions(&self) -> Vec<String> {
        SUGGESTION_KEYS
            .iter()
            .map(|key| self.store.translate(key, &[]))
            .collect()
    }

    /// Send `input` and append the reply. Blank input is ignored and
    /// returns `None`; otherwise the returned message is the AI's answer
    /// or an apology explaining why there is none.
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(input));

        let usable = self
            .generator
            .clone()
            .filter(|_| self.store.api_key_status().is_ok());
        let generator = match usable {
            Some(generator) => generator,
            None => {
                self.toast("apiKeyNeededForAIChat", Severity::Error);
                let text = self.store.translate("aiChatDisabledApiKey", &[]);
                return Some(self.push_ai(text));
            }
        };

        let language = self.store.language();
        let request = GenerateRequest::text(format!(
            "User query (app language: {}): {}",
            language.code(),
            input
        ))
        .with_system_instruction(system_instruction(language));

        match generator.generate(request).await {
            Ok(reply) => {
                debug!("Assistant replied with {} chars", reply.len());
                Some(self.push_ai(reply))
            }
            Err(e) => {
                warn!("Assistant request failed: {}", e);
                self.toast("aiChatError", Severity::Error);
                let text = self.store.translate("aiChatErrorResponse", &[]);
                Some(self.push_ai(text))
            }
        }
    }

    /// Forget the conversation
    pub fn clear(&mut self) {
        self.messages.clear();
        self.toast("chatCleared", Severity::Info);
    }

    /// Handle a language tag reported by speech recognition, such as
    /// `fr-FR`. The active language is never switched from here.
    pub fn handle_detected_language(&self, tag: &str) -> LanguageSuggestion {
        match Language::from_tag(tag) {
            Some(language) if language == self.store.language() => LanguageSuggestion::AlreadyActive,
            Some(language) => LanguageSuggestion::Switch(language),
            None => {
                let code = tag.split(['-', '_']).next().unwrap_or(tag).to_string();
                let message = self
                    .store
                    .translate("languageNotSupportedForSwitch", &[("language", code.as_str())]);
                self.store.add_toast(message, Severity::Warning);
                LanguageSuggestion::Unsupported(code)
            }
        }
    }

    fn push_ai(&mut self, text: String) -> &ChatMessage {
        self.messages.push(ChatMessage::ai(text));
        &self.messages[self.messages.len() - 1]
    }

    fn toast(&self, key: &str, kind: Severity) {
        let message = self.store.translate(key, &[]);
        self.store.add_toast(message, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use crate::i18n::{TranslationCatalog, Translations};
    use crate::models::{ApiKeyStatus, ChatSender};
    use crate::storage::PersistentStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGenerator {
        fail: bool,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, request: GenerateRequest) -> Result<String, AiError> {
            let prompt = request.prompt.clone();
            self.requests.lock().unwrap().push(request);
            if self.fail {
                Err(AiError::EmptyResponse)
            } else {
                Ok(format!("echo: {}", prompt))
            }
        }
    }

    fn generator(fail: bool) -> Arc<EchoGenerator> {
        Arc::new(EchoGenerator {
            fail,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn store(status: ApiKeyStatus) -> Arc<AppStore> {
        let mut catalog = TranslationCatalog::new(Language::En);
        catalog.insert(
            Language::En,
            [
                ("aiChatErrorResponse", "Sorry, I couldn't process that request right now."),
                ("aiSuggestion1", "Who are the top tech influencers?"),
                ("languageNotSupportedForSwitch", "Detected language '{{language}}' is not supported."),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );
        Arc::new(
            AppStore::new(PersistentStore::in_memory(), Translations::from_catalog(catalog))
                .with_api_key_status(status),
        )
    }

    fn toast_keys(store: &AppStore) -> Vec<(String, Severity)> {
        store.toasts().into_iter().map(|t| (t.message, t.kind)).collect()
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let store = store(ApiKeyStatus::Ok);
        let mut session = AssistantSession::new(store.clone()).with_generator(generator(false));

        assert!(session.send("   ").await.is_none());
        assert!(session.messages().is_empty());
        assert!(store.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_reply_is_appended() {
        let store = store(ApiKeyStatus::Ok);
        let gen = generator(false);
        let mut session = AssistantSession::new(store.clone()).with_generator(gen.clone());

        let reply = session.send("Who should I pick?").await.unwrap().clone();

        assert_eq!(reply.sender, ChatSender::Ai);
        assert_eq!(reply.text, "echo: User query (app language: en): Who should I pick?");
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].sender, ChatSender::User);

        let requests = gen.requests.lock().unwrap();
        let instruction = requests[0].system_instruction.as_deref().unwrap();
        assert!(instruction.contains("English"));
    }

    #[tokio::test]
    async fn test_missing_key_disables_chat() {
        let store = store(ApiKeyStatus::Missing);
        let gen = generator(false);
        let mut session = AssistantSession::new(store.clone()).with_generator(gen.clone());

        let reply = session.send("hello").await.unwrap().clone();

        assert_eq!(reply.text, "aiChatDisabledApiKey");
        assert_eq!(
            toast_keys(&store),
            vec![("apiKeyNeededForAIChat".to_string(), Severity::Error)]
        );
        assert!(gen.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_shows_apology() {
        let store = store(ApiKeyStatus::Ok);
        let mut session = AssistantSession::new(store.clone()).with_generator(generator(true));

        let reply = session.send("hello").await.unwrap().clone();

        assert_eq!(reply.text, "Sorry, I couldn't process that request right now.");
        assert_eq!(toast_keys(&store), vec![("aiChatError".to_string(), Severity::Error)]);
    }

    #[tokio::test]
    async fn test_system_instruction_follows_app_language() {
        let store = store(ApiKeyStatus::Ok);
        store.set_language(Language::Fr);
        let gen = generator(false);
        let mut session = AssistantSession::new(store.clone()).with_generator(gen.clone());

        session.send("bonjour").await;

        let requests = gen.requests.lock().unwrap();
        assert!(requests[0].prompt.contains("app language: fr"));
        assert!(requests[0].system_instruction.as_deref().unwrap().contains("Français"));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = store(ApiKeyStatus::Ok);
        let mut session = AssistantSession::new(store.clone()).with_generator(generator(false));
        session.send("hello").await;

        session.clear();

        assert!(session.messages().is_empty());
        assert_eq!(toast_keys(&store), vec![("chatCleared".to_string(), Severity::Info)]);
    }

    #[test]
    fn test_suggestions_are_translated() {
        let session = AssistantSession::new(store(ApiKeyStatus::Ok));
        let suggestions = session.suggestions();
        assert_eq!(suggestions.len(), 4);
        assert_eq!(suggestions[0], "Who are the top tech influencers?");
        assert_eq!(suggestions[3], "aiSuggestion4");
    }

    #[test]
    fn test_detected_language() {
        let store = store(ApiKeyStatus::Ok);
        let session = AssistantSession::new(store.clone());

        assert_eq!(session.handle_detected_language("en-US"), LanguageSuggestion::AlreadyActive);
        assert_eq!(
            session.handle_detected_language("ta-IN"),
            LanguageSuggestion::Switch(Language::Ta)
        );
        // Never switches on its own
        assert_eq!(store.language(), Language::En);
        assert!(store.toasts().is_empty());

        assert_eq!(
            session.handle_detected_language("de-DE"),
            LanguageSuggestion::Unsupported("de".to_string())
        );
        assert_eq!(
            toast_keys(&store),
            vec![("Detected language 'de' is not supported.".to_string(), Severity::Warning)]
        );
    }
}
