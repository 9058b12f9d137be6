//! Line-oriented console front end
//!
//! Reads one command per line, runs it against the app and prints the
//! result followed by any toasts it raised. Type `help` for the command
//! list.

use std::collections::HashSet;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::app::App;
use crate::models::{Influencer, Language, Severity, SocialPlatform, Theme};
use crate::services::{
    AddOutcome, AssistantSession, CompareService, DiscoveryService, LanguageSuggestion,
};

const HELP: &str = "\
Commands:
  status                       show theme, language, API key and translation state
  theme <light|dark>           switch theme
  lang <code>                  switch language (en, hi, ta, fr, nl, es)
  prefs                        show brand preferences
  prefs brand <name>           set brand name
  prefs keywords <a, b, ...>   set target audience keywords
  prefs category <name>        add a preferred category
  prefs platform <name>        add a preferred platform
  profile [brand name]         save the profile brand name, or reset the profile
  search [--ai] [term]         search influencers (criteria default to preferences)
  save <n>                     save result number n of the last search
  remove <id>                  remove a saved influencer
  saved                        list saved influencers
  compare                      show the comparison, best values marked
  compare options              list influencers that can be compared
  compare add <id>             add an influencer to the comparison (max 4)
  compare remove <id>          remove an influencer from the comparison
  ask <question>               ask the assistant
  chat clear                   clear the assistant conversation
  suggestions                  show suggested questions
  detect <language tag>        report a language detected in speech
  notify <message>             add a notification
  notifications                list notifications
  read <id>                    mark a notification read
  clear <id|all>               remove one or all notifications
  toasts                       list active toasts
  dismiss <id>                 dismiss a toast
  quit                         exit";

/// Command line parse errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{command}' does not accept '{value}'")]
    Invalid { command: &'static str, value: String },
}

/// Brand preference edits
#[derive(Debug, Clone, PartialEq)]
pub enum PrefsEdit {
    Show,
    Brand(String),
    Keywords(Vec<String>),
    Category(String),
    Platform(SocialPlatform),
}

/// Comparison edits
#[derive(Debug, Clone, PartialEq)]
pub enum CompareEdit {
    Show,
    Options,
    Add(String),
    Remove(String),
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Status,
    Theme(Theme),
    Language(Language),
    Prefs(PrefsEdit),
    /// `None` resets the profile
    Profile(Option<String>),
    Search { term: Option<String>, ai: bool },
    /// 1-based index into the last results
    Save(usize),
    Remove(String),
    Saved,
    Compare(CompareEdit),
    Ask(String),
    ClearChat,
    Suggestions,
    Detect(String),
    Notify(String),
    Notifications,
    Read(String),
    /// `None` clears every notification
    Clear(Option<String>),
    Toasts,
    Dismiss(String),
    Quit,
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument { command, argument })
    } else {
        Ok(rest)
    }
}

fn parse_prefs(rest: &str) -> Result<PrefsEdit, ParseError> {
    if rest.is_empty() {
        return Ok(PrefsEdit::Show);
    }
    let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let value = value.trim();
    match field {
        "brand" => Ok(PrefsEdit::Brand(required(value, "prefs brand", "a name")?.to_string())),
        "keywords" => Ok(PrefsEdit::Keywords(
            value
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        )),
        "category" => Ok(PrefsEdit::Category(
            required(value, "prefs category", "a category")?.to_string(),
        )),
        "platform" => {
            let value = required(value, "prefs platform", "a platform")?;
            value
                .parse()
                .map(PrefsEdit::Platform)
                .map_err(|_| ParseError::Invalid {
                    command: "prefs platform",
                    value: value.to_string(),
                })
        }
        other => Err(ParseError::Invalid {
            command: "prefs",
            value: other.to_string(),
        }),
    }
}

fn parse_compare(rest: &str) -> Result<CompareEdit, ParseError> {
    let (action, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let value = value.trim();
    match action {
        "" => Ok(CompareEdit::Show),
        "options" => Ok(CompareEdit::Options),
        "add" => Ok(CompareEdit::Add(
            required(value, "compare add", "an influencer id")?.to_string(),
        )),
        "remove" => Ok(CompareEdit::Remove(
            required(value, "compare remove", "an influencer id")?.to_string(),
        )),
        other => Err(ParseError::Invalid {
            command: "compare",
            value: other.to_string(),
        }),
    }
}

/// Parse one input line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match name.to_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "status" => Command::Status,
        "theme" => {
            let value = required(rest, "theme", "light or dark")?;
            Command::Theme(value.parse().map_err(|_| ParseError::Invalid {
                command: "theme",
                value: value.to_string(),
            })?)
        }
        "lang" | "language" => {
            let value = required(rest, "lang", "a language code")?;
            Command::Language(value.parse().map_err(|_| ParseError::Invalid {
                command: "lang",
                value: value.to_string(),
            })?)
        }
        "prefs" => Command::Prefs(parse_prefs(rest)?),
        "profile" => Command::Profile((!rest.is_empty()).then(|| rest.to_string())),
        "search" => {
            let (ai, term) = match rest.strip_prefix("--ai") {
                Some(term) => (true, term.trim()),
                None => (false, rest),
            };
            Command::Search {
                term: (!term.is_empty()).then(|| term.to_string()),
                ai,
            }
        }
        "save" => {
            let value = required(rest, "save", "a result number")?;
            match value.parse::<usize>() {
                Ok(n) if n > 0 => Command::Save(n),
                _ => {
                    return Err(ParseError::Invalid {
                        command: "save",
                        value: value.to_string(),
                    })
                }
            }
        }
        "remove" => Command::Remove(required(rest, "remove", "an influencer id")?.to_string()),
        "saved" => Command::Saved,
        "compare" => Command::Compare(parse_compare(rest)?),
        "ask" => Command::Ask(required(rest, "ask", "a question")?.to_string()),
        "chat" if rest == "clear" => Command::ClearChat,
        "suggestions" => Command::Suggestions,
        "detect" => Command::Detect(required(rest, "detect", "a language tag")?.to_string()),
        "notify" => Command::Notify(required(rest, "notify", "a message")?.to_string()),
        "notifications" => Command::Notifications,
        "read" => Command::Read(required(rest, "read", "a notification id")?.to_string()),
        "clear" => match required(rest, "clear", "an id or 'all'")? {
            "all" => Command::Clear(None),
            id => Command::Clear(Some(id.to_string())),
        },
        "toasts" => Command::Toasts,
        "dismiss" => Command::Dismiss(required(rest, "dismiss", "a toast id")?.to_string()),
        "quit" | "exit" => Command::Quit,
        _ => return Err(ParseError::Unknown(name.to_string())),
    };
    Ok(command)
}

fn describe(index: usize, influencer: &Influencer) -> String {
    format!(
        "{:>2}. {} [{}] {} on {}, {} followers, {} engagement{}",
        index,
        influencer.name,
        influencer.id,
        influencer.niche,
        influencer.platform,
        influencer.followers,
        influencer.engagement_rate,
        if influencer.verified() { ", verified" } else { "" }
    )
}

fn severity_tag(kind: Severity) -> &'static str {
    match kind {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Warning => "warn",
        Severity::Error => "error",
    }
}

/// Interactive session over a started [`App`].
pub struct Console {
    app: App,
    discovery: DiscoveryService,
    assistant: AssistantSession,
    compare: CompareService,
    results: Vec<Influencer>,
    shown_toasts: HashSet<String>,
}

impl Console {
    pub fn new(app: App) -> Self {
        Self {
            discovery: app.discovery(),
            assistant: app.assistant(),
            compare: app.compare(),
            app,
            results: Vec::new(),
            shown_toasts: HashSet::new(),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Run one command and return the lines to print. Toasts raised by the
    /// command are appended.
    pub async fn execute(&mut self, command: Command) -> Vec<String> {
        let mut out = self.run_command(command).await;
        out.extend(self.new_toasts());
        out
    }

    /// Parse and run one line. Returns `None` when the session should end.
    pub async fn handle_line(&mut self, line: &str) -> Option<Vec<String>> {
        if line.trim().is_empty() {
            return Some(Vec::new());
        }
        match parse(line) {
            Ok(Command::Quit) => None,
            Ok(command) => Some(self.execute(command).await),
            Err(ParseError::Unknown(name)) => {
                let store = self.app.store();
                Some(vec![store.translate("unknownCommand", &[("command", name.as_str())])])
            }
            Err(e) => Some(vec![e.to_string()]),
        }
    }

    /// Read commands from `input` until it ends or `quit` is entered.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let store = self.app.store().clone();
        let greeting = format!("{} ({})", store.translate("appName", &[]), store.language());
        output.write_all(format!("{}\n", greeting).as_bytes()).await?;
        output.write_all(b"> ").await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            debug!("Console input: {}", line);
            let Some(out) = self.handle_line(&line).await else {
                break;
            };
            for text in out {
                output.write_all(format!("{}\n", text).as_bytes()).await?;
            }
            output.write_all(b"> ").await?;
            output.flush().await?;
        }
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }

    /// The comparison set, best values marked with `+`
    fn comparison(&self) -> Vec<String> {
        let compared = self.compare.compared();
        if compared.is_empty() {
            return vec![self.app.store().translate("addInfluencersToCompare", &[])];
        }
        let highlights = self.compare.highlights();
        compared
            .iter()
            .enumerate()
            .map(|(i, inf)| {
                let mut line = describe(i + 1, inf);
                if highlights.followers.contains(&inf.id) {
                    line.push_str(" +followers");
                }
                if highlights.engagement_rate.contains(&inf.id) {
                    line.push_str(" +engagement");
                }
                line
            })
            .collect()
    }

    fn new_toasts(&mut self) -> Vec<String> {
        let active = self.app.store().toasts();
        let active_ids: HashSet<String> = active.iter().map(|t| t.id.clone()).collect();
        self.shown_toasts.retain(|id| active_ids.contains(id));

        active
            .into_iter()
            .filter(|t| self.shown_toasts.insert(t.id.clone()))
            .map(|t| format!("[{}] {}", severity_tag(t.kind), t.message))
            .collect()
    }

    async fn run_command(&mut self, command: Command) -> Vec<String> {
        let store = self.app.store().clone();

        match command {
            Command::Help => vec![HELP.to_string()],
            Command::Status => {
                let key_line = match self.app.api_key_hint() {
                    Some(hint) => store.translate("apiKeyConfigured", &[("key", hint)]),
                    None => store.translate("apiKeyNotConfigured", &[]),
                };
                vec![
                    format!("theme: {}", store.theme()),
                    format!("language: {} ({})", store.language(), store.language().native_name()),
                    format!("translations: {:?}", self.app.translation_phase()),
                    key_line,
                ]
            }
            Command::Theme(theme) => {
                store.set_theme(theme);
                Vec::new()
            }
            Command::Language(language) => {
                store.set_language(language);
                Vec::new()
            }
            Command::Prefs(edit) => {
                let mut preferences = store.brand_preferences();
                match edit {
                    PrefsEdit::Show => {
                        return vec![
                            format!("brand: {}", preferences.brand_name),
                            format!("keywords: {}", preferences.target_audience_keywords.join(", ")),
                            format!("categories: {}", preferences.preferred_categories.join(", ")),
                            format!(
                                "platforms: {}",
                                preferences
                                    .preferred_platforms
                                    .iter()
                                    .map(|p| p.to_string())
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            ),
                        ];
                    }
                    PrefsEdit::Brand(name) => preferences.brand_name = name,
                    PrefsEdit::Keywords(keywords) => preferences.target_audience_keywords = keywords,
                    PrefsEdit::Category(category) => preferences.add_category(category),
                    PrefsEdit::Platform(platform) => preferences.add_platform(platform),
                }
                store.set_brand_preferences(preferences);
                Vec::new()
            }
            Command::Profile(Some(brand_name)) => {
                let mut profile = store.user_profile().unwrap_or_default();
                profile.brand_name = brand_name;
                store.set_user_profile(Some(profile));
                vec![format!("profile saved: {}", store.user_profile().unwrap_or_default().brand_name)]
            }
            Command::Profile(None) => {
                store.set_user_profile(None);
                vec!["profile reset".to_string()]
            }
            Command::Search { term, ai } => {
                let mut criteria = self.discovery.default_criteria().with_ai(ai);
                if let Some(term) = term {
                    criteria.term = term;
                }
                let outcome = self.discovery.search(&criteria).await;
                self.results = outcome.results;

                if self.results.is_empty() {
                    return vec![store.translate("noResults", &[])];
                }
                self.results
                    .iter()
                    .enumerate()
                    .map(|(i, inf)| describe(i + 1, inf))
                    .collect()
            }
            Command::Save(n) => match n.checked_sub(1).and_then(|i| self.results.get(i)) {
                Some(influencer) => {
                    store.add_saved_influencer(influencer.clone());
                    Vec::new()
                }
                None => vec![format!("No result number {}", n)],
            },
            Command::Remove(id) => {
                store.remove_saved_influencer(&id);
                Vec::new()
            }
            Command::Saved => {
                let saved = store.saved_influencers();
                if saved.is_empty() {
                    return vec![store.translate("noSavedInfluencers", &[])];
                }
                let mut out = vec![store.translate("savedShortlisted", &[])];
                out.extend(saved.iter().enumerate().map(|(i, inf)| describe(i + 1, inf)));
                out
            }
            Command::Compare(CompareEdit::Show) => self.comparison(),
            Command::Compare(CompareEdit::Options) => self
                .compare
                .selectable()
                .iter()
                .enumerate()
                .map(|(i, inf)| describe(i + 1, inf))
                .collect(),
            Command::Compare(CompareEdit::Add(id)) => match self.compare.add(&id) {
                AddOutcome::Added => self.comparison(),
                AddOutcome::AlreadyCompared => vec![format!("Already comparing {}", id)],
                AddOutcome::NotFound => vec![format!("No influencer with id {}", id)],
                AddOutcome::LimitReached => Vec::new(),
            },
            Command::Compare(CompareEdit::Remove(id)) => {
                if self.compare.remove(&id) {
                    self.comparison()
                } else {
                    vec![format!("Not comparing {}", id)]
                }
            }
            Command::Ask(question) => match self.assistant.send(&question).await {
                Some(reply) => vec![reply.text.clone()],
                None => Vec::new(),
            },
            Command::ClearChat => {
                self.assistant.clear();
                Vec::new()
            }
            Command::Suggestions => self
                .assistant
                .suggestions()
                .into_iter()
                .map(|s| format!("- {}", s))
                .collect(),
            Command::Detect(tag) => match self.assistant.handle_detected_language(&tag) {
                LanguageSuggestion::Switch(language) => {
                    let name = language.native_name();
                    vec![
                        store.translate("languageSwitchSuggested", &[("languageName", name)]),
                        format!("  lang {}", language.code()),
                    ]
                }
                LanguageSuggestion::AlreadyActive | LanguageSuggestion::Unsupported(_) => Vec::new(),
            },
            Command::Notify(message) => {
                store.add_notification(message, Severity::Info);
                Vec::new()
            }
            Command::Notifications => {
                let notifications = store.notifications();
                if notifications.is_empty() {
                    return vec![store.translate("noNotifications", &[])];
                }
                let mut out = vec![store.translate("notifications", &[])];
                out.extend(notifications.iter().map(|n| {
                    format!(
                        "{} {} [{}] {} ({})",
                        if n.read { " " } else { "*" },
                        n.timestamp.format("%Y-%m-%d %H:%M"),
                        n.kind,
                        n.message,
                        n.id
                    )
                }));
                out
            }
            Command::Read(id) => {
                store.mark_notification_read(&id);
                Vec::new()
            }
            Command::Clear(Some(id)) => {
                store.clear_notification(&id);
                Vec::new()
            }
            Command::Clear(None) => {
                store.clear_all_notifications();
                Vec::new()
            }
            Command::Toasts => store
                .toasts()
                .into_iter()
                .map(|t| format!("[{}] {} ({})", severity_tag(t.kind), t.message, t.id))
                .collect(),
            Command::Dismiss(id) => {
                store.remove_toast(&id);
                Vec::new()
            }
            Command::Quit => Vec::new(),
        }
    }
}
