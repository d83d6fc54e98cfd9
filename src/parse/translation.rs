use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Line number lupdate writes when it no longer knows where a string lives.
pub const SENTINEL_LINE: u64 = 2_107_488;

/// Lifecycle status of a translation, taken from `<translation type="...">`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    /// No `type` attribute
    #[default]
    Finished,
    /// Missing or waiting for review
    Unfinished,
    /// Source string is no longer referenced
    Obsolete,
    /// Qt 5 spelling of obsolete
    Vanished,
}

impl TranslationStatus {
    /// Parse the value of the `type` attribute. `None` means the attribute is absent.
    pub fn from_type_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("") => Some(Self::Finished),
            Some("unfinished") => Some(Self::Unfinished),
            Some("obsolete") => Some(Self::Obsolete),
            Some("vanished") => Some(Self::Vanished),
            Some(_) => None,
        }
    }

    /// Value written to the `type` attribute, `None` for finished translations
    pub fn type_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Obsolete and vanished messages are kept for reference only
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Obsolete | Self::Vanished)
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Finished => "finished",
            Self::Unfinished => "unfinished",
            Self::Obsolete => "obsolete",
            Self::Vanished => "vanished",
        };
        f.write_str(s)
    }
}

/// Provenance of a message in the application sources
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filename: String,
    pub line: Option<u64>,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: Option<u64>) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }

    /// A location with no filename points nowhere; lupdate leaves these
    /// behind (usually with [`SENTINEL_LINE`]) after refactors.
    pub fn is_unlinked(&self) -> bool {
        self.filename.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.filename, line),
            None => f.write_str(&self.filename),
        }
    }
}

/// A single `<message>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Optional `id` attribute (id-based translations)
    pub id: Option<String>,
    /// Original-language text, the lookup key
    pub source: String,
    /// Disambiguation comment
    pub comment: Option<String>,
    pub old_source: Option<String>,
    pub old_comment: Option<String>,
    /// Note from the developer (`<extracomment>`)
    pub extra_comment: Option<String>,
    /// Note from the translator (`<translatorcomment>`)
    pub translator_comment: Option<String>,
    pub locations: Vec<Location>,
    /// Localized text; empty for numerus messages
    pub translation: String,
    /// `numerus="yes"` messages carry one translation per plural form
    pub numerus: bool,
    pub numerus_forms: Vec<String>,
    pub status: TranslationStatus,
    pub userdata: Option<String>,
    /// 1-indexed line of the `<message>` tag in the TS file (0 when built in memory)
    #[serde(skip)]
    pub file_line: usize,
}

impl Message {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// The disambiguation comment, empty when absent
    pub fn comment_key(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// True when no translated text exists (all plural forms empty for numerus messages)
    pub fn is_translation_empty(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().all(|f| f.is_empty())
        } else {
            self.translation.is_empty()
        }
    }

    /// True when any text a runtime lookup could select is missing
    pub fn has_empty_form(&self) -> bool {
        if self.numerus {
            self.numerus_forms.is_empty() || self.numerus_forms.iter().any(|f| f.is_empty())
        } else {
            self.translation.is_empty()
        }
    }

    /// Text used for display and searching: the first plural form for numerus messages
    pub fn translation_text(&self) -> &str {
        if self.numerus {
            self.numerus_forms.first().map(String::as_str).unwrap_or("")
        } else {
            &self.translation
        }
    }

    /// Every translated string of the message
    pub fn translations(&self) -> Vec<&str> {
        if self.numerus {
            self.numerus_forms.iter().map(String::as_str).collect()
        } else {
            vec![self.translation.as_str()]
        }
    }

    /// First location that points at a real file
    pub fn primary_location(&self) -> Option<&Location> {
        self.locations
            .iter()
            .find(|l| !l.is_unlinked())
            .or_else(|| self.locations.first())
    }
}

/// A `<context>` block: messages from one class or dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// A parsed TS file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub language: Option<String>,
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            version: "2.1".to_string(),
            language: None,
            source_language: None,
            contexts: Vec::new(),
        }
    }
}

/// Flattened view of a message used to compare catalogs independent of layout
pub type MessageRecord = (String, String, Option<String>, Vec<String>, TranslationStatus);

impl Catalog {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.contexts.push(context);
        self
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Iterate over every message with the name of its context
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> + '_ {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// `(context, source, comment, translations, status)` for every message
    pub fn records(&self) -> Vec<MessageRecord> {
        self.messages()
            .map(|(ctx, m)| {
                (
                    ctx.to_string(),
                    m.source.clone(),
                    m.comment.clone(),
                    m.translations().into_iter().map(str::to_string).collect(),
                    m.status,
                )
            })
            .collect()
    }
}

/// A message matched by a search, with enough provenance to print it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Context name (e.g., "ApplicationWindow")
    pub context: String,
    pub source: String,
    pub comment: Option<String>,
    pub translation: String,
    pub status: TranslationStatus,
    /// Where the application uses the string
    pub locations: Vec<Location>,
    /// The line of the `<message>` tag (1-indexed)
    pub line: usize,
    /// The TS file where this entry was found
    pub file: PathBuf,
}

impl TranslationEntry {
    pub fn from_message(file: impl Into<PathBuf>, context: &str, message: &Message) -> Self {
        Self {
            context: context.to_string(),
            source: message.source.clone(),
            comment: message.comment.clone(),
            translation: message.translation_text().to_string(),
            status: message.status,
            locations: message.locations.clone(),
            line: message.file_line,
            file: file.into(),
        }
    }
}
