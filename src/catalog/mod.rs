//! Runtime lookup over a parsed catalog.
//!
//! Only finished translations with every form filled in are indexed, which
//! mirrors what ends up in a released `.qm` file: unfinished and obsolete
//! messages fall back to the source text.

pub mod plural;

use hashbrown::{Equivalent, HashMap};
use log::debug;
use std::hash::Hash;

use crate::parse::{Catalog, Message, TranslationStatus};
pub use plural::PluralRule;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MessageKey {
    context: String,
    source: String,
    comment: String,
}

/// Borrowed form of [`MessageKey`] so lookups don't allocate
#[derive(Hash)]
struct MessageKeyRef<'a> {
    context: &'a str,
    source: &'a str,
    comment: &'a str,
}

impl Equivalent<MessageKey> for MessageKeyRef<'_> {
    fn equivalent(&self, key: &MessageKey) -> bool {
        self.context == key.context && self.source == key.source && self.comment == key.comment
    }
}

/// Immutable translation table built from a [`Catalog`]
#[derive(Debug, Clone)]
pub struct Translator {
    language: Option<String>,
    plural_rule: PluralRule,
    messages: HashMap<MessageKey, Message>,
}

impl Translator {
    pub fn new(catalog: &Catalog) -> Self {
        let mut messages = HashMap::new();
        let mut duplicates = 0usize;

        for (context, message) in catalog.messages() {
            if message.status != TranslationStatus::Finished || message.has_empty_form() {
                continue;
            }
            let key = MessageKey {
                context: context.to_string(),
                source: message.source.clone(),
                comment: message.comment_key().to_string(),
            };
            // The first definition wins
            if messages.contains_key(&key) {
                duplicates += 1;
                continue;
            }
            messages.insert(key, message.clone());
        }

        if duplicates > 0 {
            debug!("ignored {} duplicate message definitions", duplicates);
        }

        let language = catalog.language.clone();
        let plural_rule = PluralRule::for_language(language.as_deref().unwrap_or(""));
        Self {
            language,
            plural_rule,
            messages,
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Number of messages that can actually be translated
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Find the message for `(context, source, comment)`.
    ///
    /// When nothing matches and `comment` is non-empty, the lookup is retried
    /// with an empty comment.
    pub fn find(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Message> {
        let comment = comment.unwrap_or("");
        let exact = self.messages.get(&MessageKeyRef {
            context,
            source,
            comment,
        });
        if exact.is_some() || comment.is_empty() {
            return exact;
        }
        self.messages.get(&MessageKeyRef {
            context,
            source,
            comment: "",
        })
    }

    /// Translate `source`, returning the source text itself when no
    /// translation is available.
    pub fn translate<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> &'a str {
        match self.find(context, source, comment) {
            Some(message) if message.numerus => message
                .numerus_forms
                .first()
                .map(String::as_str)
                .unwrap_or(source),
            Some(message) => &message.translation,
            None => source,
        }
    }

    /// Translate a plural message for count `n`, selecting the form with the
    /// catalog language's plural rule. Missing forms use the last one given.
    pub fn translate_plural<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        n: u64,
    ) -> &'a str {
        let Some(message) = self.find(context, source, comment) else {
            return source;
        };
        if !message.numerus {
            return &message.translation;
        }
        let index = self.plural_rule.form_index(n);
        message
            .numerus_forms
            .get(index)
            .or_else(|| message.numerus_forms.last())
            .map(String::as_str)
            .unwrap_or(source)
    }
}
