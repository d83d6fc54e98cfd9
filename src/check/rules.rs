use hashbrown::HashMap;
use regex::Regex;

use super::Severity;
use crate::config::patterns::place_marker_pattern;
use crate::parse::{Context, Message, TranslationStatus};

/// A finding inside one context: index of the message and explanation
pub type Finding = (usize, String);

/// A check run over every context of a catalog
pub trait Rule {
    /// Stable kebab-case id used in reports and the `disabled` setting
    fn id(&self) -> &'static str;

    fn severity(&self) -> Severity;

    fn check(&self, context: &Context) -> Vec<Finding>;
}

/// Finished messages whose translations compare against their source
fn translated(context: &Context) -> impl Iterator<Item = (usize, &Message, &str)> + '_ {
    context
        .messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.status == TranslationStatus::Finished && !m.is_translation_empty())
        .flat_map(|(i, m)| {
            m.translations()
                .into_iter()
                .filter(|t| !t.is_empty())
                .map(move |t| (i, m, t))
        })
}

/// A finished message must carry text
pub struct EmptyTranslation;

impl Rule for EmptyTranslation {
    fn id(&self) -> &'static str {
        "empty-translation"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        context
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.status == TranslationStatus::Finished && m.has_empty_form())
            .map(|(i, _)| (i, "finished message has an empty translation".to_string()))
            .collect()
    }
}

/// `(source, comment)` must be unique among active messages of a context
pub struct DuplicateMessage;

impl Rule for DuplicateMessage {
    fn id(&self) -> &'static str {
        "duplicate-message"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();
        let mut findings = Vec::new();

        for (i, message) in context.messages.iter().enumerate() {
            if !message.is_active() {
                continue;
            }
            let key = (message.source.as_str(), message.comment_key());
            match first_seen.get(&key) {
                Some(&first) => {
                    let first_line = context.messages[first].file_line;
                    let text = if first_line > 0 {
                        format!("duplicate of the message on line {}", first_line)
                    } else {
                        format!("duplicate of message #{}", first + 1)
                    };
                    findings.push((i, text));
                }
                None => {
                    first_seen.insert(key, i);
                }
            }
        }
        findings
    }
}

/// Linked locations should point into the application sources
pub struct LocationPattern {
    patterns: Vec<Regex>,
    globs: Vec<String>,
}

impl LocationPattern {
    pub fn new(globs: Vec<String>, patterns: Vec<Regex>) -> Self {
        Self { patterns, globs }
    }
}

impl Rule for LocationPattern {
    fn id(&self) -> &'static str {
        "location-pattern"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        if self.patterns.is_empty() {
            return Vec::new();
        }
        let mut findings = Vec::new();
        for (i, message) in context.messages.iter().enumerate() {
            for location in message.locations.iter().filter(|l| !l.is_unlinked()) {
                if !self.patterns.iter().any(|p| p.is_match(&location.filename)) {
                    findings.push((
                        i,
                        format!(
                            "location '{}' does not match {}",
                            location.filename,
                            self.globs.join(", ")
                        ),
                    ));
                }
            }
        }
        findings
    }
}

/// Reports sentinel locations so they are not mistaken for source references
pub struct UnlinkedLocation {
    sentinel_line: u64,
}

impl UnlinkedLocation {
    pub fn new(sentinel_line: u64) -> Self {
        Self { sentinel_line }
    }
}

impl Rule for UnlinkedLocation {
    fn id(&self) -> &'static str {
        "unlinked-location"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (i, message) in context.messages.iter().enumerate() {
            for location in message.locations.iter().filter(|l| l.is_unlinked()) {
                let text = match location.line {
                    Some(line) if line == self.sentinel_line => {
                        format!("unlinked location (sentinel line {})", line)
                    }
                    Some(line) => format!("unlinked location (no filename, line {})", line),
                    None => "unlinked location (no filename)".to_string(),
                };
                findings.push((i, text));
            }
        }
        findings
    }
}

/// `&` marks the accelerator letter; `&&` is a literal ampersand
pub fn has_accelerator(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            continue;
        }
        match chars.peek() {
            Some('&') => {
                chars.next();
            }
            Some(next) if next.is_alphanumeric() => return true,
            _ => {}
        }
    }
    false
}

/// Source and translation must agree on having a keyboard accelerator
pub struct Accelerator;

impl Rule for Accelerator {
    fn id(&self) -> &'static str {
        "accelerator"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        translated(context)
            .filter_map(|(i, m, t)| {
                match (has_accelerator(&m.source), has_accelerator(t)) {
                    (true, false) => Some((i, "translation lacks the accelerator".to_string())),
                    (false, true) => Some((i, "translation adds an accelerator".to_string())),
                    _ => None,
                }
            })
            .collect()
    }
}

/// `%1`-style markers must survive translation
pub struct PlaceMarker {
    pattern: Regex,
}

impl PlaceMarker {
    pub fn new() -> Self {
        Self {
            pattern: place_marker_pattern(),
        }
    }

    fn markers(&self, text: &str) -> Vec<u32> {
        let mut found: Vec<u32> = self
            .pattern
            .captures_iter(text)
            .filter_map(|c| c[1].parse().ok())
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }
}

impl Default for PlaceMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PlaceMarker {
    fn id(&self) -> &'static str {
        "place-marker"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        translated(context)
            .filter_map(|(i, m, t)| {
                let expected = self.markers(&m.source);
                let actual = self.markers(t);
                if expected == actual {
                    return None;
                }
                let missing: Vec<String> = expected
                    .iter()
                    .filter(|n| !actual.contains(n))
                    .map(|n| format!("%{}", n))
                    .collect();
                let extra: Vec<String> = actual
                    .iter()
                    .filter(|n| !expected.contains(n))
                    .map(|n| format!("%{}", n))
                    .collect();
                let mut text = String::from("place markers differ");
                if !missing.is_empty() {
                    text.push_str(&format!("; missing {}", missing.join(" ")));
                }
                if !extra.is_empty() {
                    text.push_str(&format!("; unexpected {}", extra.join(" ")));
                }
                Some((i, text))
            })
            .collect()
    }
}

fn ending_punctuation(text: &str) -> Option<char> {
    match text.trim_end().chars().last()? {
        '…' => Some('.'),
        c @ ('.' | ':' | '?' | '!' | ';') => Some(c),
        _ => None,
    }
}

/// Source and translation end with the same punctuation.
/// Trailing whitespace is ignored, which accepts the French `Nom :` spacing.
pub struct EndingPunctuation;

impl Rule for EndingPunctuation {
    fn id(&self) -> &'static str {
        "ending-punctuation"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        translated(context)
            .filter_map(|(i, m, t)| {
                let expected = ending_punctuation(&m.source);
                let actual = ending_punctuation(t);
                if expected == actual {
                    return None;
                }
                let describe = |p: Option<char>| match p {
                    Some(c) => format!("'{}'", c),
                    None => "no punctuation".to_string(),
                };
                Some((
                    i,
                    format!(
                        "source ends with {}, translation with {}",
                        describe(expected),
                        describe(actual)
                    ),
                ))
            })
            .collect()
    }
}

/// Leading and trailing whitespace is usually layout and must be kept
pub struct SurroundingWhitespace;

impl Rule for SurroundingWhitespace {
    fn id(&self) -> &'static str {
        "surrounding-whitespace"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, context: &Context) -> Vec<Finding> {
        let leading = |s: &str| s.starts_with(char::is_whitespace);
        let trailing = |s: &str| s.ends_with(char::is_whitespace);

        translated(context)
            .filter_map(|(i, m, t)| {
                if leading(&m.source) != leading(t) {
                    Some((i, "leading whitespace differs from source".to_string()))
                } else if trailing(&m.source) != trailing(t) {
                    Some((i, "trailing whitespace differs from source".to_string()))
                } else {
                    None
                }
            })
            .collect()
    }
}
