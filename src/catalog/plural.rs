/// Plural form selection for numerus messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// A single form for every count (Chinese, Japanese, Korean, ...)
    Single,
    /// Singular for 0 and 1 (French, Brazilian Portuguese)
    ZeroOneSingular,
    /// Singular for exactly 1 (English, German, Spanish, ...)
    OneSingular,
}

impl PluralRule {
    /// Pick the rule from a language tag such as `fr`, `pt_BR` or `zh-CN`.
    /// Unknown languages use [`PluralRule::OneSingular`].
    pub fn for_language(language: &str) -> Self {
        let normalized = language.replace('-', "_").to_lowercase();
        let primary = normalized.split('_').next().unwrap_or("");
        match (primary, normalized.as_str()) {
            (_, "pt_br") => Self::ZeroOneSingular,
            ("fr" | "ln" | "mg" | "oc" | "ti" | "wa", _) => Self::ZeroOneSingular,
            ("zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "my", _) => Self::Single,
            _ => Self::OneSingular,
        }
    }

    /// Index of the `<numerusform>` to use for count `n`
    pub fn form_index(self, n: u64) -> usize {
        match self {
            Self::Single => 0,
            Self::ZeroOneSingular => usize::from(n > 1),
            Self::OneSingular => usize::from(n != 1),
        }
    }
}
