use regex::Regex;

use crate::error::{Result, TsError};

/// Where lupdate-generated locations are expected to point
pub fn default_location_patterns() -> Vec<String> {
    vec!["../src/*.cpp".to_string(), "../src/*.h".to_string()]
}

/// Compile a location glob. `*` matches within one path segment, `**`
/// across segments and `?` a single character.
pub fn compile_location_pattern(glob: &str) -> Result<Regex> {
    if glob.is_empty() {
        return Err(TsError::InvalidPattern(glob.to_string()));
    }

    let mut pattern = String::from("^");
    let mut chars = glob.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                pattern.push_str(".*");
            }
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            c => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|_| TsError::InvalidPattern(glob.to_string()))
}

/// Compile every glob, failing on the first invalid one
pub fn compile_location_patterns(globs: &[String]) -> Result<Vec<Regex>> {
    globs.iter().map(|g| compile_location_pattern(g)).collect()
}

/// `%1`..`%99` argument markers (with the optional `L` locale flag)
pub fn place_marker_pattern() -> Regex {
    Regex::new(r"%L?(\d{1,2})").expect("place marker regex is valid")
}
