// src/parse/key_extractor.rs

use crate::error::{Result, TsError};
use log::warn;
use regex::{Regex, RegexBuilder};
use std::cell::Cell;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::translation::TranslationEntry;
use super::ts_parser::TsParser;

/// `KeyExtractor` searches messages across every `.ts` file below a
/// directory, returning the context, source text, translation, file path and
/// line number of each message whose source or translation matches.
pub struct KeyExtractor {
    exclusions: Vec<String>,
    verbose: bool,
    quiet: bool,          // Suppress progress indicators (for --simple mode)
    case_sensitive: bool, // Case-sensitive matching
    is_regex: bool,
    progress_count: Cell<usize>, // Track progress for better indicator
}

impl Default for KeyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// How a query is compared against message text
enum TextMatcher {
    Substring { needle: String, case_sensitive: bool },
    Pattern(Regex),
}

impl TextMatcher {
    fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Substring {
                needle,
                case_sensitive: true,
            } => text.contains(needle.as_str()),
            Self::Substring { needle, .. } => text.to_lowercase().contains(needle.as_str()),
            Self::Pattern(re) => re.is_match(text),
        }
    }
}

impl KeyExtractor {
    /// Create a new `KeyExtractor`.
    pub fn new() -> Self {
        Self {
            exclusions: Vec::new(),
            verbose: false,
            quiet: false,
            case_sensitive: false,
            is_regex: false,
            progress_count: Cell::new(0),
        }
    }

    /// Set exclusion patterns (directory or file names to ignore)
    pub fn set_exclusions(&mut self, exclusions: Vec<String>) {
        self.exclusions = exclusions;
    }

    /// Set verbose mode for detailed error messages
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set quiet mode to suppress progress indicators
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Set case-sensitive matching
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
    }

    /// Treat the query as a regular expression
    pub fn set_regex(&mut self, is_regex: bool) {
        self.is_regex = is_regex;
    }

    /// Print progress indicator with proper formatting
    fn print_progress(&self, indicator_type: char) {
        if self.quiet {
            return;
        }

        use colored::Colorize;
        let indicator = match indicator_type {
            '.' => ".".green(),
            'S' => "S".yellow(),
            _ => return,
        };
        eprint!("{}", indicator);

        // Newline + reset every 30 characters
        let new_count = self.progress_count.get() + 1;
        if new_count >= 30 {
            eprintln!();
            self.progress_count.set(0);
        } else {
            self.progress_count.set(new_count);
        }
    }

    fn matcher(&self, query: &str) -> Result<TextMatcher> {
        if self.is_regex {
            let re = RegexBuilder::new(query)
                .case_insensitive(!self.case_sensitive)
                .build()
                .map_err(|e| TsError::invalid_regex(query, e.to_string()))?;
            Ok(TextMatcher::Pattern(re))
        } else if self.case_sensitive {
            Ok(TextMatcher::Substring {
                needle: query.to_string(),
                case_sensitive: true,
            })
        } else {
            Ok(TextMatcher::Substring {
                needle: query.to_lowercase(),
                case_sensitive: false,
            })
        }
    }

    /// Recursively walk `base_dir` for `*.ts` files, parse each, and return
    /// messages whose **source** or **translation** matches `query`.
    ///
    /// Files that fail to parse are skipped (reported in verbose mode).
    pub fn extract(&self, base_dir: &Path, query: &str) -> Result<Vec<TranslationEntry>> {
        let files = collect_ts_files(base_dir, &self.exclusions);
        self.extract_from_files(&files, query)
    }

    /// Search an explicit list of TS files
    pub fn extract_from_files(
        &self,
        files: &[PathBuf],
        query: &str,
    ) -> Result<Vec<TranslationEntry>> {
        let matcher = self.matcher(query)?;
        let mut matches = Vec::new();
        let mut skipped_files = 0;

        for path in files {
            let catalog = match TsParser::parse_file(path) {
                Ok(catalog) => {
                    self.print_progress('.');
                    catalog
                }
                Err(e) => {
                    skipped_files += 1;
                    self.print_progress('S');
                    if self.verbose {
                        eprintln!("\nWarning: Failed to parse TS file {}: {}", path.display(), e);
                    } else {
                        warn!("skipping {}: {}", path.display(), e);
                    }
                    continue;
                }
            };

            for (context, message) in catalog.messages() {
                let hit = matcher.is_match(&message.source)
                    || message.translations().iter().any(|t| matcher.is_match(t));
                if hit {
                    matches.push(TranslationEntry::from_message(path, context, message));
                }
            }
        }

        if !self.quiet {
            // Always print final newline if we showed any progress
            if self.progress_count.get() > 0 {
                eprintln!();
                self.progress_count.set(0);
            }

            if skipped_files > 0 && self.verbose {
                eprintln!(
                    "(Skipped {} unreadable file{})",
                    skipped_files,
                    if skipped_files == 1 { "" } else { "s" }
                );
            }
        }

        Ok(matches)
    }
}

/// Every `*.ts` file below `base_dir` (or `base_dir` itself when it is a file), sorted
pub fn collect_ts_files(base_dir: &Path, exclusions: &[String]) -> Vec<PathBuf> {
    if base_dir.is_file() {
        return vec![base_dir.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(base_dir)
        .into_iter()
        .filter_entry(|e| {
            if is_ignored(e) {
                return false;
            }
            let name = e.file_name().to_string_lossy();
            !exclusions.iter().any(|excl| name == excl.as_str())
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_ts_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// `.ts` is shared with TypeScript; Qt catalogs are told apart by their content
pub fn is_ts_file(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("ts") {
        return false;
    }
    let mut head = Vec::with_capacity(SNIFF_LEN);
    let read = File::open(path).and_then(|file| file.take(SNIFF_LEN as u64).read_to_end(&mut head));
    if read.is_err() {
        return false;
    }
    let head = String::from_utf8_lossy(&head);
    head.contains("<TS") || head.contains("<!DOCTYPE TS")
}

/// Bytes read from a `.ts` file to tell a catalog from TypeScript
const SNIFF_LEN: usize = 512;

fn is_ignored(entry: &walkdir::DirEntry) -> bool {
    // Always allow the root directory of the search
    if entry.depth() == 0 {
        return false;
    }

    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.') || s == "node_modules" || s == "target")
        .unwrap_or(false)
}
