pub mod catalog;
pub mod check;
pub mod config;
pub mod error;
pub mod output;
pub mod parse;
pub mod prune;
pub mod stats;
pub mod tree;

use std::path::{Path, PathBuf};

// Re-export commonly used types
pub use catalog::{PluralRule, Translator};
pub use check::{CheckReport, Checker, Diagnostic, Rule, Severity};
pub use config::{CheckSettings, Settings};
pub use error::{Result, TsError};
pub use output::{SimpleFormatter, TreeFormatter};
pub use parse::{
    Catalog, Context, KeyExtractor, Location, Message, TranslationEntry, TranslationStatus,
    TsParser, TsWriter,
};
pub use prune::{prune, PruneOptions, PruneSummary};
pub use stats::CatalogStats;
pub use tree::{NodeType, Position, ReferenceTree, ReferenceTreeBuilder, TreeNode};

/// Query parameters for searching
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub case_sensitive: bool,
    pub is_regex: bool,
    pub base_dir: Option<PathBuf>,
    pub exclude_patterns: Vec<String>,
    pub verbose: bool,
    pub quiet: bool, // Suppress progress indicators (for --simple and --json)
}

impl SearchQuery {
    /// Case-insensitive substring search in the current directory
    pub fn new(text: String) -> Self {
        Self {
            text,
            case_sensitive: false,
            is_regex: false,
            base_dir: None,
            exclude_patterns: Vec::new(),
            verbose: false,
            quiet: false,
        }
    }

    pub fn with_regex(mut self, is_regex: bool) -> Self {
        self.is_regex = is_regex;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.base_dir = Some(base_dir);
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclude_patterns = exclusions;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Result of a search operation
#[derive(Debug, serde::Serialize)]
pub struct SearchResult {
    pub query: String,
    pub translation_entries: Vec<TranslationEntry>,
}

/// Find messages whose source or translation matches the query
///
/// `base_dir` may name a single TS file or a directory. Directories are
/// walked for TS files, skipping the default exclusions for the detected
/// project type plus any extra patterns on the query.
#[must_use = "this function returns a Result that should be handled"]
pub fn run_search(query: SearchQuery) -> Result<SearchResult> {
    let base_dir = query
        .base_dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let project_dir = if base_dir.is_file() {
        base_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        base_dir.clone()
    };
    let project_type = config::detect_project_type(&project_dir);
    log::debug!("searching {} ({:?} project)", base_dir.display(), project_type);

    let mut exclusions: Vec<String> = config::get_default_exclusions(project_type)
        .iter()
        .map(|&s| s.to_string())
        .collect();
    exclusions.extend(query.exclude_patterns.iter().cloned());

    let mut extractor = KeyExtractor::new();
    extractor.set_exclusions(exclusions);
    extractor.set_verbose(query.verbose);
    extractor.set_quiet(query.quiet);
    extractor.set_case_sensitive(query.case_sensitive);
    extractor.set_regex(query.is_regex);
    let translation_entries = extractor.extract(&base_dir, &query.text)?;

    Ok(SearchResult {
        query: query.text,
        translation_entries,
    })
}

/// Check every file with the rules enabled in `settings`
#[must_use = "this function returns a Result that should be handled"]
pub fn run_check(files: &[PathBuf], settings: &CheckSettings) -> Result<CheckReport> {
    let checker = Checker::new(settings)?;
    log::debug!("running rules: {}", checker.rule_ids().join(", "));
    Ok(checker.check_files(files))
}

/// Completion statistics for each file; the first unreadable file aborts
#[must_use = "this function returns a Result that should be handled"]
pub fn run_stats(files: &[PathBuf]) -> Result<Vec<CatalogStats>> {
    files
        .iter()
        .map(|file| {
            let catalog = TsParser::parse_file(file)?;
            Ok(CatalogStats::new(&catalog, file))
        })
        .collect()
}
