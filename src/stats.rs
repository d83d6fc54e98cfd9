use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::parse::{Catalog, Context, TranslationStatus};

/// Message counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub finished: usize,
    pub unfinished: usize,
    /// Obsolete and vanished messages
    pub obsolete: usize,
}

impl Counts {
    pub fn from_context(context: &Context) -> Self {
        let mut counts = Self::default();
        for message in &context.messages {
            match message.status {
                TranslationStatus::Finished => counts.finished += 1,
                TranslationStatus::Unfinished => counts.unfinished += 1,
                TranslationStatus::Obsolete | TranslationStatus::Vanished => counts.obsolete += 1,
            }
        }
        counts
    }

    /// Messages still referenced by the application
    pub fn active(&self) -> usize {
        self.finished + self.unfinished
    }

    /// Share of active messages that are finished, in percent.
    /// A context without active messages counts as complete.
    pub fn completion(&self) -> f64 {
        match self.active() {
            0 => 100.0,
            active => self.finished as f64 * 100.0 / active as f64,
        }
    }

    fn add(&mut self, other: Counts) {
        self.finished += other.finished;
        self.unfinished += other.unfinished;
        self.obsolete += other.obsolete;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextStats {
    pub name: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub completion: f64,
}

/// Completion statistics for one catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub file: PathBuf,
    pub language: Option<String>,
    pub contexts: Vec<ContextStats>,
    pub total: Counts,
    pub completion: f64,
}

impl CatalogStats {
    pub fn new(catalog: &Catalog, file: &Path) -> Self {
        let mut total = Counts::default();
        let contexts = catalog
            .contexts
            .iter()
            .map(|context| {
                let counts = Counts::from_context(context);
                total.add(counts);
                ContextStats {
                    name: context.name.clone(),
                    counts,
                    completion: counts.completion(),
                }
            })
            .collect();

        Self {
            file: file.to_path_buf(),
            language: catalog.language.clone(),
            contexts,
            total,
            completion: total.completion(),
        }
    }
}
