use log::debug;
use serde::Serialize;

use crate::parse::{Catalog, TranslationStatus};

/// What to drop besides obsolete messages
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    /// Also drop unfinished messages that have no translation yet
    pub drop_untranslated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneSummary {
    pub removed_messages: usize,
    pub removed_contexts: usize,
}

/// Remove obsolete and vanished messages, then contexts left empty
pub fn prune(catalog: &mut Catalog, options: PruneOptions) -> PruneSummary {
    let mut summary = PruneSummary::default();

    for context in &mut catalog.contexts {
        let before = context.messages.len();
        context.messages.retain(|m| {
            if !m.is_active() {
                return false;
            }
            !(options.drop_untranslated
                && m.status == TranslationStatus::Unfinished
                && m.is_translation_empty())
        });
        summary.removed_messages += before - context.messages.len();
    }

    let before = catalog.contexts.len();
    catalog.contexts.retain(|c| !c.messages.is_empty());
    summary.removed_contexts = before - catalog.contexts.len();

    debug!(
        "pruned {} messages and {} contexts",
        summary.removed_messages, summary.removed_contexts
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Context, Message};

    fn catalog() -> Catalog {
        Catalog::new("fr")
            .with_context(
                Context::new("Graph3D")
                    .with_message(Message::new("Surface").with_translation("Surface"))
                    .with_message(Message::new("Mesh").with_status(TranslationStatus::Unfinished))
                    .with_message(
                        Message::new("Old")
                            .with_translation("Ancien")
                            .with_status(TranslationStatus::Obsolete),
                    ),
            )
            .with_context(Context::new("Removed").with_message(
                Message::new("Gone").with_status(TranslationStatus::Vanished),
            ))
    }

    #[test]
    fn test_prune_obsolete() {
        let mut catalog = catalog();
        let summary = prune(&mut catalog, PruneOptions::default());
        assert_eq!(summary.removed_messages, 2);
        assert_eq!(summary.removed_contexts, 1);
        assert_eq!(catalog.contexts.len(), 1);
        assert_eq!(catalog.contexts[0].messages.len(), 2);
    }

    #[test]
    fn test_prune_untranslated() {
        let mut catalog = catalog();
        let summary = prune(
            &mut catalog,
            PruneOptions {
                drop_untranslated: true,
            },
        );
        assert_eq!(summary.removed_messages, 3);
        assert_eq!(catalog.contexts[0].messages[0].source, "Surface");
    }
}
