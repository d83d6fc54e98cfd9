use crate::parse::TranslationEntry;
use crate::tree::{NodeType, Position, ReferenceTree, TreeNode};
use crate::SearchResult;

/// Builder for constructing reference trees from search results
pub struct ReferenceTreeBuilder;

impl ReferenceTreeBuilder {
    /// Build a reference tree from search results
    ///
    /// Creates a hierarchical tree structure:
    /// - Root: search query text
    ///   - File: TS file containing matches
    ///     - Context: `<context>` name
    ///       - Message: source text, translation in metadata
    ///         - SourceRef: linked `<location>` entries
    ///
    /// Files and contexts keep the order in which they first appear.
    pub fn build(result: &SearchResult) -> ReferenceTree {
        let mut root = TreeNode::new(NodeType::Root, result.query.clone());

        for entry in &result.translation_entries {
            let file = entry.file.display().to_string();
            root.child_mut(NodeType::File, &file)
                .child_mut(NodeType::Context, &entry.context)
                .add_child(Self::build_message_node(entry));
        }

        ReferenceTree::new(root)
    }

    fn build_message_node(entry: &TranslationEntry) -> TreeNode {
        let position = Position::new(entry.file.clone(), entry.line);
        let mut node = TreeNode::with_position(NodeType::Message, entry.source.clone(), position);
        node.metadata = Some(entry.translation.clone());
        node.status = Some(entry.status);

        for location in entry.locations.iter().filter(|l| !l.is_unlinked()) {
            node.add_child(TreeNode::new(NodeType::SourceRef, location.to_string()));
        }
        node
    }
}
