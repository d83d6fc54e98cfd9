use crate::parse::TranslationStatus;
use crate::tree::{NodeType, ReferenceTree, TreeNode};

/// Formatter for rendering reference trees as text
pub struct TreeFormatter {
    max_width: usize,
}

impl TreeFormatter {
    /// Create a new TreeFormatter with default width (80 columns)
    pub fn new() -> Self {
        Self { max_width: 80 }
    }

    pub fn with_width(max_width: usize) -> Self {
        Self { max_width }
    }

    /// Format a reference tree as a string
    pub fn format(&self, tree: &ReferenceTree) -> String {
        let mut output = String::new();
        self.format_node(&tree.root, &mut output, "", true, true);
        output
    }

    fn format_node(
        &self,
        node: &TreeNode,
        output: &mut String,
        prefix: &str,
        is_last: bool,
        is_root: bool,
    ) {
        if !is_root {
            output.push_str(prefix);
            output.push_str(if is_last { "└─> " } else { "├─> " });
        }

        output.push_str(&self.format_content(node));

        if let Some(position) = &node.position {
            output.push_str(&format!(" (line {})", position.line));
        }

        output.push('\n');

        let child_count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            let is_last_child = i == child_count - 1;
            let child_prefix = if is_root {
                String::new()
            } else {
                format!("{}{}   ", prefix, if is_last { " " } else { "│" })
            };

            self.format_node(child, output, &child_prefix, is_last_child, false);
        }
    }

    fn format_content(&self, node: &TreeNode) -> String {
        match node.node_type {
            NodeType::Root => format!("'{}' (search query)", node.content),
            NodeType::File => node.content.clone(),
            NodeType::Context => format!("Context: {}", node.content),
            NodeType::Message => {
                let budget = self.max_width.saturating_sub(30) / 2;
                let source = self.truncate(&single_line(&node.content), budget);
                let translation = node
                    .metadata
                    .as_deref()
                    .map(|t| self.truncate(&single_line(t), budget))
                    .unwrap_or_default();
                let mut content = format!("'{}' => '{}'", source, translation);
                match node.status {
                    Some(TranslationStatus::Finished) | None => {}
                    Some(status) => content.push_str(&format!(" [{}]", status)),
                }
                content
            }
            NodeType::SourceRef => format!("Used in: {}", node.content),
        }
    }

    /// Truncate a string to at most `max_len` characters
    fn truncate(&self, s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }
}

impl Default for TreeFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Multi-line messages are shown on one line with visible `\n`
pub(crate) fn single_line(s: &str) -> String {
    s.replace('\n', "\\n")
}
