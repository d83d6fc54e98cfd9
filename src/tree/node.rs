use std::path::PathBuf;

use crate::parse::TranslationStatus;

/// Type of node in the reference tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// Root node containing the search text
    Root,
    /// A TS file that produced matches
    File,
    /// `<context>` name inside a file
    Context,
    /// Matched message; content is the source text
    Message,
    /// Place in the application sources where the message is used
    SourceRef,
}

/// Position of a node in a file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: PathBuf,
    pub line: usize,
}

impl Position {
    pub fn new(file: PathBuf, line: usize) -> Self {
        Self { file, line }
    }
}

/// A node in the reference tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub node_type: NodeType,
    pub content: String,
    pub position: Option<Position>,
    /// Translated text for message nodes
    pub metadata: Option<String>,
    pub status: Option<TranslationStatus>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(node_type: NodeType, content: String) -> Self {
        Self {
            node_type,
            content,
            position: None,
            metadata: None,
            status: None,
            children: Vec::new(),
        }
    }

    pub fn with_position(node_type: NodeType, content: String, position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::new(node_type, content)
        }
    }

    pub fn add_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    /// Child of the given type and content, created on first use
    pub fn child_mut(&mut self, node_type: NodeType, content: &str) -> &mut TreeNode {
        let index = match self
            .children
            .iter()
            .position(|c| c.node_type == node_type && c.content == content)
        {
            Some(index) => index,
            None => {
                self.children.push(TreeNode::new(node_type, content.to_string()));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Total number of nodes in the subtree, this node included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    pub fn max_depth(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            1 + self.children.iter().map(|c| c.max_depth()).max().unwrap_or(0)
        }
    }
}

/// Search results arranged as query, file, context, message
#[derive(Debug)]
pub struct ReferenceTree {
    pub root: TreeNode,
}

impl ReferenceTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    /// Create a ReferenceTree with a root containing the search text
    pub fn with_search_text(search_text: String) -> Self {
        Self {
            root: TreeNode::new(NodeType::Root, search_text),
        }
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn max_depth(&self) -> usize {
        self.root.max_depth()
    }

    /// Check if the tree has any results (children of root)
    pub fn has_results(&self) -> bool {
        self.root.has_children()
    }
}
