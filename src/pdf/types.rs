//! Outline (bookmark) types shared by every container backend

use serde::{Deserialize, Serialize};

/// One outline entry, flattened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Nesting depth, 1 for top-level entries
    pub level: u32,
    /// Display title
    pub title: String,
    /// Zero-based target page, if the entry points into the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// External link target, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Bookmark {
    pub fn new(level: u32, title: impl Into<String>, page: Option<usize>) -> Self {
        Self {
            level,
            title: title.into(),
            page,
            uri: None,
        }
    }
}

/// A node of the nested outline tree, as PDF containers store it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlineNode {
    pub title: String,
    pub page: Option<usize>,
    pub uri: Option<String>,
    pub children: Vec<OutlineNode>,
}

/// The ordered, flattened outline of a document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkTable {
    entries: Vec<Bookmark>,
}

impl BookmarkTable {
    pub fn new(entries: Vec<Bookmark>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Bookmark] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest zero-based page referenced by any entry
    pub fn max_target_page(&self) -> Option<usize> {
        self.entries.iter().filter_map(|b| b.page).max()
    }

    /// Flatten an outline tree in document order (depth first)
    pub fn from_nodes(nodes: &[OutlineNode]) -> Self {
        let mut entries = Vec::new();
        flatten(nodes, 1, &mut entries);
        Self { entries }
    }

    /// Rebuild the outline tree
    ///
    /// An entry becomes a child of the closest preceding entry with a
    /// smaller level. Level 0 is treated as level 1.
    pub fn to_nodes(&self) -> Vec<OutlineNode> {
        let mut pos = 0;
        let mut roots = Vec::new();
        while pos < self.entries.len() {
            roots.extend(nest(&self.entries, &mut pos, 0));
        }
        roots
    }
}

fn flatten(nodes: &[OutlineNode], level: u32, out: &mut Vec<Bookmark>) {
    for node in nodes {
        out.push(Bookmark {
            level,
            title: node.title.clone(),
            page: node.page,
            uri: node.uri.clone(),
        });
        flatten(&node.children, level + 1, out);
    }
}

fn nest(entries: &[Bookmark], pos: &mut usize, parent_level: u32) -> Vec<OutlineNode> {
    let mut nodes = Vec::new();
    while let Some(entry) = entries.get(*pos) {
        let level = entry.level.max(1);
        if level <= parent_level {
            break;
        }
        *pos += 1;
        let children = nest(entries, pos, level);
        nodes.push(OutlineNode {
            title: entry.title.clone(),
            page: entry.page,
            uri: entry.uri.clone(),
            children,
        });
    }
    nodes
}
