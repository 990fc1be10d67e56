//! Deterministic directory tree rendering

use std::collections::BTreeMap;

use crate::bundle::{DIR_MARKER, FILE_MARKER};

/// Nested mapping keyed by path segment. A node with children is a
/// directory, a node without is a file.
#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

impl Node {
    fn insert(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.children.entry(segment.to_string()).or_default();
        }
    }

    fn render(&self, output: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for (name, child) in &self.children {
            let marker = if child.children.is_empty() {
                FILE_MARKER
            } else {
                DIR_MARKER
            };
            output.push_str(&indent);
            output.push_str(marker);
            output.push(' ');
            output.push_str(name);
            output.push('\n');
            child.render(output, depth + 1);
        }
    }
}

/// Render a set of slash-separated paths as an indented tree, two spaces per
/// depth level, entries in lexicographic order at every level.
///
/// Input order is irrelevant and duplicates collapse, so identical path sets
/// always produce identical output.
pub fn render<I, S>(paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut root = Node::default();
    for path in paths {
        root.insert(path.as_ref());
    }

    let mut output = String::new();
    root.render(&mut output, 0);
    output
}
