//! Inclusion Path Resolver
//!
//! Turns dotted inclusion paths (`"posts"`, `"posts.tags"`) into a tree of
//! relation names. Paths sharing a prefix merge into one node; siblings keep
//! the order in which they were first seen. Names are not checked against
//! any schema here.

use std::fmt;

/// Separator between segments of one path
pub const PATH_SEPARATOR: char = '.';

/// Separator between paths in a query-string list (`include=a,b.c`)
pub const LIST_SEPARATOR: char = ',';

/// Tree of requested inclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionTree {
    nodes: Vec<(String, InclusionTree)>,
}

impl InclusionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from dotted paths.
    pub fn parse<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    /// Build a tree from a comma-separated list of dotted paths.
    pub fn from_query(raw: &str) -> Self {
        Self::parse(raw.split(LIST_SEPARATOR))
    }

    /// Add one dotted path. Blank segments are skipped.
    pub fn insert(&mut self, path: &str) {
        let mut node = self;
        for segment in path
            .split(PATH_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            node = node.child_mut(segment);
        }
    }

    /// Merge every path of `other` into this tree.
    pub fn merge(&mut self, other: &InclusionTree) {
        for (name, children) in &other.nodes {
            self.child_mut(name).merge(children);
        }
    }

    fn child_mut(&mut self, name: &str) -> &mut InclusionTree {
        let index = match self.nodes.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.nodes.push((name.to_string(), InclusionTree::new()));
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[index].1
    }

    /// Nested inclusions under `name`.
    pub fn get(&self, name: &str) -> Option<&InclusionTree> {
        self.nodes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, children)| children)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Top-level names with their nested trees, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InclusionTree)> {
        self.nodes.iter().map(|(name, children)| (name.as_str(), children))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Flatten back to one dotted path per leaf.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (name, children) in &self.nodes {
            if children.is_empty() {
                out.push(name.clone());
            } else {
                out.extend(
                    children
                        .paths()
                        .into_iter()
                        .map(|rest| format!("{}{}{}", name, PATH_SEPARATOR, rest)),
                );
            }
        }
        out
    }
}

impl<S: AsRef<str>> FromIterator<S> for InclusionTree {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::parse(iter)
    }
}

impl fmt::Display for InclusionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.paths().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_prefix_merges() {
        let tree = InclusionTree::parse(["posts", "posts.tags", "posts.author"]);

        assert_eq!(tree.len(), 1);
        let posts = tree.get("posts").unwrap();
        let names: Vec<&str> = posts.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["tags", "author"]);
    }

    #[test]
    fn test_sibling_order_is_first_occurrence() {
        let tree = InclusionTree::parse(["isOfAge", "posts.tags", "posts", "isOfAge"]);
        let names: Vec<&str> = tree.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["isOfAge", "posts"]);
    }

    #[test]
    fn test_blank_segments_are_skipped() {
        let tree = InclusionTree::parse(["", " posts . ", "posts..tags"]);
        assert_eq!(tree.paths(), vec!["posts.tags"]);
        assert!(InclusionTree::parse(["", "."]).is_empty());
    }

    #[test]
    fn test_from_query() {
        let tree = InclusionTree::from_query("posts.tags, author,");
        assert_eq!(tree.paths(), vec!["posts.tags", "author"]);
        assert_eq!(tree.to_string(), "posts.tags,author");
    }

    #[test]
    fn test_deep_paths_flatten_per_leaf() {
        let tree: InclusionTree = ["a.b.c", "a.d", "e"].into_iter().collect();
        assert_eq!(tree.paths(), vec!["a.b.c", "a.d", "e"]);
        assert!(tree.get("a").unwrap().get("b").unwrap().contains("c"));
    }

    #[test]
    fn test_merge_is_additive() {
        let mut tree = InclusionTree::parse(["posts"]);
        tree.merge(&InclusionTree::parse(["posts.tags", "author"]));
        assert_eq!(tree.paths(), vec!["posts.tags", "author"]);
    }
}
