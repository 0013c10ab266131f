// WAFL - Indentation-structured configuration document language
//
// Copyright (c) 2026 WAFL contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Intermediate tree model for WAFL documents.
//!
//! The parser produces a [`Node`] tree containing three marker variants
//! ([`Node::Expr`], [`Node::Tag`], [`Node::If`]) for deferred work. The
//! resolver rewrites markers into concrete values; the final value tree
//! contains only mappings, sequences, and scalars.

use crate::value::Value;

/// A node in the intermediate (and final) document tree.
///
/// This is a closed sum type: every traversal site matches exhaustively, so
/// a new marker kind cannot be silently ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A scalar leaf.
    Scalar(Value),
    /// An ordered key/value mapping with unique keys.
    Mapping(Mapping),
    /// An ordered sequence of nodes.
    Sequence(Vec<Node>),
    /// Deferred expression from a `key = expr` line.
    Expr(String),
    /// Deferred tag call from a `!name(args)` value.
    Tag { name: String, args: Vec<String> },
    /// Conditional sequence entry from `- if cond: value`.
    If { condition: String, value: Box<Node> },
}

impl Node {
    /// Empty mapping node.
    pub fn empty_mapping() -> Node {
        Node::Mapping(Mapping::new())
    }

    /// Null scalar node.
    pub fn null() -> Node {
        Node::Scalar(Value::Null)
    }

    /// Returns true if this node is one of the three marker kinds, at any
    /// depth. The resolver's output invariant is that this is false.
    pub fn has_markers(&self) -> bool {
        match self {
            Node::Scalar(_) => false,
            Node::Expr(_) | Node::Tag { .. } | Node::If { .. } => true,
            Node::Mapping(map) => map.values().any(Node::has_markers),
            Node::Sequence(items) => items.iter().any(Node::has_markers),
        }
    }

    /// Try to view this node as a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Try to view this node as a sequence.
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Try to view this node as a scalar.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Node::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Short runtime-kind name used in validation error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(Value::Null) => "null",
            Node::Scalar(Value::Bool(_)) => "boolean",
            Node::Scalar(Value::Int(_)) | Node::Scalar(Value::Float(_)) => "number",
            Node::Scalar(Value::String(_)) => "string",
            Node::Mapping(_) => "object",
            Node::Sequence(_) => "list",
            Node::Expr(_) => "expression",
            Node::Tag { .. } => "tag",
            Node::If { .. } => "conditional",
        }
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Node::Scalar(v)
    }
}

/// An insertion-ordered mapping with unique keys.
///
/// Document key order is meaningful (it survives merge and serialization),
/// so this is a small vector-backed map rather than a sorted one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a key, replacing any existing entry in place (the key keeps
    /// its original position).
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((key, node)),
        }
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Key of the most recently inserted entry.
    pub fn last_key(&self) -> Option<&str> {
        self.entries.last().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl FromIterator<(String, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Per-file metadata extracted from the reserved top-level directives.
///
/// Directives are stripped from the tree before merge and evaluation; they
/// never appear in the final value tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMeta {
    /// `@import`: paths relative to the declaring file's directory.
    pub imports: Vec<String>,
    /// `@schema`: type-name to field-spec mapping.
    pub schema: Option<Mapping>,
    /// `@eval`: reserved secondary block, carried but not consumed.
    pub eval_block: Option<Node>,
}

/// Dotted-path to declared-type-name table captured from annotated keys
/// (`name<TypeName>`) during parsing and consulted after evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMetadata {
    entries: Vec<(String, String)>,
}

impl TypeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record a declared type for a dotted path, replacing an earlier entry
    /// for the same path.
    pub fn record(&mut self, path: impl Into<String>, type_name: impl Into<String>) {
        let path = path.into();
        let type_name = type_name.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, t)) => *t = type_name,
            None => self.entries.push((path, type_name)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }

    /// Fold another table into this one without overriding existing paths.
    /// Used when an importing file inherits annotations from its imports.
    pub fn extend_missing(&mut self, other: &TypeMetadata) {
        for (path, ty) in other.iter() {
            if self.get(path).is_none() {
                self.entries.push((path.to_string(), ty.to_string()));
            }
        }
    }
}

/// Split a key of the form `name<TypeName>` into its semantic base name and
/// declared type. Keys without a well-formed annotation pass through whole.
pub fn split_annotated_key(key: &str) -> (&str, Option<&str>) {
    if let Some(open) = key.find('<') {
        if let Some(stripped) = key[open..].strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            let valid = !stripped.is_empty()
                && stripped
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if valid {
                return (&key[..open], Some(stripped));
            }
        }
    }
    (key, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_preserves_insertion_order() {
        let mut map = Mapping::new();
        map.insert("zeta", Node::null());
        map.insert("alpha", Node::null());
        map.insert("mid", Node::null());
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_mapping_insert_replaces_in_place() {
        let mut map = Mapping::new();
        map.insert("a", Node::Scalar(Value::Int(1)));
        map.insert("b", Node::Scalar(Value::Int(2)));
        map.insert("a", Node::Scalar(Value::Int(3)));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&Node::Scalar(Value::Int(3))));
        assert_eq!(map.keys().next(), Some("a"));
    }

    #[test]
    fn test_mapping_remove_preserves_order() {
        let mut map = Mapping::new();
        map.insert("a", Node::null());
        map.insert("b", Node::Scalar(Value::Int(9)));
        map.insert("c", Node::null());
        assert_eq!(map.remove("b"), Some(Node::Scalar(Value::Int(9))));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(map.remove("b"), None);
    }

    #[test]
    fn test_mapping_last_key() {
        let mut map = Mapping::new();
        assert_eq!(map.last_key(), None);
        map.insert("first", Node::null());
        map.insert("second", Node::null());
        assert_eq!(map.last_key(), Some("second"));
    }

    #[test]
    fn test_has_markers() {
        assert!(!Node::Scalar(Value::Int(1)).has_markers());
        assert!(Node::Expr("1 + 2".into()).has_markers());

        let mut map = Mapping::new();
        map.insert(
            "color",
            Node::Tag {
                name: "rgb".into(),
                args: vec!["1".into(), "2".into(), "3".into()],
            },
        );
        assert!(Node::Mapping(map).has_markers());

        let seq = Node::Sequence(vec![
            Node::Scalar(Value::Int(1)),
            Node::If {
                condition: "$ENV.X".into(),
                value: Box::new(Node::null()),
            },
        ]);
        assert!(seq.has_markers());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Node::Scalar(Value::Int(1)).kind_name(), "number");
        assert_eq!(Node::Scalar(Value::Float(1.5)).kind_name(), "number");
        assert_eq!(Node::Scalar(Value::Bool(true)).kind_name(), "boolean");
        assert_eq!(Node::Scalar(Value::String("s".into())).kind_name(), "string");
        assert_eq!(Node::empty_mapping().kind_name(), "object");
        assert_eq!(Node::Sequence(vec![]).kind_name(), "list");
        assert_eq!(Node::null().kind_name(), "null");
    }

    #[test]
    fn test_split_annotated_key() {
        assert_eq!(split_annotated_key("app<App>"), ("app", Some("App")));
        assert_eq!(split_annotated_key("tls<Tls_1>"), ("tls", Some("Tls_1")));
        assert_eq!(split_annotated_key("plain"), ("plain", None));
        // Malformed annotations pass through whole
        assert_eq!(split_annotated_key("a<b c>"), ("a<b c>", None));
        assert_eq!(split_annotated_key("a<>"), ("a<>", None));
        assert_eq!(split_annotated_key("a<b"), ("a<b", None));
    }

    #[test]
    fn test_type_metadata_record_and_extend() {
        let mut entry = TypeMetadata::new();
        entry.record("app", "App");

        let mut imported = TypeMetadata::new();
        imported.record("app", "Other");
        imported.record("db", "Database");

        entry.extend_missing(&imported);
        // Entry file wins on conflicts, new paths are appended
        assert_eq!(entry.get("app"), Some("App"));
        assert_eq!(entry.get("db"), Some("Database"));
        assert_eq!(entry.len(), 2);
    }
}
