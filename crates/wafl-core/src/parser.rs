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

//! Structural parser for WAFL source text.
//!
//! Turns indented text into an intermediate [`Node`] tree plus per-file
//! [`DocumentMeta`] and the [`TypeMetadata`] table captured from annotated
//! keys. Parsing is two-phase: a frame stack builds raw maps whose list
//! items accumulate in a synthetic buffer, then a pure promotion pass
//! converts buffer-bearing maps into true sequences.
//!
//! Line shapes, in classification precedence:
//!
//! ```text
//! section:   server:              opens a nested mapping
//! list item: - value              appends to the enclosing list buffer
//!            - if cond: value     conditional entry, resolved later
//! assign:    key = expression     deferred expression (or !tag call)
//! key/value: key: literal         scalar, quoted string, or !tag call
//! ```
//!
//! Blank lines, `#` comments, `%` directive lines, and `---` separators are
//! discarded before structural parsing. Unrecognized lines are silently
//! skipped; the only fatal parse error is a malformed `%WAFL` header.

use crate::document::{split_annotated_key, DocumentMeta, Mapping, Node, TypeMetadata};
use crate::error::{WaflError, WaflResult};
use crate::value::Value;

/// Result of parsing one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// The intermediate tree, directives already stripped.
    pub root: Node,
    /// Extracted `@import` / `@schema` / `@eval` directives.
    pub meta: DocumentMeta,
    /// Annotated-key table (`name<TypeName>` occurrences by dotted path).
    pub types: TypeMetadata,
}

/// Parse WAFL source text into an intermediate tree plus metadata.
///
/// The tree still contains marker nodes; resolution happens separately so
/// that imported trees can be merged before any expression is evaluated.
pub fn parse(source: &str) -> WaflResult<ParsedDocument> {
    check_version_header(source)?;

    let mut builder = Builder::new();
    let mut stack: Vec<Frame> = vec![Frame {
        indent: -1,
        map: Builder::ROOT,
        path: String::new(),
    }];
    let mut types = TypeMetadata::new();

    for raw_line in source.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || raw_line.starts_with('%')
            || raw_line.starts_with("---")
        {
            continue;
        }

        let indent = raw_line.chars().take_while(|c| c.is_whitespace()).count() as i64;
        while stack.len() > 1 && indent < stack.last().map(|f| f.indent).unwrap_or(-1) {
            stack.pop();
        }
        let frame = stack.last().cloned().unwrap_or(Frame {
            indent: -1,
            map: Builder::ROOT,
            path: String::new(),
        });

        match classify_line(trimmed) {
            LineShape::Section { key } => {
                let (base, annotation) = split_annotated_key(key);
                let path = join_path(&frame.path, base);
                if let Some(type_name) = annotation {
                    record_type(&mut types, &path, type_name);
                }
                let child = builder.new_map();
                builder.insert(frame.map, base, RawEntry::Map(child));
                stack.push(Frame {
                    indent: indent + 1,
                    map: child,
                    path,
                });
            }
            LineShape::ListItem { node } => {
                // Items land on the section opened by the last-declared key
                // when one precedes, otherwise on the current map itself.
                let target = match builder.last_map_child(frame.map) {
                    Some(child) => child,
                    None => frame.map,
                };
                builder.push_item(target, node);
            }
            LineShape::Entry { key, node } => {
                let (base, annotation) = split_annotated_key(key);
                if let Some(type_name) = annotation {
                    record_type(&mut types, &join_path(&frame.path, base), type_name);
                }
                builder.insert(frame.map, base, RawEntry::Value(node));
            }
            LineShape::Skip => {}
        }
    }

    let mut root = builder.promote(Builder::ROOT);
    let meta = match root {
        Node::Mapping(ref mut map) => extract_meta(map),
        _ => DocumentMeta::default(),
    };
    Ok(ParsedDocument { root, meta, types })
}

/// Interpret a raw literal value by syntactic form: tag call, boolean,
/// number, quoted string, or plain string (empty input is null).
pub fn interpret_value(raw: &str) -> Node {
    let trimmed = raw.trim();
    if trimmed.starts_with('!') {
        if let Some(node) = parse_tag_call(trimmed) {
            return node;
        }
    }
    Node::Scalar(Value::infer(trimmed))
}

// Annotations inside stripped directive subtrees (@schema, @eval) can never
// be navigated in the merged document, so they are not recorded.
fn record_type(types: &mut TypeMetadata, path: &str, type_name: &str) {
    if !path.starts_with('@') {
        types.record(path, type_name);
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

// --- Version header ---

/// Validate an optional leading `%WAFL 0.x` header. Absence is fine;
/// a `%WAFL` first line that does not match the pattern is fatal.
fn check_version_header(source: &str) -> WaflResult<()> {
    let first = source.lines().next().unwrap_or("");
    if first.starts_with("%WAFL") && !is_valid_header(first) {
        return Err(WaflError::format(format!("invalid WAFL header: {}", first.trim_end())));
    }
    Ok(())
}

// %WAFL <ws> 0.<digits> <trailing ws>
fn is_valid_header(line: &str) -> bool {
    let rest = match line.strip_prefix("%WAFL") {
        Some(r) => r,
        None => return false,
    };
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return false;
    }
    let version = rest.trim();
    match version.strip_prefix("0.") {
        Some(minor) => !minor.is_empty() && minor.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

// --- Line classification ---

enum LineShape<'a> {
    /// `key:` with nothing after the colon.
    Section { key: &'a str },
    /// `- value` or `- if cond: value`.
    ListItem { node: Node },
    /// `key = expr`, `key: value` — an interpreted entry for the current map.
    Entry { key: &'a str, node: Node },
    Skip,
}

fn classify_line(trimmed: &str) -> LineShape<'_> {
    // Section header: single trailing colon, no '=', not a list marker.
    if let Some(key_part) = trimmed.strip_suffix(':') {
        if !trimmed.contains('=') && !is_list_marker(trimmed) && !key_part.contains(':') {
            let key = key_part.trim();
            if !key.is_empty() {
                return LineShape::Section { key };
            }
        }
    }

    // List item.
    if is_list_marker(trimmed) {
        let content = trimmed[1..].trim();
        return LineShape::ListItem {
            node: parse_list_item(content),
        };
    }

    // Key/value: whichever of '=' or ':' comes first decides the form.
    let eq = trimmed.find('=');
    let colon = trimmed.find(':');
    match (eq, colon) {
        (Some(e), c) if c.map_or(true, |c| e < c) => {
            let key = trimmed[..e].trim();
            let value = trimmed[e + 1..].trim();
            if key.is_empty() {
                return LineShape::Skip;
            }
            // A '!' value is a tag call, not an expression.
            let node = if value.starts_with('!') {
                interpret_value(value)
            } else {
                Node::Expr(value.to_string())
            };
            LineShape::Entry { key, node }
        }
        (_, Some(c)) => {
            let key = trimmed[..c].trim();
            let value = trimmed[c + 1..].trim();
            if key.is_empty() {
                return LineShape::Skip;
            }
            // Colon-form values are literal or tagged, never expressions.
            LineShape::Entry {
                key,
                node: interpret_value(value),
            }
        }
        _ => LineShape::Skip,
    }
}

fn is_list_marker(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    chars.next() == Some('-') && chars.next().map_or(false, |c| c.is_whitespace())
}

/// Parse a list item body, recognizing the `if <cond>: <value>` guard form.
fn parse_list_item(content: &str) -> Node {
    if let Some(rest) = content.strip_prefix("if").filter(|r| {
        r.starts_with(|c: char| c.is_whitespace())
    }) {
        if let Some(colon) = rest.find(':') {
            let condition = rest[..colon].trim();
            let value = rest[colon + 1..].trim();
            if !condition.is_empty() {
                return Node::If {
                    condition: condition.to_string(),
                    value: Box::new(interpret_value(value)),
                };
            }
        }
    }
    interpret_value(content)
}

/// Parse `!name(arg1, arg2, ...)` into a tag marker. Anything that does not
/// match the shape falls back to literal interpretation.
fn parse_tag_call(trimmed: &str) -> Option<Node> {
    let rest = trimmed.strip_prefix('!')?;
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let call = &rest[name_len..];
    let inner = call.strip_prefix('(')?.strip_suffix(')')?;
    let args: Vec<String> = inner
        .split(',')
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    Some(Node::Tag {
        name: name.to_string(),
        args,
    })
}

// --- Two-phase builder ---

#[derive(Debug, Clone)]
struct Frame {
    indent: i64,
    map: usize,
    path: String,
}

enum RawEntry {
    /// A nested map held in the builder arena.
    Map(usize),
    /// A finished value node.
    Value(Node),
}

#[derive(Default)]
struct RawMap {
    entries: Vec<(String, RawEntry)>,
    /// Synthetic list buffer: accumulated `- item` nodes.
    items: Vec<Node>,
}

/// Arena of raw maps; frames address maps by index so the parse loop never
/// holds aliasing mutable borrows into the tree.
struct Builder {
    maps: Vec<RawMap>,
}

impl Builder {
    const ROOT: usize = 0;

    fn new() -> Self {
        Self {
            maps: vec![RawMap::default()],
        }
    }

    fn new_map(&mut self) -> usize {
        self.maps.push(RawMap::default());
        self.maps.len() - 1
    }

    fn insert(&mut self, map: usize, key: &str, entry: RawEntry) {
        let raw = &mut self.maps[map];
        match raw.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = entry,
            None => raw.entries.push((key.to_string(), entry)),
        }
    }

    /// Index of the map opened by the last-declared key, if the most recent
    /// entry was a section.
    fn last_map_child(&self, map: usize) -> Option<usize> {
        match self.maps[map].entries.last() {
            Some((_, RawEntry::Map(child))) => Some(*child),
            _ => None,
        }
    }

    fn push_item(&mut self, map: usize, node: Node) {
        self.maps[map].items.push(node);
    }

    /// Pure promotion pass: a map that accumulated list items becomes a true
    /// sequence; everything else becomes an ordered mapping.
    fn promote(&self, map: usize) -> Node {
        let raw = &self.maps[map];
        if !raw.items.is_empty() {
            return Node::Sequence(raw.items.clone());
        }
        let mut out = Mapping::new();
        for (key, entry) in &raw.entries {
            let node = match entry {
                RawEntry::Map(child) => self.promote(*child),
                RawEntry::Value(node) => node.clone(),
            };
            out.insert(key.clone(), node);
        }
        Node::Mapping(out)
    }
}

// --- Directive extraction ---

/// Pull the three reserved top-level directives out of the root mapping.
fn extract_meta(root: &mut Mapping) -> DocumentMeta {
    let mut meta = DocumentMeta::default();

    if let Some(node) = root.remove("@import") {
        meta.imports = match node {
            Node::Scalar(Value::String(path)) => vec![path],
            Node::Sequence(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Node::Scalar(Value::String(path)) => Some(path),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
    }

    if let Some(Node::Mapping(schema)) = root.remove("@schema") {
        meta.schema = Some(schema);
    }

    if let Some(node) = root.remove("@eval") {
        meta.eval_block = Some(node);
    }

    meta
}
