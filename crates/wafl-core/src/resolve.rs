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

//! Value interpreter: rewrites marker nodes into concrete values.
//!
//! Resolution is a full-tree rewrite. Expression markers evaluate through
//! the sub-language in [`crate::expr`]; tag markers dispatch through the
//! [`TagRegistry`]; conditional sequence entries are kept or dropped by
//! their guard. Expression failures degrade to the original source text
//! plus a collected [`Warning`] — only tag and file errors are fatal here.
//!
//! Resolving an already-resolved tree is the identity: no markers remain,
//! and scalar leaves pass through unchanged.

use crate::document::{split_annotated_key, Mapping, Node};
use crate::error::{Warning, WaflResult};
use crate::expr;
use crate::tags::{TagContext, TagRegistry};
use crate::value::{Bindings, Value};

/// Tree-rewriting resolver. Owns nothing but borrowed bindings and the
/// warning sink; one instance per load, never shared across loads.
pub struct Resolver<'a> {
    env: &'a Bindings,
    symbols: &'a Bindings,
    registry: &'a TagRegistry,
    ctx: TagContext,
    warnings: Vec<Warning>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        env: &'a Bindings,
        symbols: &'a Bindings,
        registry: &'a TagRegistry,
        ctx: TagContext,
    ) -> Self {
        Self {
            env,
            symbols,
            registry,
            ctx,
            warnings: Vec::new(),
        }
    }

    /// Diagnostics collected so far (expression failures, dropped guards).
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consume the resolver, returning its diagnostics.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Rewrite a tree into marker-free form.
    pub fn resolve(&mut self, node: &Node) -> WaflResult<Node> {
        match node {
            Node::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Node::If { condition, value } => {
                            // Guard failure counts as false, never fatal.
                            if self.eval_condition(condition) {
                                out.push(self.resolve(value)?);
                            }
                        }
                        other => out.push(self.resolve(other)?),
                    }
                }
                Ok(Node::Sequence(out))
            }
            Node::Mapping(map) => {
                let mut out = Mapping::new();
                for (key, value) in map.iter() {
                    // Safety net for annotated keys the parser did not see.
                    let (base, _) = split_annotated_key(key);
                    out.insert(base.to_string(), self.resolve(value)?);
                }
                Ok(Node::Mapping(out))
            }
            Node::Expr(source) => Ok(Node::Scalar(self.eval_expression(source))),
            Node::Tag { name, args } => {
                let value = self.registry.run(name, args, self.env, &self.ctx)?;
                Ok(Node::Scalar(value))
            }
            Node::If { condition, value } => {
                // A conditional outside a sequence cannot be spliced away;
                // a false guard leaves null.
                if self.eval_condition(condition) {
                    self.resolve(value)
                } else {
                    Ok(Node::null())
                }
            }
            Node::Scalar(Value::String(s)) if s.trim_start().starts_with("$ENV") => {
                Ok(Node::Scalar(self.eval_expression(s)))
            }
            Node::Scalar(v) => Ok(Node::Scalar(v.clone())),
        }
    }

    /// Evaluate an expression, degrading failure to the original text.
    fn eval_expression(&mut self, source: &str) -> Value {
        match expr::evaluate(source, self.env, self.symbols) {
            Ok(value) => value,
            Err(e) => {
                self.warn(format!("failed to evaluate '{}': {}", source, e));
                Value::String(source.to_string())
            }
        }
    }

    fn eval_condition(&mut self, condition: &str) -> bool {
        match expr::evaluate(condition, self.env, self.symbols) {
            Ok(value) => value.is_truthy(),
            Err(e) => {
                self.warn(format!(
                    "condition '{}' failed to evaluate, dropping entry: {}",
                    condition, e
                ));
                false
            }
        }
    }

    fn warn(&mut self, message: String) {
        if !self.warnings.iter().any(|w| w.message == message) {
            self.warnings.push(Warning::new(message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaflErrorKind;

    fn bindings(pairs: &[(&str, Value)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn resolve_with_env(node: &Node, env: &Bindings) -> (WaflResult<Node>, Vec<Warning>) {
        let symbols = Bindings::new();
        let registry = TagRegistry::with_builtins();
        let mut resolver = Resolver::new(env, &symbols, &registry, TagContext::default());
        let result = resolver.resolve(node);
        (result, resolver.into_warnings())
    }

    #[test]
    fn test_expression_marker_evaluates() {
        let env = Bindings::new();
        let (out, warnings) = resolve_with_env(&Node::Expr("1 + 2".into()), &env);
        assert_eq!(out.unwrap(), Node::Scalar(Value::Int(3)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_expression_failure_degrades_to_text_with_warning() {
        let env = Bindings::new();
        let (out, warnings) = resolve_with_env(&Node::Expr("1 +".into()), &env);
        assert_eq!(out.unwrap(), Node::Scalar(Value::String("1 +".into())));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("1 +"));
    }

    #[test]
    fn test_tag_marker_dispatches() {
        let env = Bindings::new();
        let node = Node::Tag {
            name: "rgb".into(),
            args: vec!["10".into(), "20".into(), "30".into()],
        };
        let (out, _) = resolve_with_env(&node, &env);
        assert_eq!(
            out.unwrap(),
            Node::Scalar(Value::String("rgb(10, 20, 30)".into()))
        );
    }

    #[test]
    fn test_tag_error_is_fatal_even_deep_in_the_tree() {
        let env = Bindings::new();
        let mut map = Mapping::new();
        map.insert(
            "color",
            Node::Tag {
                name: "rgb".into(),
                args: vec!["10".into(), "20".into()],
            },
        );
        let (out, _) = resolve_with_env(&Node::Mapping(map), &env);
        assert_eq!(out.unwrap_err().kind, WaflErrorKind::Tag);
    }

    #[test]
    fn test_conditional_filtering() {
        let env = bindings(&[("ENABLED", Value::Bool(true))]);
        let seq = Node::Sequence(vec![
            Node::If {
                condition: "$ENV.ENABLED".into(),
                value: Box::new(Node::Scalar(Value::Int(1))),
            },
            Node::If {
                condition: "$ENV.MISSING".into(),
                value: Box::new(Node::Scalar(Value::Int(2))),
            },
            Node::Scalar(Value::Int(3)),
        ]);
        let (out, _) = resolve_with_env(&seq, &env);
        assert_eq!(
            out.unwrap(),
            Node::Sequence(vec![Node::Scalar(Value::Int(1)), Node::Scalar(Value::Int(3))])
        );
    }

    #[test]
    fn test_condition_evaluation_failure_drops_entry() {
        let env = Bindings::new();
        let seq = Node::Sequence(vec![
            Node::If {
                condition: "not ~ valid".into(),
                value: Box::new(Node::Scalar(Value::Int(1))),
            },
            Node::Scalar(Value::Int(2)),
        ]);
        let (out, warnings) = resolve_with_env(&seq, &env);
        assert_eq!(out.unwrap(), Node::Sequence(vec![Node::Scalar(Value::Int(2))]));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_expression_fallback_keeps_falsy_binding() {
        let env = bindings(&[("WORKERS", Value::Int(0))]);
        let (out, warnings) = resolve_with_env(&Node::Expr("$ENV.WORKERS || 4".into()), &env);
        assert_eq!(out.unwrap(), Node::Scalar(Value::Int(0)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_inline_env_string_resolves() {
        let env = bindings(&[("VALUE", Value::Int(5))]);
        let node = Node::Scalar(Value::String("$ENV.VALUE || 0".into()));
        let (out, _) = resolve_with_env(&node, &env);
        assert_eq!(out.unwrap(), Node::Scalar(Value::Int(5)));
    }

    #[test]
    fn test_plain_strings_pass_through() {
        let env = Bindings::new();
        let node = Node::Scalar(Value::String("just text".into()));
        let (out, warnings) = resolve_with_env(&node, &env);
        assert_eq!(out.unwrap(), Node::Scalar(Value::String("just text".into())));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_annotated_keys_stripped_during_resolution() {
        let env = Bindings::new();
        let mut map = Mapping::new();
        map.insert("app<App>", Node::Scalar(Value::Int(1)));
        let (out, _) = resolve_with_env(&Node::Mapping(map), &env);
        let out = out.unwrap();
        let out_map = out.as_mapping().unwrap();
        assert!(out_map.contains_key("app"));
        assert!(!out_map.contains_key("app<App>"));
    }

    #[test]
    fn test_resolution_is_idempotent_on_resolved_trees() {
        let env = bindings(&[("ENABLED", Value::Bool(true))]);
        let mut map = Mapping::new();
        map.insert("count", Node::Expr("1 + 2".into()));
        map.insert(
            "list",
            Node::Sequence(vec![
                Node::If {
                    condition: "$ENV.ENABLED".into(),
                    value: Box::new(Node::Scalar(Value::Int(1))),
                },
                Node::Scalar(Value::Int(3)),
            ]),
        );
        let tree = Node::Mapping(map);

        let (first, _) = resolve_with_env(&tree, &env);
        let first = first.unwrap();
        assert!(!first.has_markers());

        let (second, warnings) = resolve_with_env(&first, &env);
        assert_eq!(second.unwrap(), first);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_nested_structure_resolution() {
        let env = bindings(&[("PORT", Value::Int(4242))]);
        let mut inner = Mapping::new();
        inner.insert("port", Node::Expr("$ENV.PORT || 3000".into()));
        inner.insert("name", Node::Scalar(Value::String("Demo".into())));
        let mut map = Mapping::new();
        map.insert("app", Node::Mapping(inner));

        let (out, _) = resolve_with_env(&Node::Mapping(map), &env);
        let out = out.unwrap();
        let app = out.as_mapping().unwrap().get("app").unwrap().as_mapping().unwrap();
        assert_eq!(app.get("port"), Some(&Node::Scalar(Value::Int(4242))));
    }
}
