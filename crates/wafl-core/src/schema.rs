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

//! Schema validator for evaluated value trees.
//!
//! Type specs come from an `@schema` block: primitive names (`string`,
//! `int`/`number`, `bool`/`boolean`), `list<T>`, or an inline object whose
//! field names may carry a trailing `?` for optional fields. Validation is
//! driven by the [`TypeMetadata`] captured from annotated keys during
//! parsing, with a fallback scan of top-level `name<TypeName>` keys for
//! trees built without metadata. No coercion anywhere: a numeric string
//! does not satisfy `int`.
//!
//! The first mismatch aborts with a [`WaflError`] naming the dotted path
//! and the expected and actual kinds; soft conditions (unknown type name,
//! unnavigable path) are skipped with a warning.

use crate::document::{split_annotated_key, Mapping, Node, TypeMetadata};
use crate::error::{Warning, WaflError, WaflResult};
use crate::value::Value;

/// A resolved type specification.
enum TypeSpec<'a> {
    String,
    Number,
    Boolean,
    List(Box<TypeSpec<'a>>),
    Object(&'a Mapping),
}

/// Check an evaluated value tree against a schema block.
///
/// Soft skips (unknown type names, paths absent from the document) are
/// appended to `warnings`; any real mismatch is fatal and returned as the
/// sole error for the load.
pub fn validate(
    doc: &Node,
    schema: &Mapping,
    types: &TypeMetadata,
    warnings: &mut Vec<Warning>,
) -> WaflResult<()> {
    if !types.is_empty() {
        for (path, type_name) in types.iter() {
            let spec = match schema.get(type_name) {
                Some(spec) => spec,
                None => {
                    warnings.push(Warning::new(format!(
                        "type '{}' not found in schema, skipping '{}'",
                        type_name, path
                    )));
                    continue;
                }
            };
            let value = match navigate(doc, path) {
                Some(value) => value,
                None => {
                    warnings.push(Warning::new(format!(
                        "no value at '{}', skipping check against '{}'",
                        path, type_name
                    )));
                    continue;
                }
            };
            assert_type(path, value, &resolve_type(spec, path)?)?;
        }
        return Ok(());
    }

    // Fallback: scan the document's own top-level keys for annotations
    // (covers trees assembled without parser metadata).
    if let Node::Mapping(map) = doc {
        for (key, value) in map.iter() {
            let (base, annotation) = split_annotated_key(key);
            let type_name = match annotation {
                Some(t) => t,
                None => continue,
            };
            let spec = match schema.get(type_name) {
                Some(spec) => spec,
                None => {
                    warnings.push(Warning::new(format!(
                        "type '{}' not found in schema, skipping '{}'",
                        type_name, base
                    )));
                    continue;
                }
            };
            assert_type(base, value, &resolve_type(spec, base)?)?;
        }
    }
    Ok(())
}

/// Follow a dotted path through nested mappings.
fn navigate<'a>(doc: &'a Node, path: &str) -> Option<&'a Node> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_mapping()?.get(segment)?;
    }
    Some(current)
}

/// Resolve a spec node (string form or inline object) into a [`TypeSpec`].
fn resolve_type<'a>(spec: &'a Node, path: &str) -> WaflResult<TypeSpec<'a>> {
    match spec {
        Node::Scalar(Value::String(name)) => resolve_type_name(name, path),
        Node::Mapping(fields) => Ok(TypeSpec::Object(fields)),
        other => Err(WaflError::validation(format!(
            "invalid schema type: {}",
            other.kind_name()
        ))
        .with_context(path.to_string())),
    }
}

fn resolve_type_name<'a>(name: &str, path: &str) -> WaflResult<TypeSpec<'a>> {
    if let Some(inner) = name.strip_prefix("list<").and_then(|s| s.strip_suffix('>')) {
        return Ok(TypeSpec::List(Box::new(resolve_type_name(inner, path)?)));
    }
    match name {
        "string" => Ok(TypeSpec::String),
        "int" | "number" => Ok(TypeSpec::Number),
        "bool" | "boolean" => Ok(TypeSpec::Boolean),
        other => Err(
            WaflError::validation(format!("invalid schema type: '{}'", other))
                .with_context(path.to_string()),
        ),
    }
}

/// Split an optional field name: `debug?` is optional, `debug` required.
fn parse_field_name(field: &str) -> (&str, bool) {
    match field.strip_suffix('?') {
        Some(name) => (name, true),
        None => (field, false),
    }
}

fn assert_type(path: &str, value: &Node, spec: &TypeSpec) -> WaflResult<()> {
    match spec {
        TypeSpec::String => expect_kind(path, value, "string"),
        TypeSpec::Number => expect_kind(path, value, "number"),
        TypeSpec::Boolean => expect_kind(path, value, "boolean"),
        TypeSpec::List(of) => {
            let items = value.as_sequence().ok_or_else(|| mismatch(path, "list", value))?;
            for (i, item) in items.iter().enumerate() {
                assert_type(&format!("{}[{}]", path, i), item, of)?;
            }
            Ok(())
        }
        TypeSpec::Object(fields) => {
            let map = value.as_mapping().ok_or_else(|| mismatch(path, "object", value))?;
            for (field, field_spec) in fields.iter() {
                let (name, optional) = parse_field_name(field);
                match map.get(name).filter(|v| !matches!(v, Node::Scalar(Value::Null))) {
                    Some(field_value) => {
                        let field_path = format!("{}.{}", path, name);
                        let resolved = resolve_type(field_spec, &field_path)?;
                        assert_type(&field_path, field_value, &resolved)?;
                    }
                    None if optional => {}
                    None => {
                        return Err(WaflError::validation(format!(
                            "required field '{}' is missing",
                            name
                        ))
                        .with_context(path.to_string()));
                    }
                }
            }
            Ok(())
        }
    }
}

fn expect_kind(path: &str, value: &Node, expected: &'static str) -> WaflResult<()> {
    if value.kind_name() == expected {
        Ok(())
    } else {
        Err(mismatch(path, expected, value))
    }
}

fn mismatch(path: &str, expected: &str, value: &Node) -> WaflError {
    WaflError::validation(format!(
        "expected {}, got {}",
        expected,
        value.kind_name()
    ))
    .with_context(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaflErrorKind;
    use crate::parser::parse;

    fn schema_and_doc(src: &str) -> (Mapping, Node, TypeMetadata) {
        let parsed = parse(src).unwrap();
        (
            parsed.meta.schema.expect("schema block"),
            parsed.root,
            parsed.types,
        )
    }

    fn check(src: &str) -> (WaflResult<()>, Vec<Warning>) {
        let (schema, doc, types) = schema_and_doc(src);
        let mut warnings = Vec::new();
        let result = validate(&doc, &schema, &types, &mut warnings);
        (result, warnings)
    }

    #[test]
    fn test_valid_document_passes() {
        let (result, warnings) = check(
            "@schema:\n  App:\n    name: string\n    port: int\n    debug?: boolean\n\napp<App>:\n  name: \"Demo\"\n  port: 8080\n  debug: false\n",
        );
        assert!(result.is_ok());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_optional_field_may_be_absent() {
        let (result, _) = check(
            "@schema:\n  App:\n    name: string\n    debug?: boolean\n\napp<App>:\n  name: \"Demo\"\n",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_required_field_names_field_and_path() {
        let (result, _) = check(
            "@schema:\n  App:\n    name: string\n    port: int\n\napp<App>:\n  name: \"Demo\"\n",
        );
        let err = result.unwrap_err();
        assert_eq!(err.kind, WaflErrorKind::Validation);
        assert!(err.message.contains("'port'"));
        assert_eq!(err.context.as_deref(), Some("app"));
    }

    #[test]
    fn test_kind_mismatch_no_coercion() {
        let (result, _) = check(
            "@schema:\n  App:\n    port: int\n\napp<App>:\n  port: \"8080\"\n",
        );
        let err = result.unwrap_err();
        assert_eq!(err.kind, WaflErrorKind::Validation);
        assert!(err.message.contains("expected number"));
        assert!(err.message.contains("got string"));
        assert_eq!(err.context.as_deref(), Some("app.port"));
    }

    #[test]
    fn test_list_of_primitive() {
        let (result, _) = check(
            "@schema:\n  App:\n    features: list<string>\n\napp<App>:\n  features:\n    - auth\n    - metrics\n",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_list_element_mismatch_names_index() {
        let (result, _) = check(
            "@schema:\n  App:\n    features: list<string>\n\napp<App>:\n  features:\n    - auth\n    - 42\n",
        );
        let err = result.unwrap_err();
        assert_eq!(err.context.as_deref(), Some("app.features[1]"));
    }

    #[test]
    fn test_list_kind_required() {
        let (result, _) = check(
            "@schema:\n  App:\n    features: list<string>\n\napp<App>:\n  features: solo\n",
        );
        let err = result.unwrap_err();
        assert!(err.message.contains("expected list"));
    }

    #[test]
    fn test_nested_object_spec() {
        let (result, _) = check(
            "@schema:\n  App:\n    server:\n      host: string\n      port: int\n\napp<App>:\n  server:\n    host: localhost\n    port: 80\n",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_type_name_warns_and_skips() {
        let (result, warnings) = check("@schema:\n  App:\n    name: string\n\nconf<Ghost>:\n  x: 1\n");
        assert!(result.is_ok());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Ghost"));
    }

    #[test]
    fn test_missing_path_warns_and_skips() {
        // Annotation recorded, but the key's value was merged away to a
        // different shape; navigation failure is soft.
        let (schema, _doc, mut types) = schema_and_doc(
            "@schema:\n  App:\n    name: string\n\napp<App>:\n  name: x\n",
        );
        types.record("gone.away", "App");
        let mut warnings = Vec::new();
        let doc = Node::empty_mapping();
        let result = validate(&doc, &schema, &types, &mut warnings);
        assert!(result.is_ok());
        assert!(!warnings.is_empty());
    }

    #[test]
    fn test_fallback_scan_of_annotated_keys() {
        // No parser metadata: build the tree by hand with an annotated key.
        let mut app = Mapping::new();
        app.insert("name", Node::Scalar(Value::String("Demo".into())));
        let mut root = Mapping::new();
        root.insert("app<App>", Node::Mapping(app));
        let doc = Node::Mapping(root);

        let parsed = parse("@schema:\n  App:\n    name: string\n    port: int\n").unwrap();
        let schema = parsed.meta.schema.unwrap();
        let mut warnings = Vec::new();
        let err = validate(&doc, &schema, &TypeMetadata::new(), &mut warnings).unwrap_err();
        assert!(err.message.contains("'port'"));
        assert_eq!(err.context.as_deref(), Some("app"));
    }

    #[test]
    fn test_null_required_field_is_missing() {
        let (result, _) = check(
            "@schema:\n  App:\n    name: string\n\napp<App>:\n  name:\n",
        );
        // `name:` with no body parses as an empty section -> not a string
        assert!(result.is_err());
    }

    #[test]
    fn test_int_and_number_are_interchangeable() {
        let (result, _) = check("@schema:\n  App:\n    rate: number\n\napp<App>:\n  rate: 0.25\n");
        assert!(result.is_ok());
    }

    #[test]
    fn test_bad_type_name_in_schema_is_fatal() {
        let (result, _) = check("@schema:\n  App:\n    name: wibble\n\napp<App>:\n  name: x\n");
        let err = result.unwrap_err();
        assert_eq!(err.kind, WaflErrorKind::Validation);
        assert!(err.message.contains("wibble"));
    }
}
