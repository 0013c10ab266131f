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

//! End-to-end tests for the full loading pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use wafl::{
    load_from_path, load_from_source, Bindings, LoadOptions, Node, TagRegistry, Value,
    WaflErrorKind,
};

fn env(pairs: &[(&str, Value)]) -> Bindings {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn get<'a>(node: &'a Node, path: &str) -> &'a Node {
    let mut current = node;
    for segment in path.split('.') {
        current = current
            .as_mapping()
            .unwrap_or_else(|| panic!("{} is not a mapping", segment))
            .get(segment)
            .unwrap_or_else(|| panic!("missing key {}", segment));
    }
    current
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_full_document_from_string() {
    let source = "\
%WAFL 0.2

app<App>:
  name: \"Demo\"
  port = $ENV.PORT || 3000
  features:
    - auth
    - if $ENV.BETA: experiments

@schema:
  App:
    name: string
    port: int
    features: list<string>
";
    let options = LoadOptions::new().with_env(env(&[("PORT", Value::Int(4242))]));
    let loaded = load_from_source(source, &options).unwrap();

    assert_eq!(get(&loaded.value, "app.name").as_scalar(), Some(&Value::String("Demo".into())));
    assert_eq!(get(&loaded.value, "app.port").as_scalar(), Some(&Value::Int(4242)));
    let features = get(&loaded.value, "app.features").as_sequence().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].as_scalar(), Some(&Value::String("auth".into())));
    assert!(loaded.warnings.is_empty());
    assert!(!loaded.value.has_markers());
}

#[test]
fn test_expression_fallback_when_env_absent() {
    let loaded = load_from_source("port = $ENV.PORT || 3000\n", &LoadOptions::new()).unwrap();
    assert_eq!(get(&loaded.value, "port").as_scalar(), Some(&Value::Int(3000)));
}

#[test]
fn test_env_value_keeps_native_type() {
    let options = LoadOptions::new().with_env(env(&[("DEBUG", Value::Bool(true))]));
    let loaded = load_from_source("debug = $ENV.DEBUG || false\n", &options).unwrap();
    assert_eq!(get(&loaded.value, "debug").as_scalar(), Some(&Value::Bool(true)));
}

#[test]
fn test_env_falsy_binding_not_replaced_by_fallback() {
    let options = LoadOptions::new()
        .with_env(env(&[("WORKERS", Value::Int(0)), ("DEBUG", Value::Bool(false))]));
    let loaded = load_from_source(
        "workers = $ENV.WORKERS || 4\ndebug = $ENV.DEBUG || true\n",
        &options,
    )
    .unwrap();
    assert_eq!(get(&loaded.value, "workers").as_scalar(), Some(&Value::Int(0)));
    assert_eq!(get(&loaded.value, "debug").as_scalar(), Some(&Value::Bool(false)));
}

#[test]
fn test_colon_values_are_literal_never_expressions() {
    let loaded = load_from_source("motto: 1 + 2\n", &LoadOptions::new()).unwrap();
    assert_eq!(
        get(&loaded.value, "motto").as_scalar(),
        Some(&Value::String("1 + 2".into()))
    );
}

#[test]
fn test_failed_expression_degrades_with_warning() {
    let loaded = load_from_source("x = 1 +\n", &LoadOptions::new()).unwrap();
    assert_eq!(
        get(&loaded.value, "x").as_scalar(),
        Some(&Value::String("1 +".into()))
    );
    assert_eq!(loaded.warnings.len(), 1);
    assert!(loaded.warnings[0].message.contains("1 +"));
}

#[test]
fn test_builtin_rgb_tag() {
    let loaded = load_from_source("accent = !rgb(255, 128, 0)\n", &LoadOptions::new()).unwrap();
    assert_eq!(
        get(&loaded.value, "accent").as_scalar(),
        Some(&Value::String("rgb(255, 128, 0)".into()))
    );
}

#[test]
fn test_unknown_tag_is_fatal() {
    let err = load_from_source("x = !mystery(1)\n", &LoadOptions::new()).unwrap_err();
    assert_eq!(err.kind, WaflErrorKind::Tag);
}

#[test]
fn test_custom_registered_tag() {
    let mut registry = TagRegistry::with_builtins();
    registry.register("upper", |args, _env, _ctx| {
        Ok(Value::String(args.join(" ").to_uppercase()))
    });
    let options = LoadOptions::new().with_registry(registry);
    let loaded = load_from_source("shout = !upper(hey)\n", &options).unwrap();
    assert_eq!(
        get(&loaded.value, "shout").as_scalar(),
        Some(&Value::String("HEY".into()))
    );
}

#[test]
fn test_symbols_resolve_in_expressions() {
    let options = LoadOptions::new().with_symbols(env(&[("region", Value::String("eu".into()))]));
    let loaded = load_from_source("region = $region\n", &options).unwrap();
    assert_eq!(
        get(&loaded.value, "region").as_scalar(),
        Some(&Value::String("eu".into()))
    );
}

#[test]
fn test_schema_failure_names_field_and_path() {
    let source = "\
app<App>:
  name: \"Demo\"

@schema:
  App:
    name: string
    port: int
";
    let err = load_from_source(source, &LoadOptions::new()).unwrap_err();
    assert_eq!(err.kind, WaflErrorKind::Validation);
    assert!(err.message.contains("'port'"));
    assert_eq!(err.context.as_deref(), Some("app"));
}

#[test]
fn test_schema_checks_evaluated_values_not_markers() {
    // The expression evaluates to an int, so `port: int` passes.
    let source = "\
app<App>:
  port = $ENV.PORT || 3000

@schema:
  App:
    port: int
";
    let loaded = load_from_source(source, &LoadOptions::new()).unwrap();
    assert_eq!(get(&loaded.value, "app.port").as_scalar(), Some(&Value::Int(3000)));
}

#[test]
fn test_malformed_version_header_is_fatal() {
    let err = load_from_source("%WAFL 1.0\nx: 1\n", &LoadOptions::new()).unwrap_err();
    assert_eq!(err.kind, WaflErrorKind::Format);
}

#[test]
fn test_missing_version_header_is_fine() {
    assert!(load_from_source("x: 1\n", &LoadOptions::new()).is_ok());
}

#[test]
fn test_imports_merge_with_entry_file_winning() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "defaults.wafl",
        "server:\n  host: localhost\n  port: 80\n",
    );
    let entry = write(
        dir.path(),
        "entry.wafl",
        "@import: defaults.wafl\nserver:\n  port: 8080\n",
    );

    let loaded = load_from_path(&entry, &LoadOptions::new()).unwrap();
    assert_eq!(
        get(&loaded.value, "server.host").as_scalar(),
        Some(&Value::String("localhost".into()))
    );
    assert_eq!(get(&loaded.value, "server.port").as_scalar(), Some(&Value::Int(8080)));
}

#[test]
fn test_imported_schema_applies_to_entry_values() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "types.wafl",
        "@schema:\n  App:\n    port: int\n",
    );
    let entry = write(
        dir.path(),
        "entry.wafl",
        "@import: types.wafl\napp<App>:\n  port: \"oops\"\n",
    );

    let err = load_from_path(&entry, &LoadOptions::new()).unwrap_err();
    assert_eq!(err.kind, WaflErrorKind::Validation);
    assert_eq!(err.context.as_deref(), Some("app.port"));
}

#[test]
fn test_file_tag_resolves_against_entry_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "motd.txt", "welcome");
    let entry = write(dir.path(), "entry.wafl", "banner = !file(motd.txt)\n");

    let loaded = load_from_path(&entry, &LoadOptions::new()).unwrap();
    assert_eq!(
        get(&loaded.value, "banner").as_scalar(),
        Some(&Value::String("welcome".into()))
    );
}

#[test]
fn test_missing_file_tag_target_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(dir.path(), "entry.wafl", "banner = !file(absent.txt)\n");
    let err = load_from_path(&entry, &LoadOptions::new()).unwrap_err();
    assert_eq!(err.kind, WaflErrorKind::File);
}

#[test]
fn test_string_load_ignores_imports() {
    // No file context, so imports cannot resolve; they are dropped.
    let loaded = load_from_source("@import: nope.wafl\nx: 1\n", &LoadOptions::new()).unwrap();
    assert_eq!(get(&loaded.value, "x").as_scalar(), Some(&Value::Int(1)));
}

#[test]
fn test_json_output_preserves_document_order() {
    let loaded = load_from_source("zeta: 1\nalpha: 2\n", &LoadOptions::new()).unwrap();
    assert_eq!(
        wafl::json::to_json(&loaded.value).unwrap(),
        r#"{"zeta":1,"alpha":2}"#
    );
}

#[test]
fn test_conditional_entries_filter_by_env() {
    let source = "\
features:
  - core
  - if $ENV.BETA: beta-dashboard
  - if $ENV.DEBUG: trace
";
    let options = LoadOptions::new().with_env(env(&[("DEBUG", Value::Bool(true))]));
    let loaded = load_from_source(source, &options).unwrap();
    let features = get(&loaded.value, "features").as_sequence().unwrap();
    let names: Vec<_> = features.iter().filter_map(|n| n.as_scalar()).collect();
    assert_eq!(
        names,
        vec![&Value::String("core".into()), &Value::String("trace".into())]
    );
}

#[test]
fn test_os_env_injection_is_explicit() {
    // Without with_os_env, process variables are invisible.
    std::env::set_var("WAFL_TEST_OS_ENV_PROBE", "17");
    let loaded =
        load_from_source("x = $ENV.WAFL_TEST_OS_ENV_PROBE || 0\n", &LoadOptions::new()).unwrap();
    assert_eq!(get(&loaded.value, "x").as_scalar(), Some(&Value::Int(0)));

    let loaded = load_from_source(
        "x = $ENV.WAFL_TEST_OS_ENV_PROBE || 0\n",
        &LoadOptions::new().with_os_env(),
    )
    .unwrap();
    assert_eq!(get(&loaded.value, "x").as_scalar(), Some(&Value::Int(17)));
    std::env::remove_var("WAFL_TEST_OS_ENV_PROBE");
}
