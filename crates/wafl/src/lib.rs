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

//! # WAFL - a configuration document language
//!
//! WAFL is an indentation-structured configuration format with a small
//! expression sub-language, file imports with deep merge, extensible
//! `!name(args)` tags, and optional schema validation.
//!
//! ## Quick Start
//!
//! ```rust
//! use wafl::{load_from_source, LoadOptions, Value};
//!
//! let source = "\
//! app:
//!   name: \"Demo\"
//!   port = $ENV.PORT || 3000
//! ";
//!
//! let mut env = wafl::Bindings::new();
//! env.insert("PORT".to_string(), Value::Int(4242));
//!
//! let loaded = load_from_source(source, &LoadOptions::new().with_env(env)).unwrap();
//! let app = loaded.value.as_mapping().unwrap().get("app").unwrap();
//! let port = app.as_mapping().unwrap().get("port").unwrap();
//! assert_eq!(port.as_scalar(), Some(&Value::Int(4242)));
//! ```
//!
//! ## Features
//!
//! - **Sections and lists**: YAML-like nesting by indentation
//! - **Expressions**: `key = $ENV.PORT || 3000` with fallbacks and
//!   arithmetic
//! - **Conditional entries**: `- if $ENV.DEBUG: verbose-logging`
//! - **Imports**: `@import` with importer-wins deep merge
//! - **Tags**: built-in `!rgb`/`!file` plus caller-registered handlers
//! - **Schemas**: `@schema` blocks checked against `name<TypeName>` keys
//!
//! ## Modules
//!
//! - [`core`](mod@core): parsing stages, tree model, and tag registry
//! - [`json`]: JSON conversion for resolved trees

mod load;
pub use load::{load_from_path, load_from_source, LoadOptions, Loaded};

// Re-export core types
pub use wafl_core::{
    Bindings, Mapping, Node, TagContext, TagRegistry, TypeMetadata, Value, Warning, WaflError,
    WaflErrorKind, WaflResult,
};

/// Individual pipeline stages for callers that need them separately.
pub mod core {
    //! Parsing, merging, resolution, and validation stages.
    pub use wafl_core::{
        deep_merge, load_file, parse, split_annotated_key, validate, DocumentMeta, LoadedDocument,
        ParsedDocument, Resolver, TagHandler,
    };
}

// Re-export JSON conversion
pub mod json {
    //! JSON conversion utilities
    pub use wafl_json::{to_json, to_json_pretty, to_json_value, JsonError};
}
