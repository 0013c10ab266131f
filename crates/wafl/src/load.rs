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

//! One-call loading pipeline: parse, merge imports, evaluate, validate.

use std::path::Path;
use wafl_core::{
    parse, validate, Bindings, Node, Resolver, TagContext, TagRegistry, Warning, WaflResult,
};

/// Inputs for a load: the environment and symbol bindings visible to
/// expressions, and the tag registry used for `!name(args)` dispatch.
///
/// The default carries empty bindings and the built-in tags. Process
/// environment variables are never read implicitly; callers that want them
/// inject them explicitly (see [`LoadOptions::with_os_env`]).
#[derive(Debug, Default)]
pub struct LoadOptions {
    /// Bindings visible as `$ENV.NAME`.
    pub env: Bindings,
    /// Bindings visible as `$NAME`.
    pub symbols: Bindings,
    /// Tag handlers for `!name(args)` values.
    pub registry: TagRegistry,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the `$ENV` bindings.
    pub fn with_env(mut self, env: Bindings) -> Self {
        self.env = env;
        self
    }

    /// Replace the `$NAME` symbol bindings.
    pub fn with_symbols(mut self, symbols: Bindings) -> Self {
        self.symbols = symbols;
        self
    }

    /// Replace the tag registry.
    pub fn with_registry(mut self, registry: TagRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Bind every process environment variable as `$ENV.NAME`, with values
    /// run through scalar type inference. Explicit [`with_env`] bindings
    /// applied afterwards still win.
    ///
    /// [`with_env`]: LoadOptions::with_env
    pub fn with_os_env(mut self) -> Self {
        for (key, value) in std::env::vars() {
            self.env
                .entry(key)
                .or_insert_with(|| wafl_core::Value::infer(&value));
        }
        self
    }
}

/// A successful load: the final marker-free value tree plus any non-fatal
/// diagnostics collected along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// Fully evaluated value tree.
    pub value: Node,
    /// Expression failures and validation skips, in encounter order.
    pub warnings: Vec<Warning>,
}

/// Load a WAFL document from a file, following its imports.
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> WaflResult<Loaded> {
    let doc = wafl_core::load_file(path.as_ref())?;
    let ctx = TagContext::with_base_dir(&doc.base_dir);
    finish(doc.root, doc.meta.schema, doc.types, options, ctx)
}

/// Load a WAFL document from in-memory source. There is no file context:
/// `@import` directives are ignored and relative `!file` paths resolve
/// against the working directory.
pub fn load_from_source(source: &str, options: &LoadOptions) -> WaflResult<Loaded> {
    let parsed = parse(source)?;
    finish(
        parsed.root,
        parsed.meta.schema,
        parsed.types,
        options,
        TagContext::default(),
    )
}

fn finish(
    root: Node,
    schema: Option<wafl_core::Mapping>,
    types: wafl_core::TypeMetadata,
    options: &LoadOptions,
    ctx: TagContext,
) -> WaflResult<Loaded> {
    let mut resolver = Resolver::new(&options.env, &options.symbols, &options.registry, ctx);
    let resolved = resolver.resolve(&root)?;
    // Second pass picks up values produced by the first (an expression whose
    // result is itself an inline `$ENV` string). Resolution is idempotent,
    // so this is a no-op for already-final trees, and repeated diagnostics
    // are deduplicated by the resolver.
    let resolved = resolver.resolve(&resolved)?;
    let mut warnings = resolver.into_warnings();

    if let Some(schema) = schema {
        validate(&resolved, &schema, &types, &mut warnings)?;
    }
    Ok(Loaded {
        value: resolved,
        warnings,
    })
}
