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

//! Tag registry and built-in tag handlers.
//!
//! Tags are the `!name(args)` extension point. Dispatch goes through a
//! handler table, so new tags are registered without touching dispatch
//! logic. Registration happens before resolution starts; during resolution
//! the registry is only read, which keeps concurrent loads over a shared
//! registry safe.

use crate::error::{WaflError, WaflResult};
use crate::value::{Bindings, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Context handed to tag handlers that need more than their arguments.
#[derive(Debug, Clone, Default)]
pub struct TagContext {
    /// Directory of the entry file; filesystem tags resolve relative paths
    /// against it. None when loading from a string (no file context).
    pub base_dir: Option<PathBuf>,
}

impl TagContext {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

/// A tag handler: (arguments, environment, context) to a value, or a fatal
/// error.
pub type TagHandler = dyn Fn(&[String], &Bindings, &TagContext) -> WaflResult<Value> + Send + Sync;

/// Name-to-handler table for `!name(args)` dispatch.
pub struct TagRegistry {
    handlers: HashMap<String, Box<TagHandler>>,
}

impl TagRegistry {
    /// An empty registry with no tags at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with the built-in `rgb` and `file` tags.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("rgb", rgb_tag);
        registry.register("file", file_tag);
        registry
    }

    /// Register (or replace) a handler under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[String], &Bindings, &TagContext) -> WaflResult<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Dispatch a tag call. An unregistered name is a fatal TagError.
    pub fn run(
        &self,
        name: &str,
        args: &[String],
        env: &Bindings,
        ctx: &TagContext,
    ) -> WaflResult<Value> {
        match self.handlers.get(name) {
            Some(handler) => handler(args, env, ctx),
            None => Err(WaflError::tag(format!("unknown tag: !{}", name)).with_context(name)),
        }
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TagRegistry").field("tags", &names).finish()
    }
}

/// `!rgb(r, g, b)`: exactly three numeric arguments, formatted as a CSS
/// colour string.
fn rgb_tag(args: &[String], _env: &Bindings, _ctx: &TagContext) -> WaflResult<Value> {
    if args.len() != 3 {
        return Err(
            WaflError::tag(format!("!rgb expects 3 numbers, got {} arguments", args.len()))
                .with_context("rgb"),
        );
    }
    let mut channels = [0f64; 3];
    for (i, arg) in args.iter().enumerate() {
        channels[i] = arg.trim().parse::<f64>().map_err(|_| {
            WaflError::tag(format!("!rgb expects 3 numbers, got: {}", arg)).with_context("rgb")
        })?;
    }
    Ok(Value::String(format!(
        "rgb({}, {}, {})",
        channels[0], channels[1], channels[2]
    )))
}

/// `!file(path)`: UTF-8 contents of a file resolved against the context
/// base directory.
fn file_tag(args: &[String], _env: &Bindings, ctx: &TagContext) -> WaflResult<Value> {
    if args.len() != 1 {
        return Err(
            WaflError::tag(format!("!file expects a path, got {} arguments", args.len()))
                .with_context("file"),
        );
    }
    let requested = Path::new(args[0].trim());
    let path = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        match &ctx.base_dir {
            Some(base) => base.join(requested),
            None => requested.to_path_buf(),
        }
    };
    std::fs::read_to_string(&path).map(Value::String).map_err(|e| {
        WaflError::file(format!("cannot read !file target: {}", e))
            .with_context(path.display().to_string())
    })
}
