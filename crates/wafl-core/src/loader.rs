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

//! Import/merge resolver: assembles a multi-file document into one tree.
//!
//! Imports are loaded depth-first in declared order, each resolved relative
//! to the importing file's own directory. Every imported tree is folded
//! into an accumulator with [`deep_merge`], and the importing file's own
//! tree is merged last, so the importer always wins. A visited set of
//! canonical paths makes import cycles contribute nothing instead of
//! looping.

use crate::document::{DocumentMeta, Node, TypeMetadata};
use crate::error::{WaflError, WaflResult};
use crate::merge::deep_merge;
use crate::parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A fully merged (but not yet evaluated) document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Merged intermediate tree, markers still present.
    pub root: Node,
    /// Entry-file metadata after inheritance from imports.
    pub meta: DocumentMeta,
    /// Annotated-key table; entry-file annotations win over imported ones.
    pub types: TypeMetadata,
    /// Directory of the entry file, for filesystem tags.
    pub base_dir: PathBuf,
}

/// Load an entry file and all of its imports into one merged tree.
pub fn load_file(entry: &Path) -> WaflResult<LoadedDocument> {
    let mut importer = Importer::new();
    let (root, meta, types) = importer.load_one(entry)?;
    let base_dir = entry
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(LoadedDocument {
        root,
        meta,
        types,
        base_dir,
    })
}

/// One load's import state. Never shared between loads: concurrent calls
/// for different entry files each own their visited set.
struct Importer {
    visited: HashSet<PathBuf>,
}

impl Importer {
    fn new() -> Self {
        Self {
            visited: HashSet::new(),
        }
    }

    fn load_one(&mut self, path: &Path) -> WaflResult<(Node, DocumentMeta, TypeMetadata)> {
        let abs = canonicalize(path)?;
        if !self.visited.insert(abs.clone()) {
            // Cycle re-entry: empty contribution, never an error.
            return Ok((
                Node::empty_mapping(),
                DocumentMeta::default(),
                TypeMetadata::new(),
            ));
        }

        let source = std::fs::read_to_string(&abs).map_err(|e| {
            WaflError::file(format!("cannot read file: {}", e))
                .with_context(abs.display().to_string())
        })?;
        let parsed = parser::parse(&source)
            .map_err(|e| e.with_context(abs.display().to_string()))?;

        let own_dir = abs.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut meta = parsed.meta;
        let mut types = TypeMetadata::new();

        let imports = std::mem::take(&mut meta.imports);
        let mut merged = Node::empty_mapping();
        for import in &imports {
            let requested = Path::new(import);
            let target = if requested.is_absolute() {
                requested.to_path_buf()
            } else {
                own_dir.join(requested)
            };
            let (imported, imported_meta, imported_types) = self.load_one(&target)?;
            merged = deep_merge(&merged, &imported);
            // First import providing a schema or eval block wins, unless the
            // current file declares its own.
            if meta.schema.is_none() {
                meta.schema = imported_meta.schema;
            }
            if meta.eval_block.is_none() {
                meta.eval_block = imported_meta.eval_block;
            }
            types.extend_missing(&imported_types);
        }
        meta.imports = imports;

        // The current file always overrides whatever it imports.
        let merged = deep_merge(&merged, &parsed.root);
        let mut own_types = parsed.types;
        own_types.extend_missing(&types);
        Ok((merged, meta, own_types))
    }
}

fn canonicalize(path: &Path) -> WaflResult<PathBuf> {
    path.canonicalize().map_err(|e| {
        WaflError::file(format!("cannot resolve file: {}", e))
            .with_context(path.display().to_string())
    })
}
