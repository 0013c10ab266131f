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

//! Deep merge used to fold imported documents into an importer's document.

use crate::document::{Mapping, Node};

/// Precedence-aware combination of two trees; `b` wins.
///
/// Mappings merge key-by-key (keys present on only one side pass through),
/// sequences concatenate `a` then `b`, and anything else is replaced by
/// `b`. Inputs are never mutated; the result is a fresh tree.
pub fn deep_merge(a: &Node, b: &Node) -> Node {
    match (a, b) {
        (Node::Mapping(ma), Node::Mapping(mb)) => {
            let mut out = Mapping::new();
            for (key, va) in ma.iter() {
                match mb.get(key) {
                    Some(vb) => out.insert(key.to_string(), deep_merge(va, vb)),
                    None => out.insert(key.to_string(), va.clone()),
                }
            }
            for (key, vb) in mb.iter() {
                if !ma.contains_key(key) {
                    out.insert(key.to_string(), vb.clone());
                }
            }
            Node::Mapping(out)
        }
        (Node::Sequence(sa), Node::Sequence(sb)) => {
            let mut out = Vec::with_capacity(sa.len() + sb.len());
            out.extend(sa.iter().cloned());
            out.extend(sb.iter().cloned());
            Node::Sequence(out)
        }
        (_, b) => b.clone(),
    }
}
