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

//! WAFL value tree to JSON conversion.

use serde_json::{Map, Number, Value as JsonValue};
use thiserror::Error;
use wafl_core::{Node, Value};

/// Error converting a value tree to JSON.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JsonError {
    /// The tree still contains an unresolved marker node; only resolved
    /// trees serialize.
    #[error("cannot serialize unresolved {0} node")]
    UnresolvedMarker(&'static str),
    /// serde_json refused the tree (non-finite float, for instance).
    #[error("JSON serialization failed: {0}")]
    Serialize(String),
}

/// Convert a resolved value tree to a compact JSON string.
pub fn to_json(node: &Node) -> Result<String, JsonError> {
    let value = to_json_value(node)?;
    serde_json::to_string(&value).map_err(|e| JsonError::Serialize(e.to_string()))
}

/// Convert a resolved value tree to a pretty-printed JSON string.
pub fn to_json_pretty(node: &Node) -> Result<String, JsonError> {
    let value = to_json_value(node)?;
    serde_json::to_string_pretty(&value).map_err(|e| JsonError::Serialize(e.to_string()))
}

/// Convert a resolved value tree to a `serde_json::Value`.
pub fn to_json_value(node: &Node) -> Result<JsonValue, JsonError> {
    match node {
        Node::Scalar(value) => Ok(scalar_to_json(value)),
        Node::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping.iter() {
                map.insert(key.to_string(), to_json_value(value)?);
            }
            Ok(JsonValue::Object(map))
        }
        Node::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json_value(item)?);
            }
            Ok(JsonValue::Array(out))
        }
        Node::Expr(_) => Err(JsonError::UnresolvedMarker("expression")),
        Node::Tag { .. } => Err(JsonError::UnresolvedMarker("tag")),
        Node::If { .. } => Err(JsonError::UnresolvedMarker("conditional")),
    }
}

fn scalar_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(n) => JsonValue::Number(Number::from(*n)),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.clone()),
    }
}
