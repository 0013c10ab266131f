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

//! WAFL JSON conversion.
//!
//! Converts fully resolved WAFL value trees to JSON. Key order is preserved
//! (serde_json is built with `preserve_order`), so serialized output reads
//! in the same order as the source document.
//!
//! # Examples
//!
//! ```rust
//! use wafl_core::{Mapping, Node, Value};
//! use wafl_json::to_json;
//!
//! let mut map = Mapping::new();
//! map.insert("name", Node::Scalar(Value::String("Demo".into())));
//! map.insert("port", Node::Scalar(Value::Int(8080)));
//! let json = to_json(&Node::Mapping(map)).unwrap();
//! assert_eq!(json, r#"{"name":"Demo","port":8080}"#);
//! ```

mod to_json;

pub use to_json::{to_json, to_json_pretty, to_json_value, JsonError};
