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

//! Core parser, evaluator, and validator for the WAFL format.
//!
//! This crate provides the full loading pipeline for WAFL documents:
//!
//! - [`parse`]: line-classifying structural parser producing an
//!   intermediate [`Node`] tree with deferred expression/tag/conditional
//!   markers
//! - [`load_file`]: import resolution and [`deep_merge`] folding of
//!   multi-file documents
//! - [`Resolver`]: marker rewriting through the [`expr`] sub-language and
//!   the [`TagRegistry`]
//! - [`validate`]: post-evaluation validation against `@schema` blocks
//!
//! The `wafl` crate wraps this pipeline in a one-call API; this crate is
//! for callers that need the individual stages.

mod document;
mod error;
pub mod expr;
mod loader;
mod merge;
mod parser;
mod resolve;
mod schema;
mod tags;
mod value;

pub use document::{split_annotated_key, DocumentMeta, Mapping, Node, TypeMetadata};
pub use error::{Warning, WaflError, WaflErrorKind, WaflResult};
pub use loader::{load_file, LoadedDocument};
pub use merge::deep_merge;
pub use parser::{parse, ParsedDocument};
pub use resolve::Resolver;
pub use schema::validate;
pub use tags::{TagContext, TagHandler, TagRegistry};
pub use value::{Bindings, Value};
