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

//! Error and diagnostic types for WAFL loading.

use std::fmt;
use thiserror::Error;

/// The kind of fatal error that occurred during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaflErrorKind {
    /// Malformed `%WAFL` version header.
    Format,
    /// Missing entry/import file or unreadable `!file` target.
    File,
    /// Unknown tag, or wrong argument arity/type for a built-in tag.
    Tag,
    /// Schema mismatch: missing required field or kind mismatch.
    Validation,
}

impl fmt::Display for WaflErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => write!(f, "FormatError"),
            Self::File => write!(f, "FileError"),
            Self::Tag => write!(f, "TagError"),
            Self::Validation => write!(f, "ValidationError"),
        }
    }
}

/// A fatal error raised while loading a WAFL document.
///
/// Exactly one error surfaces per failed load: the first fatal condition
/// encountered aborts the whole pipeline. `context` carries whatever locates
/// the fault (a file path, a dotted value path, or a tag name).
#[derive(Debug, Clone, Error)]
pub struct WaflError {
    /// The kind of error.
    pub kind: WaflErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// File path, dotted value path, or tag name locating the fault.
    pub context: Option<String>,
}

impl fmt::Display for WaflError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{} at {}: {}", self.kind, ctx, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl WaflError {
    /// Create a new error.
    pub fn new(kind: WaflErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Attach locating context (file path, dotted path, or tag name).
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Convenience constructors for each error kind

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(WaflErrorKind::Format, message)
    }

    pub fn file(message: impl Into<String>) -> Self {
        Self::new(WaflErrorKind::File, message)
    }

    pub fn tag(message: impl Into<String>) -> Self {
        Self::new(WaflErrorKind::Tag, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(WaflErrorKind::Validation, message)
    }
}

/// Result type for WAFL operations.
pub type WaflResult<T> = Result<T, WaflError>;

/// A non-fatal diagnostic collected during resolution or validation.
///
/// Expression evaluation failures degrade to the original source text and
/// produce one of these instead of aborting the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Human-readable description of what was skipped or degraded.
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {}", self.message)
    }
}
