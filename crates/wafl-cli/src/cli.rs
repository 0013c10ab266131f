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

//! CLI command definitions and argument parsing.

use crate::commands;
use clap::{Args, Subcommand};

/// Expression bindings shared by every command that loads a document.
#[derive(Args, Debug)]
pub struct BindingArgs {
    /// Bind KEY=VALUE as $ENV.KEY (repeatable; values are type-inferred)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Expose every process environment variable as $ENV.NAME
    #[arg(long)]
    pub env_os: bool,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Load a WAFL file and print the evaluated document as JSON
    ///
    /// Follows @import directives, evaluates expressions and tags, applies
    /// the @schema block if one is present, and prints the result to stdout.
    /// Non-fatal warnings go to stderr.
    Load {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        #[command(flatten)]
        bindings: BindingArgs,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Load a WAFL file and report success without printing the document
    ///
    /// Exits non-zero on any fatal error (format, file, tag, or validation).
    Check {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        #[command(flatten)]
        bindings: BindingArgs,
    },
}

impl Commands {
    /// Execute the command, returning a displayable error on failure.
    pub fn execute(self) -> Result<(), String> {
        match self {
            Commands::Load {
                file,
                bindings,
                pretty,
            } => commands::load(&file, &bindings, pretty),
            Commands::Check { file, bindings } => commands::check(&file, &bindings),
        }
    }
}
