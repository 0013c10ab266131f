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

//! WAFL Command Line Interface

use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use wafl_cli::cli::Commands;

/// WAFL configuration toolkit
///
/// # Examples
///
/// ```bash
/// # Load a config and print it as JSON
/// wafl load app.wafl --pretty
///
/// # Supply expression bindings
/// wafl load app.wafl --env PORT=4242 --env DEBUG=true
///
/// # Validate without printing the result
/// wafl check app.wafl --env-os
/// ```
#[derive(Parser)]
#[command(name = "wafl")]
#[command(author, version, about = "WAFL configuration toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
