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

//! Command handlers: load and check.

use crate::cli::BindingArgs;
use colored::Colorize;
use wafl::{LoadOptions, Loaded, Value};

/// Load a file and print the evaluated document as JSON.
pub fn load(file: &str, bindings: &BindingArgs, pretty: bool) -> Result<(), String> {
    let loaded = run_load(file, bindings)?;
    let json = if pretty {
        wafl::json::to_json_pretty(&loaded.value)
    } else {
        wafl::json::to_json(&loaded.value)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

/// Load a file, report success, print nothing but diagnostics.
pub fn check(file: &str, bindings: &BindingArgs) -> Result<(), String> {
    let loaded = run_load(file, bindings)?;
    if loaded.warnings.is_empty() {
        eprintln!("{} {}", "ok:".green().bold(), file);
    } else {
        eprintln!(
            "{} {} ({} warnings)",
            "ok:".green().bold(),
            file,
            loaded.warnings.len()
        );
    }
    Ok(())
}

fn run_load(file: &str, bindings: &BindingArgs) -> Result<Loaded, String> {
    let options = build_options(bindings)?;
    let loaded = wafl::load_from_path(file, &options).map_err(|e| e.to_string())?;
    for warning in &loaded.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning.message);
    }
    Ok(loaded)
}

fn build_options(bindings: &BindingArgs) -> Result<LoadOptions, String> {
    let mut options = LoadOptions::new();
    if bindings.env_os {
        options = options.with_os_env();
    }
    for pair in &bindings.env {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("invalid --env binding '{}', expected KEY=VALUE", pair))?;
        if key.is_empty() {
            return Err(format!("invalid --env binding '{}', empty key", pair));
        }
        // Explicit bindings override anything pulled in by --env-os
        options.env.insert(key.to_string(), Value::infer(value));
    }
    Ok(options)
}
