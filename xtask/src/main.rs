// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Build automation and resource packing for Rhizome.
// Run with: cargo xtask <command>

mod commands;
mod console;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = console::ABOUT, before_help = console::BANNER)]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Build all crates in the workspace.
    Build,
    /// Run all tests in the workspace.
    Test,
    /// Run `cargo check` on all crates.
    Check,
    /// Format all code in the workspace.
    Format,
    /// Run clippy on all crates with warnings as errors.
    Clippy,
    /// Run every CI task (build, test, check, format, clippy).
    All,
    /// Pack the resource directories listed in a manifest into index.bin + data.pack.
    Pack {
        /// Manifest listing the source directories. Defaults apply when it is missing.
        #[arg(long, default_value = commands::manifest::MANIFEST_FILE_NAME)]
        manifest: PathBuf,
    },
    /// List the entries of a built pack.
    Inspect {
        /// Directory holding index.bin.
        #[arg(default_value = commands::manifest::DEFAULT_OUTPUT_DIRECTORY)]
        directory: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Task::Build => commands::ci::build(),
        Task::Test => commands::ci::test(),
        Task::Check => commands::ci::check(),
        Task::Format => commands::ci::format(),
        Task::Clippy => commands::ci::clippy(),
        Task::All => commands::ci::all(),
        Task::Pack { manifest } => commands::pack::pack(&manifest),
        Task::Inspect { directory } => commands::pack::inspect(&directory),
    };

    if let Err(e) = result {
        console::report(console::Tone::Fail, &format!("{e:#}"));
        std::process::exit(1);
    }
}
