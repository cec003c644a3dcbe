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

use crate::console::{note, report, run_cargo, section, timed, Tone, BANNER};
use anyhow::Result;
use std::time::Instant;

/// One cargo invocation of the CI pipeline.
struct CiStep {
    name: &'static str,
    title: &'static str,
    emoji: &'static str,
    tone: Tone,
    info: &'static str,
    args: &'static [&'static str],
}

const BUILD: CiStep = CiStep {
    name: "Build",
    title: "Building All Crates",
    emoji: "🔨",
    tone: Tone::Build,
    info: "Compiling all workspace crates in debug mode",
    args: &["build", "--workspace", "--exclude", "xtask"],
};

const TEST: CiStep = CiStep {
    name: "Tests",
    title: "Running All Tests",
    emoji: "🧪",
    tone: Tone::Test,
    info: "Running unit tests, integration tests and doc tests",
    args: &["test", "--workspace"],
};

const CHECK_STEP: CiStep = CiStep {
    name: "Check",
    title: "Checking All Crates",
    emoji: "🔍",
    tone: Tone::Plain,
    info: "Checking code for errors without building executables",
    args: &["check", "--workspace"],
};

// `fmt` takes `--all`, not `--workspace`.
const FORMAT: CiStep = CiStep {
    name: "Format",
    title: "Formatting Code",
    emoji: "🎨",
    tone: Tone::Lint,
    info: "Formatting code using rustfmt with default settings",
    args: &["fmt", "--all"],
};

const CLIPPY_STEP: CiStep = CiStep {
    name: "Clippy",
    title: "Running Clippy",
    emoji: "📎",
    tone: Tone::Lint,
    info: "Running Clippy linter with warnings as errors",
    args: &["clippy", "--workspace", "--", "-D", "warnings"],
};

const PIPELINE: [&CiStep; 5] = [&BUILD, &TEST, &CHECK_STEP, &FORMAT, &CLIPPY_STEP];

fn run(step: &CiStep) -> Result<()> {
    section(step.title, step.emoji, step.tone);
    note(step.info);
    run_cargo(step.args, step.name)
}

pub fn build() -> Result<()> {
    run(&BUILD)
}

pub fn test() -> Result<()> {
    run(&TEST)
}

pub fn check() -> Result<()> {
    run(&CHECK_STEP)
}

pub fn format() -> Result<()> {
    run(&FORMAT)
}

pub fn clippy() -> Result<()> {
    run(&CLIPPY_STEP)
}

/// Runs the whole pipeline, continuing past failures, and fails if any step did.
pub fn all() -> Result<()> {
    println!("{BANNER}");
    note("Starting full build pipeline");

    let start_time = Instant::now();
    let total = PIPELINE.len();
    let mut failed = Vec::new();

    for (index, step) in PIPELINE.iter().enumerate() {
        println!("\n[{}/{total}] {} phase", index + 1, step.name);
        if let Err(e) = run(step) {
            failed.push(step.name);
            report(Tone::Warn, &format!("{e:#}"));
        }
    }

    section("Pipeline Summary", "🚀", Tone::Plain);
    let passed = total - failed.len();
    let summary = timed(&format!("{passed}/{total} tasks completed"), start_time.elapsed());
    if failed.is_empty() {
        report(Tone::Ok, &summary);
        Ok(())
    } else {
        report(Tone::Warn, &summary);
        anyhow::bail!("Pipeline failed in: {}", failed.join(", "))
    }
}
