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

//! Terminal output and cargo invocation for the xtask commands.

use anyhow::{bail, Result};
use std::process::Command;
use std::time::{Duration, Instant};

pub const ABOUT: &str = "Build automation and resource packing for Rhizome";

pub const BANNER: &str = concat!(
    "\x1b[1m\x1b[36m",
    "╔═══════════════════════════════════════════════════════════╗\n",
    "║                      🌱 RHIZOME 🌱                        ║\n",
    "║                   Build Automation Tool                   ║\n",
    "╚═══════════════════════════════════════════════════════════╝",
    "\x1b[0m"
);

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Colour family of a line. Each tone maps to one ANSI foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Ok,
    Fail,
    Warn,
    Build,
    Test,
    Lint,
    Pack,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Plain => "",
            Tone::Ok | Tone::Test => "\x1b[32m",
            Tone::Fail => "\x1b[31m",
            Tone::Warn | Tone::Lint => "\x1b[33m",
            Tone::Build => "\x1b[34m",
            Tone::Pack => "\x1b[35m",
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Tone::Ok => "✓",
            Tone::Fail => "✗",
            Tone::Warn => "⚠",
            _ => "•",
        }
    }
}

/// Renders one status line; kept separate from printing so it can be checked.
pub fn render(tone: Tone, message: &str) -> String {
    format!("{BOLD}{} {} {message}{RESET}", tone.ansi(), tone.marker())
}

pub fn report(tone: Tone, message: &str) {
    println!("{}", render(tone, message));
}

pub fn note(message: &str) {
    println!("{BOLD}💡 Info:{RESET} {message}");
}

pub fn section(title: &str, emoji: &str, tone: Tone) {
    println!("\n{BOLD}{}━━━ {emoji} {title} {emoji} ━━━{RESET}", tone.ansi());
}

/// `label` plus the elapsed time, rounded to hundredths of a second.
pub fn timed(label: &str, elapsed: Duration) -> String {
    format!("{label} ({:.2}s)", elapsed.as_secs_f64())
}

/// Runs `cargo` with `args`, reporting the outcome under `task`.
pub fn run_cargo(args: &[&str], task: &str) -> Result<()> {
    println!("{BOLD}📋 Command:{RESET} cargo {}", args.join(" "));
    let started = Instant::now();
    let status = Command::new("cargo").args(args).status()?;

    if status.success() {
        report(Tone::Ok, &timed(&format!("{task} completed"), started.elapsed()));
        Ok(())
    } else {
        report(Tone::Fail, &timed(&format!("{task} failed"), started.elapsed()));
        bail!("{task} failed with status: {status}");
    }
}
