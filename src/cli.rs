// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::config::Budgets;

#[derive(Parser, Debug)]
#[command(name = "diffscrub")]
#[command(version)]
#[command(
    about = "Redact secrets and cap the size of text before it is sent to an LLM",
    long_about = None
)]
pub struct Cli {
    /// Model name used by `complete`
    #[arg(short, long, env = "DIFFSCRUB_MODEL", global = true)]
    pub model: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Redact and truncate text from stdin or a file
    Sanitize {
        /// diff, body, commits, or a number of characters
        #[arg(short, long, default_value = "diff")]
        budget: BudgetArg,

        /// Read from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// List lines that would be redacted
    Scan {
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Exit with status 1 when anything is found
        #[arg(long)]
        fail: bool,
    },
    /// Build the PR summary payload from a GitHub PR files JSON list
    PrContext {
        #[arg(long)]
        files: PathBuf,

        /// File holding the PR title
        #[arg(long)]
        title: Option<PathBuf>,

        /// File holding the PR description
        #[arg(long)]
        body: Option<PathBuf>,
    },
    /// Build the draft-test payload from a GitHub PR files JSON list
    TestContext {
        #[arg(long)]
        files: PathBuf,
    },
    /// Build the release-notes change list from a JSON list of commits
    ReleaseContext {
        #[arg(long)]
        commits: PathBuf,

        /// Commits in the whole range, when more were fetched than listed
        #[arg(long)]
        total: Option<usize>,
    },
    /// Sanitize input and send it to the completion endpoint
    Complete {
        /// System prompt (defaults to the configured one)
        #[arg(long)]
        system: Option<String>,

        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Named budget from the config, or an explicit character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetArg {
    Diff,
    Body,
    Commits,
    Chars(usize),
}

impl BudgetArg {
    pub fn resolve(self, budgets: &Budgets) -> usize {
        match self {
            Self::Diff => budgets.pr_diff_chars,
            Self::Body => budgets.pr_body_chars,
            Self::Commits => budgets.release_chars,
            Self::Chars(n) => n,
        }
    }
}

impl FromStr for BudgetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diff" => Ok(Self::Diff),
            "body" => Ok(Self::Body),
            "commits" => Ok(Self::Commits),
            other => match other.parse::<usize>() {
                Ok(0) => Err("budget must be at least 1 character".into()),
                Ok(n) => Ok(Self::Chars(n)),
                Err(_) => Err(format!(
                    "unknown budget '{s}' (expected diff, body, commits or a number)"
                )),
            },
        }
    }
}
