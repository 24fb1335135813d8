// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

//! Payload builders for the three prompt consumers: PR summaries, draft
//! tests and release notes.
//!
//! Every patch, description and commit line passes through redaction
//! before any truncation, so a cut never leaves half a secret behind.

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::domain::{ChangedFile, CommitEntry, FileArea};

use super::safety;
use super::sanitizer::sanitize;

const NO_PATCH_NOTE: &str = "*(no patch available; possibly binary or too large)*";
const NO_DESCRIPTION: &str = "(No description provided)";
const NO_TITLE: &str = "(Untitled)";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DiffContext {
    pub content: String,
    /// The full rendering was over budget and the condensed form was used.
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AreaGroup {
    pub area: &'static str,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrSummaryContext {
    pub title: String,
    pub body: String,
    pub file_count: usize,
    pub areas: Vec<AreaGroup>,
    pub diff: DiffContext,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TestDraftContext {
    pub content: String,
    pub files: Vec<String>,
    pub omitted: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReleaseChanges {
    pub content: String,
    pub included: usize,
    pub omitted: usize,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub struct ContextBuilder;

impl ContextBuilder {
    pub fn pr_summary(
        files: &[ChangedFile],
        title: &str,
        body: &str,
        config: &Config,
    ) -> PrSummaryContext {
        PrSummaryContext {
            title: Self::pr_title(title, config),
            body: Self::pr_body(body, config),
            file_count: files.len(),
            areas: Self::group_by_area(files),
            diff: Self::pr_diff(files, config),
        }
    }

    /// Full diff when it fits `pr_diff_chars`, otherwise a condensed form
    /// with per-file stats and patches cut to `pr_patch_chars`.
    pub fn pr_diff(files: &[ChangedFile], config: &Config) -> DiffContext {
        let budget = config.budgets.pr_diff_chars;

        let full = safety::redact(&Self::render_full(files));
        let full_len = char_len(&full);
        if full_len <= budget {
            return DiffContext {
                content: full,
                truncated: false,
            };
        }

        debug!(full_len, budget, "diff over budget, condensing");
        let condensed = Self::render_condensed(files, config.budgets.pr_patch_chars);
        DiffContext {
            content: sanitize(&condensed, budget),
            truncated: true,
        }
    }

    /// First non-blank line of the title, under the same budget as the body.
    pub fn pr_title(title: &str, config: &Config) -> String {
        match title.lines().map(str::trim).find(|line| !line.is_empty()) {
            Some(line) => sanitize(line, config.budgets.pr_body_chars),
            None => NO_TITLE.to_string(),
        }
    }

    pub fn pr_body(body: &str, config: &Config) -> String {
        if body.trim().is_empty() {
            return NO_DESCRIPTION.to_string();
        }
        sanitize(body, config.budgets.pr_body_chars)
    }

    fn render_full(files: &[ChangedFile]) -> String {
        files
            .iter()
            .map(|file| match file.patch() {
                Some(patch) => format!("### {}\n```diff\n{}\n```\n", file.filename, patch),
                None => format!("### {}\n{}\n", file.filename, NO_PATCH_NOTE),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_condensed(files: &[ChangedFile], patch_budget: usize) -> String {
        let mut parts = vec!["**Note: Diff truncated due to size.**\n".to_string()];

        for file in files {
            match file.patch() {
                Some(patch) => {
                    parts.push(format!("- `{}` ({})", file.filename, file.stat_line()));
                    parts.push(format!("```diff\n{}\n```\n", sanitize(patch, patch_budget)));
                }
                None => parts.push(format!(
                    "- `{}` ({}) {}",
                    file.filename,
                    file.stat_line(),
                    NO_PATCH_NOTE
                )),
            }
        }

        parts.join("\n")
    }

    /// Per-file sections while the running total fits `test_total_chars`;
    /// the rest is reported as omitted.
    pub fn test_draft(files: &[&ChangedFile], config: &Config) -> TestDraftContext {
        let budgets = &config.budgets;
        let mut parts = Vec::new();
        let mut included = Vec::new();
        let mut total = 0;
        let mut omitted = 0;

        for (idx, file) in files.iter().enumerate() {
            let mut section = format!(
                "### {}\n**Status**: {} (+{}/-{})\n\n",
                file.filename, file.status, file.additions, file.deletions
            );
            match file.patch() {
                Some(patch) => {
                    section.push_str("```diff\n");
                    section.push_str(&sanitize(patch, budgets.test_patch_chars));
                    section.push_str("\n```\n");
                }
                None => {
                    section.push_str(NO_PATCH_NOTE);
                    section.push('\n');
                }
            }

            let len = char_len(&section);
            if total + len > budgets.test_total_chars {
                omitted = files.len() - idx;
                parts.push(format!(
                    "\n**Note:** {omitted} additional files omitted due to size constraints.\n"
                ));
                break;
            }

            parts.push(section);
            included.push(file.filename.clone());
            total += len;
        }

        debug!(included = included.len(), omitted, chars = total, "built test draft context");

        TestDraftContext {
            content: parts.join("\n"),
            files: included,
            omitted,
        }
    }

    /// At most `max_commits` change lines. `total` is the size of the whole
    /// range when the caller knows it (the compare API reports it). Commits
    /// past the cap and commits with nothing to show both count as omitted.
    pub fn release_changes(
        commits: &[CommitEntry],
        total: Option<usize>,
        config: &Config,
    ) -> ReleaseChanges {
        let budgets = &config.budgets;
        let capped = &commits[..commits.len().min(budgets.max_commits)];

        let lines: Vec<String> = capped.iter().filter_map(CommitEntry::change_line).collect();
        let total = total.unwrap_or(commits.len()).max(commits.len());

        let blank = capped.len() - lines.len();
        if blank > 0 {
            debug!(blank, "skipped commits without a subject");
        }

        ReleaseChanges {
            content: sanitize(&lines.join("\n"), budgets.release_chars),
            included: lines.len(),
            omitted: total.saturating_sub(lines.len()),
        }
    }

    /// Filenames bucketed by area, in a fixed area order; empty areas dropped.
    pub fn group_by_area(files: &[ChangedFile]) -> Vec<AreaGroup> {
        FileArea::ALL
            .iter()
            .filter_map(|area| {
                let names: Vec<String> = files
                    .iter()
                    .filter(|f| f.area() == *area)
                    .map(|f| f.filename.clone())
                    .collect();
                (!names.is_empty()).then(|| AreaGroup {
                    area: area.label(),
                    files: names,
                })
            })
            .collect()
    }
}
