// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use serde::Deserialize;

/// A commit in a release range, optionally linked to the pull request that
/// introduced it.
///
/// Deserializes from the commit objects returned by the GitHub compare API
/// (`{"sha", "commit": {"message"}}`), with an optional `pull_request`
/// object added by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitEntry {
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub commit: CommitDetail,
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub number: Option<u64>,
}

impl CommitEntry {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            commit: CommitDetail {
                message: message.into(),
            },
            pull_request: None,
        }
    }

    pub fn with_pull_request(mut self, title: impl Into<String>, number: u64) -> Self {
        self.pull_request = Some(PullRequestRef {
            title: title.into(),
            number: Some(number),
        });
        self
    }

    /// First line of the commit message, trimmed.
    pub fn subject(&self) -> &str {
        self.commit.message.lines().next().unwrap_or("").trim()
    }

    /// `- <PR title> (#N)` when a titled PR is linked, otherwise
    /// `- <subject>`. `None` when there is nothing to show.
    pub fn change_line(&self) -> Option<String> {
        if let Some(pr) = &self.pull_request {
            let title = pr.title.trim();
            if let (false, Some(number)) = (title.is_empty(), pr.number) {
                return Some(format!("- {title} (#{number})"));
            }
        }

        let subject = self.subject();
        if subject.is_empty() {
            None
        } else {
            Some(format!("- {subject}"))
        }
    }
}
