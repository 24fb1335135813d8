// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// File status as reported by the GitHub "list pull request files" endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Removed,
    #[default]
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed file of a pull request.
///
/// `patch` is absent for binary files and for files GitHub considers too
/// large to render.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    #[serde(default = "unknown_filename")]
    pub filename: String,
    #[serde(default)]
    pub status: ChangeStatus,
    #[serde(default)]
    pub additions: usize,
    #[serde(default)]
    pub deletions: usize,
    #[serde(default)]
    pub patch: Option<String>,
}

fn unknown_filename() -> String {
    "unknown".into()
}

impl ChangedFile {
    pub fn area(&self) -> FileArea {
        FileArea::from_path(Path::new(&self.filename))
    }

    /// Patch text, treating an empty patch like a missing one.
    pub fn patch(&self) -> Option<&str> {
        self.patch.as_deref().filter(|p| !p.is_empty())
    }

    /// `status: +A/-D`
    pub fn stat_line(&self) -> String {
        format!("{}: +{}/-{}", self.status, self.additions, self.deletions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileArea {
    Tests,
    Configuration,
    Documentation,
    CiCd,
    Source,
    Other,
}

impl FileArea {
    pub const ALL: [FileArea; 6] = [
        Self::Tests,
        Self::Configuration,
        Self::Documentation,
        Self::CiCd,
        Self::Source,
        Self::Other,
    ];

    pub fn from_path(path: &Path) -> Self {
        let path_str = path.to_string_lossy();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        if path.starts_with("tests/")
            || path_str.contains("/tests/")
            || name.starts_with("test_")
            || name.contains("_test.")
            || name.contains(".test.")
        {
            return Self::Tests;
        }

        if path.starts_with(".github/") || path_str.contains("/.github/") {
            return Self::CiCd;
        }

        if matches!(ext, "md" | "rst" | "txt") {
            return Self::Documentation;
        }

        if matches!(
            name,
            "pyproject.toml"
                | "setup.py"
                | "setup.cfg"
                | "requirements.txt"
                | "Makefile"
                | ".gitignore"
                | "uv.lock"
                | "Cargo.lock"
        ) || matches!(ext, "yml" | "yaml" | "toml" | "ini" | "cfg")
        {
            return Self::Configuration;
        }

        if path.starts_with("src/")
            || matches!(
                ext,
                "rs" | "py" | "ts" | "js" | "go" | "tsx" | "jsx" | "java" | "kt" | "c" | "cpp"
            )
        {
            return Self::Source;
        }

        Self::Other
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tests => "Tests",
            Self::Configuration => "Configuration",
            Self::Documentation => "Documentation",
            Self::CiCd => "CI/CD",
            Self::Source => "Source",
            Self::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_precedence_follows_declaration_order() {
        assert_eq!(FileArea::from_path(Path::new("tests/test_main.py")), FileArea::Tests);
        assert_eq!(FileArea::from_path(Path::new(".github/workflows/ci.yml")), FileArea::CiCd);
        assert_eq!(FileArea::from_path(Path::new("README.md")), FileArea::Documentation);
        assert_eq!(FileArea::from_path(Path::new("requirements.txt")), FileArea::Documentation);
        assert_eq!(FileArea::from_path(Path::new("Cargo.toml")), FileArea::Configuration);
        assert_eq!(FileArea::from_path(Path::new("src/lib.rs")), FileArea::Source);
        assert_eq!(FileArea::from_path(Path::new("assets/logo.png")), FileArea::Other);
    }

    #[test]
    fn unknown_status_deserializes() {
        let file: ChangedFile =
            serde_json::from_str(r#"{"filename": "a.rs", "status": "exploded"}"#).unwrap();
        assert_eq!(file.status, ChangeStatus::Unknown);
        assert!(file.patch().is_none());
    }
}
