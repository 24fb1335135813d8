// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::Config;
use crate::domain::ChangedFile;
use crate::error::{Error, Result};

/// Picks the changed source files a draft test suite is worth writing for.
pub struct FileSelector {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileSelector {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile_globset(include)?,
            exclude: compile_globset(exclude)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.selection.include, &config.selection.exclude)
    }

    pub fn is_selected(&self, filename: &str) -> bool {
        self.include.is_match(filename) && !self.exclude.is_match(filename)
    }

    pub fn select<'a>(&self, files: &'a [ChangedFile]) -> Vec<&'a ChangedFile> {
        let selected: Vec<_> = files
            .iter()
            .filter(|f| self.is_selected(&f.filename))
            .collect();
        debug!(total = files.len(), selected = selected.len(), "selected files");
        selected
    }
}

fn compile_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::Glob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::Glob {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}
