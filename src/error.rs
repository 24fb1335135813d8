// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("{count} potential secret(s) found")]
    #[diagnostic(
        code(diffscrub::scan::secrets),
        help("Run `diffscrub sanitize` on the text before sending it anywhere")
    )]
    SecretsFound { count: usize },

    #[error("Cannot read input '{path}': {message}")]
    #[diagnostic(
        code(diffscrub::input::unreadable),
        help("Pass an existing file with --input, or pipe text on stdin")
    )]
    Input { path: String, message: String },

    #[error("Invalid JSON in '{path}': {source}")]
    #[diagnostic(
        code(diffscrub::input::json),
        help("Expected the JSON returned by the GitHub REST API")
    )]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    #[diagnostic(
        code(diffscrub::config::glob),
        help("Check the include/exclude patterns under [selection]")
    )]
    Glob { pattern: String, message: String },

    #[error("Provider '{provider}' error: {message}")]
    #[diagnostic(code(diffscrub::provider::error))]
    Provider { provider: String, message: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(diffscrub::config::error))]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
