// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

//! Secret redaction and budgeted truncation for repository text bound for
//! an LLM prompt. [`sanitize`] is the entry point; the binary builds the
//! PR, test and release payloads on top of it.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use app::App;
pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
pub use services::sanitizer::{TRUNCATION_MARKER, sanitize, truncate};
