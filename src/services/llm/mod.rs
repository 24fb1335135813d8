// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

//! Client for the external completion endpoint. Callers hand it text that
//! has already been through the sanitizer.

pub mod openai;

pub use openai::OpenAiProvider;
