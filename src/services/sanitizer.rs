// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::borrow::Cow;

use tracing::debug;

use super::safety;

/// Appended to text cut at its budget. The leading newline ends any
/// partial token at the cut, so the marker never completes a secret match.
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Redact secrets, then cap the result at `max_chars` characters.
///
/// Never fails. The budget applies to the redacted text: when
/// `redact(s)` fits, it is returned without a marker, otherwise the output
/// is exactly `max_chars` chars followed by [`TRUNCATION_MARKER`]. A
/// placeholder may therefore be longer or shorter than the secret it
/// replaced, and a cut can end inside one (`[REDACTED_SLACK`). Only
/// placeholder text is lost that way.
///
/// `sanitize(sanitize(s, n), n) == sanitize(s, n)`.
pub fn sanitize(text: &str, max_chars: usize) -> String {
    let redacted = safety::redact(text);
    if redacted != text {
        debug!(
            before = text.len(),
            after = redacted.len(),
            "redacted potential secrets"
        );
    }

    match truncate(&redacted, max_chars) {
        Cow::Borrowed(_) => redacted,
        Cow::Owned(truncated) => truncated,
    }
}

/// Keep the first `max_chars` chars and append [`TRUNCATION_MARKER`].
/// Text within budget is returned as is.
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
            out.push_str(&text[..cut]);
            out.push_str(TRUNCATION_MARKER);
            Cow::Owned(out)
        }
    }
}
