// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

//! Secret detection and redaction.
//!
//! Every rule is matched against the input text on its own; matches are
//! never re-scanned after an earlier substitution. Overlapping matches from
//! different rules collapse into one span, replaced by the placeholder of
//! the earliest rule involved.
//!
//! Patterns carry no trailing context (no `\b` or `$` after the secret), so
//! a prefix of clean text is itself clean. Truncation therefore cannot
//! produce a new match, and placeholders never match any rule.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Finding;

pub const REDACTED: &str = "[REDACTED]";

/// Base64 body lines following a private key header whose footer is missing.
/// Lines may carry a leading diff marker.
const KEY_BODY: &str = r"(?:\r?\n[+\- ]?[A-Za-z0-9+/=]{16,})*";

pub struct RedactionRule {
    pub name: &'static str,
    pub placeholder: &'static str,
    pattern: Regex,
}

impl RedactionRule {
    fn new(name: &'static str, pattern: &str, placeholder: &'static str) -> Self {
        Self {
            name,
            placeholder,
            pattern: Regex::new(pattern).expect("redaction patterns are valid regexes"),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Byte ranges to replace: the `secret` group when the rule has one,
    /// the whole match otherwise.
    fn secret_ranges<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Range<usize>> + 'a {
        self.pattern.captures_iter(text).filter_map(|caps| {
            let m = caps.name("secret").or_else(|| caps.get(0))?;
            (!m.is_empty()).then(|| m.range())
        })
    }
}

fn private_key_block(label: &str) -> String {
    format!(
        r"-----BEGIN {label}-----(?:(?s:.*?)-----END {label}-----|{KEY_BODY})"
    )
}

static RULES: LazyLock<Vec<RedactionRule>> = LazyLock::new(|| {
    vec![
        RedactionRule::new(
            "ssh_private_key",
            &private_key_block("OPENSSH PRIVATE KEY"),
            "[REDACTED_SSH_KEY]",
        ),
        RedactionRule::new(
            "pem_private_key",
            &private_key_block("(?:[A-Z0-9]+ )*PRIVATE KEY(?: BLOCK)?"),
            "[REDACTED_PEM_KEY]",
        ),
        RedactionRule::new(
            "aws_access_key",
            r"(?:AKIA|ASIA|AGPA|AIDA|AROA|AIPA|ANPA|ANVA)[0-9A-Z]{16}",
            "[REDACTED_AWS_KEY]",
        ),
        RedactionRule::new(
            "google_api_key",
            r"AIza[0-9A-Za-z_\-]{35}",
            "[REDACTED_GOOGLE_KEY]",
        ),
        RedactionRule::new(
            "github_token",
            r"(?:gh[pousr]_|github_pat_)(?P<secret>[A-Za-z0-9_]{22,})",
            REDACTED,
        ),
        RedactionRule::new(
            "gitlab_token",
            r"glpat-(?P<secret>[A-Za-z0-9_\-]{20,})",
            REDACTED,
        ),
        RedactionRule::new(
            "slack_token",
            r"xox[abprs]-[A-Za-z0-9\-]{10,}",
            "[REDACTED_SLACK_TOKEN]",
        ),
        // OpenAI (sk-, sk-proj-), Anthropic (sk-ant-) and lookalikes
        RedactionRule::new(
            "ai_provider_key",
            r"sk-[A-Za-z0-9_\-]{20,}",
            "[REDACTED_SK_KEY]",
        ),
        RedactionRule::new(
            "stripe_key",
            r"(?:sk|rk)_(?:live|test)_[A-Za-z0-9]{16,}",
            "[REDACTED_STRIPE_KEY]",
        ),
        RedactionRule::new(
            "jwt",
            r"eyJ[A-Za-z0-9_\-]{10,}\.eyJ[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}",
            "[REDACTED_JWT]",
        ),
        RedactionRule::new(
            "bearer_token",
            r"(?i)bearer[ \t]+(?P<secret>[A-Za-z0-9_\-.~+/=]{20,})",
            REDACTED,
        ),
        // Userinfo excludes brackets so it never runs across a placeholder.
        RedactionRule::new(
            "connection_string",
            r"(?i)(?:postgres(?:ql)?|mysql|mariadb|mongodb(?:\+srv)?|rediss?|amqps?)://(?P<secret>[^\s:@/\[\]]+:[^\s@/\[\]]+)@",
            REDACTED,
        ),
        // Values starting with `[` are skipped so placeholders stay stable.
        RedactionRule::new(
            "env_assignment",
            r"(?im)^[+\- ]?[ \t]*(?:export[ \t]+)?[A-Z0-9_]*(?:KEY|SECRET|TOKEN|PASSWORD|PASSWD|PWD|CREDENTIAL|AUTH|PRIVATE|DATABASE_URL|DSN)[A-Z0-9_]*[ \t]*=[ \t]*(?P<secret>[^\s\[=][^\r\n]*)",
            REDACTED,
        ),
        RedactionRule::new(
            "keyword_assignment",
            r#"(?i)(?:api[_\-]?key|secret|token|password|passwd|auth|credential|private[_\-]?key)[A-Za-z0-9_\-]*["']?[ \t]*[:=][ \t]*["']?(?P<secret>[A-Za-z0-9_\-]{20,})"#,
            REDACTED,
        ),
        RedactionRule::new(
            "hex_secret",
            r#"["'](?P<secret>[A-Fa-f0-9]{40,})["']"#,
            "[REDACTED_HEX]",
        ),
        RedactionRule::new(
            "base64_secret",
            r#"["'](?P<secret>[A-Za-z0-9+/]{40,}={0,2})["']"#,
            "[REDACTED_BASE64]",
        ),
    ]
});

/// All rules, in application order.
pub fn rules() -> &'static [RedactionRule] {
    &RULES
}

#[derive(Debug)]
struct Span {
    range: Range<usize>,
    priority: usize,
    placeholder: &'static str,
}

fn collect_spans(text: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = rules()
        .iter()
        .enumerate()
        .flat_map(|(priority, rule)| {
            rule.secret_ranges(text).map(move |range| Span {
                range,
                priority,
                placeholder: rule.placeholder,
            })
        })
        .collect();

    spans.sort_by_key(|s| (s.range.start, s.priority));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.range.start < last.range.end => {
                last.range.end = last.range.end.max(span.range.end);
                if span.priority < last.priority {
                    last.priority = span.priority;
                    last.placeholder = span.placeholder;
                }
            }
            _ => merged.push(span),
        }
    }

    merged
}

/// Replace every rule match in `text` with its placeholder.
pub fn redact(text: &str) -> String {
    let spans = collect_spans(text);
    if spans.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        out.push_str(&text[cursor..span.range.start]);
        out.push_str(span.placeholder);
        cursor = span.range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Report the first matching rule of each line. Read-only.
pub fn scan(text: &str) -> Vec<Finding> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            rules()
                .iter()
                .find(|rule| rule.is_match(line))
                .map(|rule| Finding {
                    rule: rule.name,
                    line: idx + 1,
                })
        })
        .collect()
}
