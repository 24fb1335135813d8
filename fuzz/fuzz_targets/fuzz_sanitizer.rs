// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

#![no_main]

use libfuzzer_sys::fuzz_target;

use diffscrub::{TRUNCATION_MARKER, sanitize};

fuzz_target!(|data: &[u8]| {
    let Some((&budget, rest)) = data.split_first() else {
        return;
    };
    let text = String::from_utf8_lossy(rest);
    let budget = usize::from(budget) * 16;

    let once = sanitize(&text, budget);
    assert!(once.chars().count() <= budget + TRUNCATION_MARKER.chars().count());
    assert_eq!(sanitize(&once, budget), once);
});
