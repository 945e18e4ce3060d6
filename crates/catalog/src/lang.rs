// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! BCP-47-style language matching (spec §4.3). Plain tag-prefix
//! comparison — no external BCP-47 crate, since the matching rules are
//! fully specified by the spec: walk `preferred` in rank order and, for
//! each tag, try a full-tag match then a primary-subtag match before
//! moving to the next preferred tag — a higher-ranked tag's primary-subtag
//! match outranks a lower-ranked tag's exact match. If nothing in
//! `preferred` matches at all, fall back to the model's default language,
//! then the zero-indexed available language, then empty.

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Selects the best match in `available` for the ranked `preferred` list,
/// falling back to `default_tag`, then to `available[0]`, then `""`.
pub fn match_language(preferred: &[String], available: &[String], default_tag: &str) -> String {
    if available.is_empty() {
        return String::new();
    }

    for want in preferred {
        if let Some(hit) = available.iter().find(|have| eq_ignore_case(have, want)) {
            return hit.clone();
        }
        let want_primary = primary_subtag(want);
        if let Some(hit) = available.iter().find(|have| eq_ignore_case(primary_subtag(have), want_primary)) {
            return hit.clone();
        }
    }
    if let Some(hit) = available.iter().find(|have| eq_ignore_case(have, default_tag)) {
        return hit.clone();
    }
    available[0].clone()
}

#[cfg(test)]
#[path = "lang_tests.rs"]
mod tests;
