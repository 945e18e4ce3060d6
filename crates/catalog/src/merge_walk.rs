// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The generic merge-walk (spec §4.3, §9: "expressed once as a generic
//! function parameterized by the key extractor and the assignment
//! callback"). Walks destination object keys and source text rows, both
//! sorted on the same key, in a single O(S + D) pass:
//!
//! For each destination key it records the first matching row in the
//! default language (`nf`) and the last matching row in the preferred
//! language (`ni`); when the key ends it emits `ni` if matched, else
//! `nf`. Every object kind (types, parameters, tables, entities, groups,
//! ...) calls this once with its own key/language extractors.

/// Runs the merge-walk for one object kind. `dest_keys` and `source_rows`
/// must both be sorted ascending by `key_of`/the key embedded in each
/// source row — callers are responsible for that invariant, matching how
/// this corpus's own state-reconciliation passes take pre-sorted input
/// rather than sorting defensively on every call.
pub fn merge_walk<K, R>(
    dest_keys: &[K],
    source_rows: &[R],
    key_of: impl Fn(&R) -> K,
    is_default_lang: impl Fn(&R) -> bool,
    is_chosen_lang: impl Fn(&R) -> bool,
) -> Vec<Option<R>>
where
    K: Ord + Clone,
    R: Clone,
{
    let mut out = Vec::with_capacity(dest_keys.len());
    let mut j = 0usize;

    for key in dest_keys {
        // Skip source rows that precede this destination key — they belong
        // to an object the destination set doesn't include.
        while j < source_rows.len() && &key_of(&source_rows[j]) < key {
            j += 1;
        }

        let mut nf: Option<R> = None;
        let mut ni: Option<R> = None;
        while j < source_rows.len() && &key_of(&source_rows[j]) == key {
            let row = &source_rows[j];
            if nf.is_none() && is_default_lang(row) {
                nf = Some(row.clone());
            }
            if is_chosen_lang(row) {
                // "last" preferred-language row wins on duplicates.
                ni = Some(row.clone());
            }
            j += 1;
        }

        out.push(ni.or(nf));
    }

    out
}

#[cfg(test)]
#[path = "merge_walk_tests.rs"]
mod tests;
