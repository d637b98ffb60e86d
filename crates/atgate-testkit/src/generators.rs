//! Proptest generators for property-based testing.

use proptest::prelude::*;

use atgate_core::{Identity, MAX_COMPARED_LEN};

/// Generate a plausible login name.
pub fn user_name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_-]{0,31}"
}

/// Generate a list of distinct login names.
pub fn user_names(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(user_name(), 0..=max).prop_map(|set| set.into_iter().collect())
}

/// Generate list-file contents from names, with or without a final newline.
pub fn list_contents(names: Vec<String>) -> impl Strategy<Value = String> {
    any::<bool>().prop_map(move |terminated| {
        let mut contents = names.join("\n");
        if terminated && !contents.is_empty() {
            contents.push('\n');
        }
        contents
    })
}

/// Generate an arbitrary line of bytes without a newline, possibly overlong.
pub fn raw_line() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        any::<u8>().prop_filter("no newline", |b| *b != b'\n'),
        0..MAX_COMPARED_LEN * 2,
    )
}

/// Generate a non-superuser identity with real and effective ids equal.
pub fn user_identity() -> impl Strategy<Value = Identity> {
    (1u32..60_000, 1u32..60_000).prop_map(|(uid, gid)| Identity::unprivileged(uid, gid))
}
