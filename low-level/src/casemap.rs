/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! IRC nickname case folding.
//!
//! IRC identifiers follow the "rfc1459" casemapping, a leftover of the Swedish character set: on
//! top of ASCII `A-Z`, the characters `[\]^` are the uppercase forms of `{|}~`. Session keys are
//! built from folded nicknames so that an engine session lines up with what IRC considers the same
//! nickname.

/// Fold a single character. Everything outside `A-Z` and `[\]^` is left alone, including
/// non-ASCII characters.
pub fn fold_char(c: char) -> char {
  match c {
    'A'..='Z' => c.to_ascii_lowercase(),
    '[' => '{',
    '\\' => '|',
    ']' => '}',
    '^' => '~',
    _ => c,
  }
}

/// Return the case-folded form of `name`.
pub fn normalize(name: &str) -> String {
  name.chars().map(fold_char).collect()
}

/// Case-fold `name`, only allocating when some character actually changes.
pub fn normalize_in_place(name: &mut String) {
  if name
    .bytes()
    .any(|b| matches!(b, b'A'..=b'Z' | b'[' | b'\\' | b']' | b'^'))
  {
    *name = normalize(name);
  }
}

/// Whether two identifiers name the same IRC entity.
pub fn eq_folded(a: &str, b: &str) -> bool {
  a.len() == b.len() && a.chars().map(fold_char).eq(b.chars().map(fold_char))
}
