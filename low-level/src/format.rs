/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! mIRC-style formatting control codes for status lines.

pub const PLAIN: &str = "\x0f";
pub const BOLD: &str = "\x02";
pub const COLOR: &str = "\x03";

const GREEN: &str = "03";
const RED: &str = "04";

pub fn bold(text: &str) -> String {
  format!("{}{}{}", BOLD, text, BOLD)
}

pub fn green(text: &str) -> String {
  format!("{}{}{}{}", COLOR, GREEN, text, PLAIN)
}

pub fn red(text: &str) -> String {
  format!("{}{}{}{}", COLOR, RED, text, PLAIN)
}

/// Remove formatting codes, e.g. to compare rendered lines in logs or tests.
pub fn strip(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '\x02' | '\x0f' | '\x1d' | '\x1f' | '\x16' => (),
      '\x03' => {
        /* Up to two foreground digits, optionally followed by a comma and two background digits. */
        for _ in 0..2 {
          if chars.peek().map_or(false, char::is_ascii_digit) {
            chars.next();
          }
        }
        let mut lookahead = chars.clone();
        if lookahead.next() == Some(',') && lookahead.peek().map_or(false, char::is_ascii_digit) {
          chars.next();
          for _ in 0..2 {
            if chars.peek().map_or(false, char::is_ascii_digit) {
              chars.next();
            }
          }
        }
      }
      _ => out.push(c),
    }
  }
  out
}
