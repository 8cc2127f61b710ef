/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! This crate wires an [OTR] engine into a line-oriented IRC client. It decides which messages the
//! engine gets to see, substitutes decrypted or encrypted text, keeps the user's trust decisions on
//! disk, and reports what the engine is doing in the peer's window. The engine itself is supplied
//! by the caller through [ircotr_low_level::Engine], and the client through [Host].
//!
//! [OTR]: https://otr.cypherpunks.ca/
//!
//! Engine events become plain status lines:
//!```
//! use ircotr::{commands::split_command, notify::render};
//! use ircotr_low_level::{format::strip, EngineEvent, SessionEvent};
//!
//! let lines = render(&EngineEvent::Session(SessionEvent::GoneSecure { trusted: true }));
//! assert_eq!(strip(&lines[0]), "Connection secured [trusted]");
//!
//! // `/extension OTR ask what was our first pet?`
//! assert_eq!(
//!   split_command("ask   what was our first pet?"),
//!   ("ask", "what was our first pet?")
//! );
//!```

/* Turn all warnings into errors! */
/* #![deny(warnings)] */
/* Warn for missing docs in general, and hard require crate-level docs. */
/* #![warn(missing_docs)] */
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
/* Make all doctests fail if they produce any warnings. */
#![doc(test(attr(deny(warnings))))]
/* Enable all clippy lints except for many of the pedantic ones. It's a shame this needs to be
 * copied and pasted across crates, but there doesn't appear to be a way to include inner attributes
 * from a common source. */
#![deny(
  clippy::all,
  clippy::default_trait_access,
  clippy::expl_impl_clone_on_copy,
  clippy::if_not_else,
  clippy::needless_continue,
  clippy::unseparated_literal_suffix,
  clippy::used_underscore_binding
)]
/* It is often more clear to show that nothing is being moved. */
#![allow(clippy::match_ref_pats)]
/* Subjective style. */
#![allow(
  clippy::len_without_is_empty,
  clippy::redundant_field_names,
  clippy::too_many_arguments
)]
/* Default isn't as big a deal as people seem to think it is. */
#![allow(clippy::new_without_default, clippy::new_ret_no_self)]

pub mod commands;
pub mod config;
pub mod error;
pub mod extension;
pub mod host;
pub mod intercept;
pub mod notify;
pub mod resolver;
pub mod trust;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::Error;
pub use extension::{Extension, SharedExtension};
pub use host::{Focus, Host, PrintLevel};
pub use intercept::ProcessResult;
