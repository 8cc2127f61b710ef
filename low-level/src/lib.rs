/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! This crate defines the vocabulary shared between an IRC client and an [OTR] engine: how IRC
//! identifiers fold into session keys, how transport batches are tracked, what a session looks
//! like from the outside, and the [Engine] contract itself. It performs no cryptography.
//!
//! [OTR]: https://otr.cypherpunks.ca/
//!
//! A session key is always built from case-folded nicknames, so differently-spelled nicknames land
//! on the same engine session:
//!```
//! use ircotr_low_level::{casemap::normalize, BatchTracker, SessionKey};
//!
//! let key = SessionKey::new("libera", "Me[away]", "BOB");
//! assert_eq!(key.account, "me{away}");
//! assert_eq!(key.username, "bob");
//! assert_eq!(key.protocol, "libera");
//! assert_eq!(normalize("Bob^"), "bob~");
//!
//! // Messages framed by an open batch are replayed history, not live conversation.
//! let mut batches = BatchTracker::new();
//! batches.apply("libera", "+chathistory1");
//! assert!(batches.is_open("libera"));
//! batches.apply("libera", "-chathistory1");
//! assert!(!batches.is_open("libera"));
//!```

/* Turn all warnings into errors! */
/* #![deny(warnings)] */
/* Warn for missing docs in general, and hard require crate-level docs. */
/* #![warn(missing_docs)] */
#![deny(rustdoc::missing_crate_level_docs)]
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

pub mod batch;
pub mod casemap;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod message;
pub mod session;

pub use batch::BatchTracker;
pub use engine::{AppOps, Engine, Policy, Received, StateFile};
pub use error::EngineError;
pub use event::{EngineEvent, MessageEvent, SessionEvent, VerificationEvent};
pub use message::{Chat, IrcMessage, Prefix};
pub use session::{
  Fingerprint, InstanceTag, MessageState, PeerFingerprint, SessionContext, SessionKey,
};
