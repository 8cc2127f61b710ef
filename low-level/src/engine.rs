/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! The contract between the client integration and an OTR engine.
//!
//! The engine is a black box holding every session's cryptographic state. The client owns exactly
//! one engine value for its whole lifetime and hands it `&mut` into every call; dropping it
//! destroys all session state. While the engine runs it calls back into the client through
//! [AppOps], which is how it learns about policy, sends protocol messages and reports
//! [EngineEvent]s.
//!
//! Calls are synchronous. An engine is not expected to tolerate concurrent calls.

use crate::error::EngineError;
use crate::event::EngineEvent;
use crate::session::{Fingerprint, SessionContext, SessionKey};

use std::path::{Path, PathBuf};

/// Which protocol behaviors the engine may use for a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Policy {
  pub allow_v2: bool,
  pub allow_v3: bool,
  pub require_encryption: bool,
  /// Append the invisible whitespace tag advertising OTR support to plaintext messages.
  pub send_whitespace_tag: bool,
  pub whitespace_start_ake: bool,
  pub error_start_ake: bool,
}

impl Policy {
  /// Opportunistic encryption: advertise, and start a key exchange whenever the peer does.
  pub const OPPORTUNISTIC: Policy = Policy {
    allow_v2: true,
    allow_v3: true,
    require_encryption: false,
    send_whitespace_tag: true,
    whitespace_start_ake: true,
    error_start_ake: true,
  };

  pub fn without_whitespace_tag(self) -> Self {
    Self {
      send_whitespace_tag: false,
      ..self
    }
  }
}

impl Default for Policy {
  fn default() -> Self {
    Self::OPPORTUNISTIC
  }
}

/// The durable artifacts the engine reads at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StateFile {
  PrivateKeys,
  Fingerprints,
  InstanceTags,
}

impl StateFile {
  pub const ALL: [StateFile; 3] = [Self::PrivateKeys, Self::Fingerprints, Self::InstanceTags];

  pub fn file_name(&self) -> &'static str {
    match self {
      Self::PrivateKeys => "otr-keys.txt",
      Self::Fingerprints => "otr-fingerprints.txt",
      Self::InstanceTags => "otr-instags.txt",
    }
  }
}

/// Outcome of feeding an incoming message to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Received {
  /// The message was protocol traffic and has been fully consumed.
  pub internal: bool,
  /// Text to show instead of the received message, e.g. the decrypted plaintext.
  pub plaintext: Option<String>,
}

impl Received {
  pub fn internal() -> Self {
    Self {
      internal: true,
      plaintext: None,
    }
  }

  pub fn plaintext(text: impl Into<String>) -> Self {
    Self {
      internal: false,
      plaintext: Some(text.into()),
    }
  }

  pub fn untouched() -> Self {
    Self::default()
  }
}

/// Callbacks the engine makes into the client while it is processing a call.
pub trait AppOps {
  fn policy(&self, key: &SessionKey) -> Policy;
  /// Largest message, in bytes, the transport accepts; longer payloads must be fragmented.
  fn max_message_size(&self, key: &SessionKey) -> usize;
  /// Whether the peer is known to be online. [None] means we can't tell.
  fn is_logged_in(&self, key: &SessionKey) -> Option<bool>;
  /// Send a protocol message (e.g. a key exchange step) to `key.username`.
  fn inject_message(&mut self, key: &SessionKey, message: &str);
  /// Where a lazily created artifact (a new private key or instance tag) should be written. [None]
  /// if there is nowhere to persist it.
  fn state_path(&self, file: StateFile) -> Option<PathBuf>;
  fn notify(&mut self, key: &SessionKey, event: EngineEvent);
}

/// An OTR engine: a state machine over all sessions, keyed by [SessionKey].
pub trait Engine {
  fn read_private_keys(&mut self, path: &Path) -> Result<(), EngineError>;
  fn read_fingerprints(&mut self, path: &Path) -> Result<(), EngineError>;
  fn read_instance_tags(&mut self, path: &Path) -> Result<(), EngineError>;
  /// Write the whole fingerprint table, replacing the file.
  fn write_fingerprints(&self, path: &Path) -> Result<(), EngineError>;

  /// Process a message received from `key.username`, addressed to `key.account`.
  fn receive(&mut self, ops: &mut dyn AppOps, key: &SessionKey, message: &str) -> Received;
  /// Transform `plaintext` for sending to `key.username`. `Ok(None)` means send it unchanged.
  fn send(
    &mut self,
    ops: &mut dyn AppOps,
    key: &SessionKey,
    plaintext: &str,
  ) -> Result<Option<String>, EngineError>;

  /// Start verifying the peer with a shared secret.
  fn initiate_verification(
    &mut self,
    ops: &mut dyn AppOps,
    key: &SessionKey,
    secret: &[u8],
  ) -> Result<(), EngineError>;
  /// Answer the peer's verification. Only valid while [SessionContext::awaiting_secret] is set.
  fn respond_verification(
    &mut self,
    ops: &mut dyn AppOps,
    key: &SessionKey,
    secret: &[u8],
  ) -> Result<(), EngineError>;

  /// End every session instance with the peer.
  fn disconnect_all_instances(&mut self, ops: &mut dyn AppOps, key: &SessionKey);

  /// Label the peer's fingerprint. An empty label marks it untrusted.
  fn set_trust(
    &mut self,
    key: &SessionKey,
    fingerprint: &Fingerprint,
    label: &str,
  ) -> Result<(), EngineError>;

  /// Look up an existing session. Never creates one.
  fn find_context(&self, key: &SessionKey) -> Option<SessionContext>;
  /// Fingerprint of our own long-term key for `account` on `protocol`, if one exists.
  fn local_fingerprint(&self, account: &str, protocol: &str) -> Option<Fingerprint>;

  /// Periodic housekeeping, such as expiring old keys.
  fn poll(&mut self, ops: &mut dyn AppOps);
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn default_policy_without_whitespace() {
    let policy = Policy::default().without_whitespace_tag();
    assert!(!policy.send_whitespace_tag);
    assert!(policy.allow_v2 && policy.allow_v3);
    assert!(!policy.require_encryption);
  }

  #[test]
  fn state_file_names() {
    let names: Vec<&str> = StateFile::ALL.iter().map(StateFile::file_name).collect();
    assert_eq!(
      names,
      vec!["otr-keys.txt", "otr-fingerprints.txt", "otr-instags.txt"]
    );
  }
}
