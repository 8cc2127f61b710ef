/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! What an engine session looks like from the outside: how it is keyed, and the snapshot of its
//! state that the client is allowed to display.

use crate::casemap::normalize;

use std::fmt;

/// Identifies one conversation inside the engine.
///
/// The field names follow the engine's vocabulary: `account` is our own nickname, `protocol` is
/// the network name and `username` is the peer's nickname. Both nicknames are case-folded on
/// construction; the network name is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey {
  pub account: String,
  pub protocol: String,
  pub username: String,
}

impl SessionKey {
  pub fn new(network: &str, own_nick: &str, peer: &str) -> Self {
    Self {
      account: normalize(own_nick),
      protocol: network.to_string(),
      username: normalize(peer),
    }
  }
}

impl fmt::Display for SessionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{} -> {}", self.account, self.protocol, self.username)
  }
}

/// Length in bytes of a long-term key fingerprint (a SHA-1 digest).
pub const FINGERPRINT_LEN: usize = 20;

/// Digest of a long-term public key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
  pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
    &self.0
  }

  /// The conventional human-readable form: five space-separated groups of eight uppercase hex
  /// digits.
  pub fn to_human(&self) -> String {
    let hex = hex::encode_upper(self.0);
    let groups: Vec<&str> = (0..hex.len())
      .step_by(8)
      .map(|start| &hex[start..start + 8])
      .collect();
    groups.join(" ")
  }

  /// Parse either the human-readable form or a bare 40-digit hex string.
  pub fn from_human(s: &str) -> Option<Self> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let mut bytes = [0_u8; FINGERPRINT_LEN];
    hex::decode_to_slice(digits, &mut bytes).ok()?;
    Some(Self(bytes))
  }
}

impl From<[u8; FINGERPRINT_LEN]> for Fingerprint {
  fn from(value: [u8; FINGERPRINT_LEN]) -> Self {
    Self(value)
  }
}

impl From<Fingerprint> for [u8; FINGERPRINT_LEN] {
  fn from(value: Fingerprint) -> Self {
    value.0
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_human())
  }
}

/// A peer's fingerprint together with the trust label the user gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerFingerprint {
  pub fingerprint: Fingerprint,
  /// Empty means untrusted. Any other value is the label the fingerprint was trusted with.
  pub trust: String,
}

impl PeerFingerprint {
  pub fn new(fingerprint: Fingerprint, trust: impl Into<String>) -> Self {
    Self {
      fingerprint,
      trust: trust.into(),
    }
  }

  pub fn is_trusted(&self) -> bool {
    !self.trust.is_empty()
  }
}

/// Per-client-instance tag, shown as eight hex digits.
#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Default)]
pub struct InstanceTag(u32);

impl From<u32> for InstanceTag {
  fn from(value: u32) -> Self {
    Self(value)
  }
}

impl From<InstanceTag> for u32 {
  fn from(value: InstanceTag) -> Self {
    value.0
  }
}

impl fmt::Display for InstanceTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:08X}", self.0)
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MessageState {
  Plaintext,
  Encrypted,
  Finished,
}

/// Snapshot of an engine session. This is re-queried for every command and never kept around, so
/// it can never go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
  pub key: SessionKey,
  pub state: MessageState,
  /// The fingerprint used by the current session, once a key exchange has happened.
  pub active_fingerprint: Option<PeerFingerprint>,
  pub our_instance: InstanceTag,
  pub their_instance: InstanceTag,
  pub protocol_version: u32,
  /// Whether a peer verification is waiting for us to supply the shared secret. Responding at any
  /// other time is invalid.
  pub awaiting_secret: bool,
}

impl SessionContext {
  /// A fresh plaintext session with no fingerprint yet.
  pub fn new(key: SessionKey) -> Self {
    Self {
      key,
      state: MessageState::Plaintext,
      active_fingerprint: None,
      our_instance: InstanceTag::default(),
      their_instance: InstanceTag::default(),
      protocol_version: 0,
      awaiting_secret: false,
    }
  }

  pub fn is_trusted(&self) -> bool {
    self
      .active_fingerprint
      .as_ref()
      .map_or(false, PeerFingerprint::is_trusted)
  }
}
