/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Events an [Engine](crate::Engine) reports while processing a call.
//!
//! Engines that surface numeric event codes convert them with `from_code()`, which rejects codes
//! outside the known range instead of faulting on them.

use crate::session::Fingerprint;

/// Progress of the Socialist Millionaires' Protocol, used to verify a peer with a shared secret.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VerificationEvent {
  None,
  Error,
  Abort,
  Cheated,
  /// The peer asked a question and expects us to answer it.
  AskForAnswer,
  /// The peer started a verification and expects the shared secret.
  AskForSecret,
  InProgress,
  Success,
  Failure,
}

impl VerificationEvent {
  pub fn from_code(code: u32) -> Option<Self> {
    Some(match code {
      0 => Self::None,
      1 => Self::Error,
      2 => Self::Abort,
      3 => Self::Cheated,
      4 => Self::AskForAnswer,
      5 => Self::AskForSecret,
      6 => Self::InProgress,
      7 => Self::Success,
      8 => Self::Failure,
      _ => return None,
    })
  }

  /// Whether the user is now expected to reply with the `secret` command.
  pub fn wants_reply(&self) -> bool {
    matches!(self, Self::AskForAnswer | Self::AskForSecret)
  }
}

/// Per-message conditions the engine reports, mostly errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MessageEvent {
  None,
  EncryptionRequired,
  EncryptionError,
  ConnectionEnded,
  SetupError,
  MessageReflected,
  MessageResent,
  ReceivedNotInPrivate,
  ReceivedUnreadable,
  ReceivedMalformed,
  HeartbeatReceived,
  HeartbeatSent,
  ReceivedGeneralError,
  ReceivedUnencrypted,
  ReceivedUnrecognized,
  ReceivedForOtherInstance,
}

impl MessageEvent {
  pub fn from_code(code: u32) -> Option<Self> {
    Some(match code {
      0 => Self::None,
      1 => Self::EncryptionRequired,
      2 => Self::EncryptionError,
      3 => Self::ConnectionEnded,
      4 => Self::SetupError,
      5 => Self::MessageReflected,
      6 => Self::MessageResent,
      7 => Self::ReceivedNotInPrivate,
      8 => Self::ReceivedUnreadable,
      9 => Self::ReceivedMalformed,
      10 => Self::HeartbeatReceived,
      11 => Self::HeartbeatSent,
      12 => Self::ReceivedGeneralError,
      13 => Self::ReceivedUnencrypted,
      14 => Self::ReceivedUnrecognized,
      15 => Self::ReceivedForOtherInstance,
      _ => return None,
    })
  }
}

/// Transitions of the session's security state. `trusted` tells whether the fingerprint in use
/// carries a trust label.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SessionEvent {
  GoneSecure { trusted: bool },
  StillSecure { trusted: bool },
  GoneInsecure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
  Verification {
    event: VerificationEvent,
    question: Option<String>,
  },
  Message {
    event: MessageEvent,
    message: Option<String>,
  },
  Session(SessionEvent),
  /// A key exchange produced a fingerprint we had never seen for this peer.
  NewFingerprint(Fingerprint),
  /// The engine's fingerprint table changed and should be written back.
  FingerprintsChanged,
}

impl EngineEvent {
  /// Build a verification event from a raw code, dropping unknown codes.
  pub fn verification_code(code: u32, question: Option<String>) -> Option<Self> {
    VerificationEvent::from_code(code).map(|event| Self::Verification { event, question })
  }

  /// Build a message event from a raw code, dropping unknown codes.
  pub fn message_code(code: u32, message: Option<String>) -> Option<Self> {
    MessageEvent::from_code(code).map(|event| Self::Message { event, message })
  }
}
