/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Failures an [Engine](crate::Engine) may report back to the client.

use displaydoc::Display;
use thiserror::Error;

use std::io;

#[derive(Debug, Display, Error)]
pub enum EngineError {
  /// an i/o error was received: {0}
  Io(#[from] io::Error),
  /// the message could not be encrypted: {0}
  Encryption(String),
  /// no session exists for {0}
  NoSession(String),
  /// no verification is in progress for {0}
  NoVerification(String),
  /// stored engine state at {0} could not be parsed: {1}
  CorruptState(String, String),
  /// engine error: {0}
  Other(String),
}

impl EngineError {
  /// Whether this error only says that a file did not exist yet, which is the normal state of a
  /// fresh install.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::NotFound)
  }
}
