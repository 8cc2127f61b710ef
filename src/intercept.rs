/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Route incoming server messages and outgoing chat lines through the engine.
//!
//! Incoming: a server welcome (`001`) resets batch tracking for the network, `BATCH` opens or
//! closes a batch, and a `PRIVMSG` addressed to us is handed to the engine unless it is channel
//! traffic or replayed history. Outgoing: a line typed into a private conversation is replaced by
//! whatever the engine wants to send instead.

use crate::{extension::Extension, host::Host, notify};

use ircotr_low_level::{Chat, Engine, IrcMessage, Received, SessionKey};

use tracing::{debug, trace, warn};

/// Whether the client should go on to handle a message itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProcessResult {
  Pass,
  Drop,
}

/// Shown in place of an outgoing line the engine failed to encrypt.
pub const ENCRYPTION_PANIC: &str = "PANIC: OTR encryption error";

impl<E: Engine> Extension<E> {
  pub fn process_message<H: Host + ?Sized>(
    &mut self,
    host: &mut H,
    message: &IrcMessage,
  ) -> ProcessResult {
    match message.command.as_str() {
      "001" => {
        self.batches.reset(&message.network);
        ProcessResult::Pass
      }
      "BATCH" => {
        if let Some(token) = message.params.first() {
          self.batches.apply(&message.network, token);
        }
        ProcessResult::Pass
      }
      "PRIVMSG" => self.process_privmsg(host, message),
      _ => ProcessResult::Pass,
    }
  }

  fn process_privmsg<H: Host + ?Sized>(
    &mut self,
    host: &mut H,
    message: &IrcMessage,
  ) -> ProcessResult {
    let (target, text) = match message.params.as_slice() {
      [target, text] => (target, text),
      _ => return ProcessResult::Pass,
    };
    let prefix = match &message.prefix {
      Some(prefix) => prefix,
      None => return ProcessResult::Pass,
    };
    let network = message.network.as_str();
    if self.batches.is_open(network) {
      trace!(network, "message inside a batch, not decrypting");
      return ProcessResult::Pass;
    }
    if host.is_channel(network, target) {
      return ProcessResult::Pass;
    }

    let key = SessionKey::new(network, target, &prefix.nick);
    match self.with_engine(host, |engine, ops| engine.receive(ops, &key, text)) {
      Received { internal: true, .. } => ProcessResult::Drop,
      Received {
        plaintext: Some(plaintext),
        ..
      } => {
        host.inject_chat(network, &prefix.to_string(), &prefix.nick, &plaintext);
        ProcessResult::Drop
      }
      Received {
        plaintext: None, ..
      } => ProcessResult::Pass,
    }
  }

  pub fn process_chat<H: Host + ?Sized>(&mut self, host: &mut H, chat: &Chat) -> ProcessResult {
    let network = chat.network.as_str();
    if host.is_channel(network, &chat.target) {
      return ProcessResult::Pass;
    }
    let me = match host.my_nick(network).filter(|nick| !nick.is_empty()) {
      Some(me) => me,
      None => {
        debug!(network, "own nickname unknown, sending unmodified");
        return ProcessResult::Pass;
      }
    };

    let key = SessionKey::new(network, &me, &chat.target);
    match self.with_engine(host, |engine, ops| engine.send(ops, &key, &chat.message)) {
      Ok(None) => ProcessResult::Pass,
      Ok(Some(payload)) => {
        host.send_message(&IrcMessage::privmsg(network, &chat.target, &payload));
        ProcessResult::Drop
      }
      Err(e) => {
        warn!(peer = %key, error = %e, "message not sent");
        notify::status(host, network, &chat.target, ENCRYPTION_PANIC);
        ProcessResult::Drop
      }
    }
  }
}
