/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Turn engine events into status lines in the peer's window, and answer the engine's callbacks.

use crate::{host::Host, trust::TrustStore};

use ircotr_low_level::{
  format::{bold, green, red},
  AppOps, EngineEvent, IrcMessage, MessageEvent, Policy, SessionEvent, SessionKey, StateFile,
  VerificationEvent,
};

use tracing::{debug, trace};

use std::path::PathBuf;

/// The sender shown on every line this crate writes into a window.
pub const PLUGIN_USER: &str = "* OTR *";

/// Request an encrypted session, offering protocol versions 2 and 3.
pub const QUERY_TAG: &str = "?OTRv23?";

/// What peers without OTR support see instead of a bare query tag.
pub const QUERY_TEXT: &str = "?OTRv23? This message is attempting to initiate an encrypted \
                              session, but your client doesn't support this protocol.";

pub const MAX_MESSAGE_SIZE: usize = 400;

/// Write `text` into the window for `target` on `network`.
pub fn status<H: Host + ?Sized>(host: &mut H, network: &str, target: &str, text: &str) {
  host.inject_chat(network, PLUGIN_USER, target, text);
}

fn verification_label(event: VerificationEvent) -> String {
  match event {
    VerificationEvent::None => bold("none"),
    VerificationEvent::Error => red("error"),
    VerificationEvent::Abort => red("abort"),
    VerificationEvent::Cheated => red("cheated"),
    VerificationEvent::AskForAnswer => bold("question"),
    VerificationEvent::AskForSecret => bold("secret?"),
    VerificationEvent::InProgress => bold("in progress"),
    VerificationEvent::Success => green("success"),
    VerificationEvent::Failure => red("failure"),
  }
}

/// [None] for events that should never reach the user.
fn message_text(event: MessageEvent) -> Option<&'static str> {
  Some(match event {
    MessageEvent::None => "None",
    MessageEvent::EncryptionRequired => "Encryption required, message not sent",
    MessageEvent::EncryptionError => "Encryption error, message not sent",
    MessageEvent::ConnectionEnded => "Connection ended, message not sent",
    MessageEvent::SetupError => "Setup error",
    MessageEvent::MessageReflected => "Message reflected",
    MessageEvent::MessageResent => "Previous message resent",
    MessageEvent::ReceivedNotInPrivate => "Received unexpected encrypted message",
    MessageEvent::ReceivedUnreadable => "Received message unreadable",
    MessageEvent::ReceivedMalformed => "Received message malformed",
    MessageEvent::HeartbeatReceived | MessageEvent::HeartbeatSent => return None,
    MessageEvent::ReceivedGeneralError => "Received general error",
    MessageEvent::ReceivedUnencrypted => "Received message unencrypted",
    MessageEvent::ReceivedUnrecognized => "Received message unrecognizable",
    MessageEvent::ReceivedForOtherInstance => "Received message for other instance",
  })
}

fn trust_label(trusted: bool) -> String {
  if trusted {
    green("trusted")
  } else {
    red("untrusted")
  }
}

/// The lines shown for `event`, possibly none.
pub fn render(event: &EngineEvent) -> Vec<String> {
  match event {
    EngineEvent::Verification { event, question } => {
      let mut line = format!("Peer verification [{}]", verification_label(*event));
      if let Some(question) = question {
        line.push_str(&format!(" [{}]", question));
      }
      let mut lines = vec![line];
      if event.wants_reply() {
        lines.push("Reply with: /extension OTR secret <answer>".to_string());
      }
      lines
    }
    EngineEvent::Message { event, message } => match (message_text(*event), message) {
      (None, _) => vec![],
      (Some(text), None) => vec![text.to_string()],
      (Some(text), Some(message)) => vec![format!("{} [{}]", text, message)],
    },
    EngineEvent::Session(SessionEvent::GoneSecure { trusted }) => {
      vec![format!("Connection secured [{}]", trust_label(*trusted))]
    }
    EngineEvent::Session(SessionEvent::StillSecure { trusted }) => {
      vec![format!("Connection refreshed [{}]", trust_label(*trusted))]
    }
    EngineEvent::Session(SessionEvent::GoneInsecure) => {
      vec![format!("Connection {}", red("insecure"))]
    }
    EngineEvent::NewFingerprint(fingerprint) => {
      vec![format!("New fingerprint: [{}]", bold(&fingerprint.to_human()))]
    }
    EngineEvent::FingerprintsChanged => vec![],
  }
}

/// Whether `message` is an OTR query, i.e. its first `?OTR` marker is followed by `?` or `v`.
pub fn is_query(message: &str) -> bool {
  match message.find("?OTR") {
    Some(i) => matches!(message.as_bytes().get(i + 4), Some(b'?') | Some(b'v')),
    None => false,
  }
}

/// The text actually sent for a protocol message the engine injects. Queries get an explanation for
/// clients without OTR, and line breaks are flattened since IRC messages are single lines.
pub fn prepare_injected(message: &str) -> Option<String> {
  if is_query(message) {
    return Some(QUERY_TEXT.to_string());
  }
  let flat: String = message
    .chars()
    .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
    .collect();
  if flat.trim().is_empty() {
    None
  } else {
    Some(flat)
  }
}

/// The client side of an engine call. Lives only for the duration of that call.
pub struct Ops<'a, H: Host + ?Sized> {
  host: &'a mut H,
  trust: &'a TrustStore,
  fingerprints_changed: bool,
}

impl<'a, H: Host + ?Sized> Ops<'a, H> {
  pub fn new(host: &'a mut H, trust: &'a TrustStore) -> Self {
    Self {
      host,
      trust,
      fingerprints_changed: false,
    }
  }

  /// End the call, reporting whether the fingerprint table needs to be written.
  pub fn finish(self) -> bool {
    self.fingerprints_changed
  }
}

impl<'a, H: Host + ?Sized> AppOps for Ops<'a, H> {
  fn policy(&self, _key: &SessionKey) -> Policy {
    Policy::default().without_whitespace_tag()
  }

  fn max_message_size(&self, _key: &SessionKey) -> usize {
    MAX_MESSAGE_SIZE
  }

  fn is_logged_in(&self, key: &SessionKey) -> Option<bool> {
    if self.host.is_logged_on(&key.protocol, &key.username) {
      Some(true)
    } else {
      None
    }
  }

  fn inject_message(&mut self, key: &SessionKey, message: &str) {
    match prepare_injected(message) {
      Some(text) => {
        trace!(peer = %key, len = text.len(), "sending protocol message");
        let message = IrcMessage::privmsg(key.protocol.as_str(), &key.username, &text);
        self.host.send_message(&message);
      }
      None => debug!(peer = %key, "dropping empty protocol message"),
    }
  }

  fn state_path(&self, file: StateFile) -> Option<PathBuf> {
    self.trust.path(file)
  }

  fn notify(&mut self, key: &SessionKey, event: EngineEvent) {
    debug!(peer = %key, ?event, "engine event");
    if event == EngineEvent::FingerprintsChanged {
      self.fingerprints_changed = true;
    }
    for line in render(&event) {
      status(&mut *self.host, &key.protocol, &key.username, &line);
    }
  }
}
