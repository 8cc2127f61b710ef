/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! The `/extension OTR <verb> [args]` commands.
//!
//! Every verb acts on the focused window. Verbs that need an established session quietly explain
//! themselves when there is none, instead of creating one.

use crate::{
  extension::Extension,
  host::{Host, PrintLevel},
  intercept::ProcessResult,
  notify::{self, QUERY_TAG},
  resolver::{self, Conversation, Resolved},
};

use ircotr_low_level::{
  format::{bold, green, red},
  Chat, Engine, Fingerprint, IrcMessage, MessageState, SessionContext,
};

use tracing::{debug, info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verb {
  Status,
  Secret,
  Ask,
  Start,
  End,
  Trust,
  Untrust,
  Poll,
  Help,
}

impl Verb {
  /// In the order `help` lists them.
  pub const ALL: [Verb; 9] = [
    Self::Status,
    Self::Secret,
    Self::Ask,
    Self::Start,
    Self::End,
    Self::Trust,
    Self::Untrust,
    Self::Poll,
    Self::Help,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Self::Status => "status",
      Self::Secret => "secret",
      Self::Ask => "ask",
      Self::Start => "start",
      Self::End => "end",
      Self::Trust => "trust",
      Self::Untrust => "untrust",
      Self::Poll => "poll",
      Self::Help => "help",
    }
  }

  pub fn doc(&self) -> &'static str {
    match self {
      Self::Status => "Show session status",
      Self::Secret => "Answer a verification request: secret <answer>",
      Self::Ask => "Start peer verification: ask <secret>",
      Self::Start => "Request an encrypted session",
      Self::End => "End the encrypted session",
      Self::Trust => "Trust the peer's current fingerprint",
      Self::Untrust => "Stop trusting the peer's current fingerprint",
      Self::Poll => "Run the engine's periodic maintenance",
      Self::Help => "Show this help",
    }
  }

  /// Verbs match exactly; they are case-sensitive.
  pub fn parse(name: &str) -> Option<Self> {
    Self::ALL.iter().copied().find(|verb| verb.name() == name)
  }
}

/// Split a command line into its verb and the rest. Leading whitespace before the verb and leading
/// spaces before the rest are dropped; everything else in the rest is kept verbatim.
pub fn split_command(line: &str) -> (&str, &str) {
  let line = line.trim_start();
  let end = line.find(char::is_whitespace).unwrap_or(line.len());
  let (verb, rest) = line.split_at(end);
  (verb, rest.trim_start_matches(' '))
}

pub const UNKNOWN_COMMAND: &str = "OTR: Unknown command";
pub const NO_CONVERSATION: &str = "OTR: Not in a private conversation";
pub const NO_SESSION: &str = "OTR: No OTR session in this window";

impl<E: Engine> Extension<E> {
  pub fn process_command<H: Host + ?Sized>(&mut self, host: &mut H, line: &str) {
    let (name, rest) = split_command(line);
    let verb = match Verb::parse(name) {
      Some(verb) => verb,
      None => {
        host.print(PrintLevel::Error, UNKNOWN_COMMAND);
        return;
      }
    };
    debug!(verb = verb.name(), "command");
    match verb {
      Verb::Status => self.status(host),
      Verb::Secret => self.secret(host, rest),
      Verb::Ask => self.ask(host, rest),
      Verb::Start => self.start_session(host),
      Verb::End => self.end_session(host),
      Verb::Trust => self.trust_peer(host, true),
      Verb::Untrust => self.trust_peer(host, false),
      Verb::Poll => self.poll(host),
      Verb::Help => {
        for verb in Verb::ALL.iter() {
          host.print(
            PrintLevel::Normal,
            &format!("OTR: {} - {}", verb.name(), verb.doc()),
          );
        }
      }
    }
  }

  fn focused_conversation<H: Host + ?Sized>(&self, host: &mut H) -> Option<Conversation> {
    let focus = host.current_focus();
    let own_nick = focus.network.as_deref().and_then(|n| host.my_nick(n));
    let conversation = resolver::conversation(&focus, own_nick.as_deref());
    if conversation.is_none() {
      host.print(PrintLevel::Normal, NO_CONVERSATION);
    }
    conversation
  }

  fn focused_session<H: Host + ?Sized>(&self, host: &mut H) -> Option<Resolved> {
    let focus = host.current_focus();
    let own_nick = focus.network.as_deref().and_then(|n| host.my_nick(n));
    let resolved = resolver::resolve(&self.engine, &focus, own_nick.as_deref());
    if resolved.is_none() {
      host.print(PrintLevel::Normal, NO_SESSION);
    }
    resolved
  }

  fn status<H: Host + ?Sized>(&mut self, host: &mut H) {
    let Resolved {
      conversation,
      context,
    } = match self.focused_session(host) {
      Some(resolved) => resolved,
      None => return,
    };
    let local = self
      .engine
      .local_fingerprint(&context.key.account, &context.key.protocol);
    for line in status_lines(local.as_ref(), &context) {
      notify::status(host, &conversation.network, &conversation.target, &line);
    }
  }

  fn ask<H: Host + ?Sized>(&mut self, host: &mut H, secret: &str) {
    let Resolved {
      conversation,
      context,
    } = match self.focused_session(host) {
      Some(resolved) => resolved,
      None => return,
    };
    let result = self.with_engine(host, |engine, ops| {
      engine.initiate_verification(ops, &context.key, secret.as_bytes())
    });
    if let Err(e) = result {
      warn!(peer = %context.key, error = %e, "could not start verification");
      let line = format!("Peer verification [{}] [{}]", red("error"), e);
      notify::status(host, &conversation.network, &conversation.target, &line);
    }
  }

  fn secret<H: Host + ?Sized>(&mut self, host: &mut H, secret: &str) {
    let Resolved {
      conversation,
      context,
    } = match self.focused_session(host) {
      Some(resolved) => resolved,
      None => return,
    };
    if !context.awaiting_secret {
      notify::status(
        host,
        &conversation.network,
        &conversation.target,
        "No verification in progress",
      );
      return;
    }
    let result = self.with_engine(host, |engine, ops| {
      engine.respond_verification(ops, &context.key, secret.as_bytes())
    });
    if let Err(e) = result {
      warn!(peer = %context.key, error = %e, "could not answer verification");
      let line = format!("Peer verification [{}] [{}]", red("error"), e);
      notify::status(host, &conversation.network, &conversation.target, &line);
    }
  }

  /// Offer an encrypted session by sending a query through the normal outgoing path.
  fn start_session<H: Host + ?Sized>(&mut self, host: &mut H) {
    let conversation = match self.focused_conversation(host) {
      Some(conversation) => conversation,
      None => return,
    };
    if host.is_channel(&conversation.network, &conversation.target) {
      host.print(PrintLevel::Normal, NO_CONVERSATION);
      return;
    }
    let chat = Chat::new(
      conversation.network.as_str(),
      conversation.target.as_str(),
      QUERY_TAG,
    );
    if self.process_chat(host, &chat) == ProcessResult::Pass {
      host.send_message(&IrcMessage::privmsg(
        conversation.network.as_str(),
        &conversation.target,
        QUERY_TAG,
      ));
    }
    info!(peer = %conversation.key, "session requested");
  }

  fn end_session<H: Host + ?Sized>(&mut self, host: &mut H) {
    let conversation = match self.focused_conversation(host) {
      Some(conversation) => conversation,
      None => return,
    };
    self.with_engine(host, |engine, ops| {
      engine.disconnect_all_instances(ops, &conversation.key)
    });
    info!(peer = %conversation.key, "session ended");
    notify::status(
      host,
      &conversation.network,
      &conversation.target,
      &red("Session terminated"),
    );
  }

  fn trust_peer<H: Host + ?Sized>(&mut self, host: &mut H, trusted: bool) {
    let Resolved {
      conversation,
      context,
    } = match self.focused_session(host) {
      Some(resolved) => resolved,
      None => return,
    };
    let line = match self.trust.set_trust(&mut self.engine, &context, trusted) {
      Ok(Some(fingerprint)) => format!(
        "Fingerprint {} [{}]",
        if trusted { "trusted" } else { "untrusted" },
        bold(&fingerprint.to_human())
      ),
      Ok(None) => "No fingerprint for this peer yet".to_string(),
      Err(e) => {
        warn!(peer = %context.key, error = %e, "could not change trust");
        format!("Fingerprint trust not changed [{}]", red(&e.to_string()))
      }
    };
    notify::status(host, &conversation.network, &conversation.target, &line);
  }
}

/// The lines `status` prints. The fingerprint lines are left out when there is no fingerprint to
/// show.
fn status_lines(local: Option<&Fingerprint>, context: &SessionContext) -> Vec<String> {
  let mut lines = Vec::new();
  if let Some(local) = local {
    lines.push(format!("Local  fingerprint [{}]", bold(&local.to_human())));
  }
  if let Some(remote) = &context.active_fingerprint {
    let trust = if remote.is_trusted() {
      green(&remote.trust)
    } else {
      red("untrusted")
    };
    lines.push(format!(
      "Remote fingerprint [{}] [{}]",
      bold(&remote.fingerprint.to_human()),
      trust
    ));
  }
  let state = match context.state {
    MessageState::Plaintext => red("plaintext"),
    MessageState::Encrypted => green("encrypted"),
    MessageState::Finished => red("finished"),
  };
  lines.push(format!(
    "Local instance [{}] Remote instance [{}] Protocol [{}]",
    bold(&context.our_instance.to_string()),
    bold(&context.their_instance.to_string()),
    bold(&context.protocol_version.to_string())
  ));
  lines.push(format!("Connection state [{}]", state));
  lines
}
