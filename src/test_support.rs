/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Scripted stand-ins for the engine and the chat client.

use crate::host::{Focus, Host, PrintLevel};

use ircotr_low_level::{
  AppOps, Engine, EngineError, EngineEvent, Fingerprint, IrcMessage, MessageState,
  PeerFingerprint, Received, SessionContext, SessionKey,
};

use std::{
  cell::RefCell,
  collections::{HashMap, HashSet},
  fs,
  path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  ReadKeys(PathBuf),
  ReadFingerprints(PathBuf),
  ReadInstanceTags(PathBuf),
  Receive(SessionKey, String),
  Send(SessionKey, String),
  Initiate(SessionKey, Vec<u8>),
  Respond(SessionKey, Vec<u8>),
  Disconnect(SessionKey),
  SetTrust(SessionKey, Fingerprint, String),
  Poll,
}

/// How [StubEngine::send] answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendVerdict {
  Unchanged,
  Replace(String),
  Fail,
}

/// An engine that encrypts nothing. It keeps a fingerprint table in a simple tab-separated file
/// so persistence can be observed, and records every call it receives.
#[derive(Debug)]
pub struct StubEngine {
  contexts: HashMap<SessionKey, SessionContext>,
  pub calls: Vec<Call>,
  pub receive_verdict: Received,
  pub send_verdict: SendVerdict,
  /// Events reported through [AppOps::notify] during the next engine call that takes `ops`.
  pub pending_events: Vec<EngineEvent>,
  /// Protocol messages sent through [AppOps::inject_message] during the next such call.
  pub pending_injections: Vec<String>,
  pub local: Option<Fingerprint>,
  pub fingerprint_writes: RefCell<Vec<PathBuf>>,
}

impl StubEngine {
  pub fn new() -> Self {
    Self {
      contexts: HashMap::new(),
      calls: Vec::new(),
      receive_verdict: Received::untouched(),
      send_verdict: SendVerdict::Unchanged,
      pending_events: Vec::new(),
      pending_injections: Vec::new(),
      local: None,
      fingerprint_writes: RefCell::new(Vec::new()),
    }
  }

  /// Create an encrypted session, optionally with an (untrusted) fingerprint.
  pub fn establish(&mut self, key: SessionKey, fingerprint: Option<Fingerprint>) {
    let mut context = SessionContext::new(key.clone());
    context.state = MessageState::Encrypted;
    context.our_instance = 0x100_u32.into();
    context.their_instance = 0x2ab_u32.into();
    context.protocol_version = 3;
    context.active_fingerprint = fingerprint.map(|fp| PeerFingerprint::new(fp, ""));
    self.contexts.insert(key, context);
  }

  pub fn context_mut(&mut self, key: &SessionKey) -> Option<&mut SessionContext> {
    self.contexts.get_mut(key)
  }

  pub fn sessions(&self) -> Vec<&SessionKey> {
    self.contexts.keys().collect()
  }

  pub fn receive_calls(&self) -> usize {
    self
      .calls
      .iter()
      .filter(|c| matches!(c, Call::Receive(_, _)))
      .count()
  }

  fn flush(&mut self, ops: &mut dyn AppOps, key: &SessionKey) {
    for message in self.pending_injections.drain(..) {
      ops.inject_message(key, &message);
    }
    for event in self.pending_events.drain(..) {
      ops.notify(key, event);
    }
  }

  fn read_file(path: &Path) -> Result<String, EngineError> {
    Ok(fs::read_to_string(path)?)
  }
}

pub fn fingerprint(seed: u8) -> Fingerprint {
  [seed; 20].into()
}

impl Engine for StubEngine {
  fn read_private_keys(&mut self, path: &Path) -> Result<(), EngineError> {
    self.calls.push(Call::ReadKeys(path.to_path_buf()));
    Self::read_file(path).map(|_| ())
  }

  fn read_fingerprints(&mut self, path: &Path) -> Result<(), EngineError> {
    self.calls.push(Call::ReadFingerprints(path.to_path_buf()));
    let contents = Self::read_file(path)?;
    for line in contents.lines() {
      let fields: Vec<&str> = line.split('\t').collect();
      match fields.as_slice() {
        [account, protocol, username, fp, trust] => {
          let fp = Fingerprint::from_human(fp).ok_or_else(|| {
            EngineError::CorruptState(path.display().to_string(), line.to_string())
          })?;
          let key = SessionKey::new(protocol, account, username);
          self.establish(key.clone(), Some(fp));
          if let Some(context) = self.contexts.get_mut(&key) {
            context.state = MessageState::Plaintext;
            context.active_fingerprint = Some(PeerFingerprint::new(fp, *trust));
          }
        }
        _ => {
          return Err(EngineError::CorruptState(
            path.display().to_string(),
            line.to_string(),
          ))
        }
      }
    }
    Ok(())
  }

  fn read_instance_tags(&mut self, path: &Path) -> Result<(), EngineError> {
    self.calls.push(Call::ReadInstanceTags(path.to_path_buf()));
    Self::read_file(path).map(|_| ())
  }

  fn write_fingerprints(&self, path: &Path) -> Result<(), EngineError> {
    self.fingerprint_writes.borrow_mut().push(path.to_path_buf());
    let mut lines: Vec<String> = self
      .contexts
      .values()
      .filter_map(|c| {
        c.active_fingerprint.as_ref().map(|fp| {
          format!(
            "{}\t{}\t{}\t{}\t{}\n",
            c.key.account,
            c.key.protocol,
            c.key.username,
            fp.fingerprint.to_human(),
            fp.trust
          )
        })
      })
      .collect();
    lines.sort();
    fs::write(path, lines.concat())?;
    Ok(())
  }

  fn receive(&mut self, ops: &mut dyn AppOps, key: &SessionKey, message: &str) -> Received {
    self.calls.push(Call::Receive(key.clone(), message.to_string()));
    self.flush(ops, key);
    self.receive_verdict.clone()
  }

  fn send(
    &mut self,
    ops: &mut dyn AppOps,
    key: &SessionKey,
    plaintext: &str,
  ) -> Result<Option<String>, EngineError> {
    self.calls.push(Call::Send(key.clone(), plaintext.to_string()));
    self.flush(ops, key);
    match &self.send_verdict {
      SendVerdict::Unchanged => Ok(None),
      SendVerdict::Replace(payload) => Ok(Some(payload.clone())),
      SendVerdict::Fail => Err(EngineError::Encryption("stub refuses".to_string())),
    }
  }

  fn initiate_verification(
    &mut self,
    ops: &mut dyn AppOps,
    key: &SessionKey,
    secret: &[u8],
  ) -> Result<(), EngineError> {
    self.calls.push(Call::Initiate(key.clone(), secret.to_vec()));
    self.flush(ops, key);
    Ok(())
  }

  fn respond_verification(
    &mut self,
    ops: &mut dyn AppOps,
    key: &SessionKey,
    secret: &[u8],
  ) -> Result<(), EngineError> {
    self.calls.push(Call::Respond(key.clone(), secret.to_vec()));
    let context = self
      .contexts
      .get_mut(key)
      .ok_or_else(|| EngineError::NoSession(key.to_string()))?;
    if !context.awaiting_secret {
      panic!("respond_verification called without a verification in progress");
    }
    context.awaiting_secret = false;
    self.flush(ops, key);
    Ok(())
  }

  fn disconnect_all_instances(&mut self, ops: &mut dyn AppOps, key: &SessionKey) {
    self.calls.push(Call::Disconnect(key.clone()));
    if let Some(context) = self.contexts.get_mut(key) {
      context.state = MessageState::Finished;
    }
    self.flush(ops, key);
  }

  fn set_trust(
    &mut self,
    key: &SessionKey,
    fingerprint: &Fingerprint,
    label: &str,
  ) -> Result<(), EngineError> {
    self
      .calls
      .push(Call::SetTrust(key.clone(), *fingerprint, label.to_string()));
    let context = self
      .contexts
      .get_mut(key)
      .ok_or_else(|| EngineError::NoSession(key.to_string()))?;
    match context.active_fingerprint.as_mut() {
      Some(fp) if &fp.fingerprint == fingerprint => {
        fp.trust = label.to_string();
        Ok(())
      }
      _ => Err(EngineError::Other("unknown fingerprint".to_string())),
    }
  }

  fn find_context(&self, key: &SessionKey) -> Option<SessionContext> {
    self.contexts.get(key).cloned()
  }

  fn local_fingerprint(&self, _account: &str, _protocol: &str) -> Option<Fingerprint> {
    self.local
  }

  fn poll(&mut self, ops: &mut dyn AppOps) {
    self.calls.push(Call::Poll);
    let key = SessionKey::new("", "", "");
    self.flush(ops, &key);
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injected {
  pub network: String,
  pub source: String,
  pub target: String,
  pub message: String,
}

/// A chat client that records everything it is asked to do. Targets starting with `#` or `&` are
/// channels.
#[derive(Debug, Default)]
pub struct StubHost {
  pub focus: Focus,
  pub nicks: HashMap<String, String>,
  pub networks: Vec<String>,
  pub online: HashSet<String>,
  pub sent: Vec<IrcMessage>,
  pub injected: Vec<Injected>,
  pub printed: Vec<(PrintLevel, String)>,
}

impl StubHost {
  /// Connected to `net` as `me`, looking at a query window with `bob`.
  pub fn new() -> Self {
    let mut host = Self::default();
    host.nicks.insert("net".to_string(), "me".to_string());
    host.networks.push("net".to_string());
    host.focus = Focus::new("net", "bob");
    host
  }

  pub fn injected_text(&self) -> Vec<String> {
    self
      .injected
      .iter()
      .map(|i| ircotr_low_level::format::strip(&i.message))
      .collect()
  }

  pub fn sent_text(&self) -> Vec<String> {
    self
      .sent
      .iter()
      .filter_map(|m| m.params.get(1).cloned())
      .collect()
  }
}

impl Host for StubHost {
  fn current_focus(&self) -> Focus {
    self.focus.clone()
  }

  fn my_nick(&self, network: &str) -> Option<String> {
    self.nicks.get(network).cloned()
  }

  fn is_channel(&self, _network: &str, target: &str) -> bool {
    target.starts_with('#') || target.starts_with('&')
  }

  fn is_logged_on(&self, _network: &str, nick: &str) -> bool {
    self.online.contains(nick)
  }

  fn list_networks(&self) -> Vec<String> {
    self.networks.clone()
  }

  fn send_message(&mut self, message: &IrcMessage) {
    self.sent.push(message.clone());
  }

  fn inject_chat(&mut self, network: &str, source: &str, target: &str, message: &str) {
    self.injected.push(Injected {
      network: network.to_string(),
      source: source.to_string(),
      target: target.to_string(),
      message: message.to_string(),
    });
  }

  fn print(&mut self, level: PrintLevel, message: &str) {
    self.printed.push((level, message.to_string()));
  }
}
