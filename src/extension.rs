/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! The extension's state and lifecycle. Message interception lives in
//! [intercept](crate::intercept) and user commands in [commands](crate::commands).

use crate::{
  config::Config,
  host::Host,
  intercept::ProcessResult,
  notify::Ops,
  trust::{ExtractionBehavior, TrustStore},
};

use ircotr_low_level::{AppOps, BatchTracker, Chat, Engine, IrcMessage};

use parking_lot::{Mutex, MutexGuard};
use tracing::{info, warn};

use std::sync::Arc;

/// Everything the integration keeps between calls from the client. The engine is owned here and
/// only ever driven from one entrypoint at a time.
#[derive(Debug)]
pub struct Extension<E: Engine> {
  pub(crate) engine: E,
  pub(crate) batches: BatchTracker,
  pub(crate) trust: TrustStore,
}

impl<E: Engine> Extension<E> {
  /// Load durable state into `engine` and start tracking batches on every network the client is
  /// already connected to. Unreadable state is logged and otherwise ignored.
  pub fn start<H: Host + ?Sized>(host: &H, mut engine: E, config: Config) -> Self {
    if let Err(e) = config.ensure_state_dir() {
      warn!(error = %e, "state will not be persisted");
    }
    let trust = TrustStore::new(&config);
    if let Err(e) = trust.load(&mut engine, ExtractionBehavior::ReadOrDefault) {
      warn!(error = %e, "could not load state");
    }

    let mut batches = BatchTracker::new();
    for network in host.list_networks() {
      batches.register(&network);
    }
    info!(
      state_dir = ?config.state_dir,
      networks = batches.networks().count(),
      "OTR extension started"
    );

    Self {
      engine,
      batches,
      trust,
    }
  }

  /// Release the engine and all session state.
  pub fn stop(self) {
    info!("OTR extension stopped");
  }

  pub fn engine(&self) -> &E {
    &self.engine
  }

  pub fn batches(&self) -> &BatchTracker {
    &self.batches
  }

  pub fn trust(&self) -> &TrustStore {
    &self.trust
  }

  /// Let the engine run its periodic housekeeping.
  pub fn poll<H: Host + ?Sized>(&mut self, host: &mut H) {
    self.with_engine(host, |engine, ops| engine.poll(ops));
  }

  /// Run one engine call with the client's callbacks attached. If the engine reported a change to
  /// its fingerprint table, the table is written exactly once after the call returns.
  pub(crate) fn with_engine<H, R, F>(&mut self, host: &mut H, f: F) -> R
  where
    H: Host + ?Sized,
    F: FnOnce(&mut E, &mut dyn AppOps) -> R,
  {
    let Self { engine, trust, .. } = self;
    let mut ops = Ops::new(host, trust);
    let result = f(engine, &mut ops);
    if ops.finish() {
      if let Err(e) = trust.write_fingerprints(&*engine) {
        warn!(error = %e, "could not write fingerprints");
      }
    }
    result
  }
}

/// An [Extension] that can be shared across threads, for clients that call in from more than one.
#[derive(Debug)]
pub struct SharedExtension<E: Engine>(Arc<Mutex<Extension<E>>>);

impl<E: Engine> Clone for SharedExtension<E> {
  fn clone(&self) -> Self {
    Self(Arc::clone(&self.0))
  }
}

impl<E: Engine> From<Extension<E>> for SharedExtension<E> {
  fn from(value: Extension<E>) -> Self {
    Self(Arc::new(Mutex::new(value)))
  }
}

impl<E: Engine> SharedExtension<E> {
  pub fn start<H: Host + ?Sized>(host: &H, engine: E, config: Config) -> Self {
    Extension::start(host, engine, config).into()
  }

  pub fn lock(&self) -> MutexGuard<'_, Extension<E>> {
    self.0.lock()
  }

  pub fn process_message<H: Host + ?Sized>(
    &self,
    host: &mut H,
    message: &IrcMessage,
  ) -> ProcessResult {
    self.lock().process_message(host, message)
  }

  pub fn process_chat<H: Host + ?Sized>(&self, host: &mut H, chat: &Chat) -> ProcessResult {
    self.lock().process_chat(host, chat)
  }

  pub fn process_command<H: Host + ?Sized>(&self, host: &mut H, line: &str) {
    self.lock().process_command(host, line)
  }

  pub fn poll<H: Host + ?Sized>(&self, host: &mut H) {
    self.lock().poll(host)
  }
}
