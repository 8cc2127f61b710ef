/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Durable engine state: private keys, peer fingerprints with their trust labels, and instance
//! tags.
//!
//! The engine owns the file formats. This module only decides where the files live, loads them at
//! startup, and writes the fingerprint table back whenever trust changes.

use crate::{config::Config, error::Error};

use ircotr_low_level::{Engine, EngineError, Fingerprint, SessionContext, StateFile};

use tracing::{debug, info, warn};

use std::path::{Path, PathBuf};

/// What to do when a state file cannot be read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExtractionBehavior {
  /// Any failure is returned to the caller.
  ReadOrError,
  /// A missing file means no state yet. Other failures are logged and the file is skipped.
  ReadOrDefault,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Loaded {
  Read,
  Absent,
  Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStore {
  state_dir: Option<PathBuf>,
  label: String,
}

impl TrustStore {
  pub fn new(config: &Config) -> Self {
    Self {
      state_dir: config.state_dir.clone(),
      label: config.trust_label.clone(),
    }
  }

  /// The label written on fingerprints the user trusts.
  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn path(&self, file: StateFile) -> Option<PathBuf> {
    self.state_dir.as_ref().map(|dir| dir.join(file.file_name()))
  }

  /// Read every state file into the engine. With no state directory there is nothing to do.
  pub fn load<E: Engine + ?Sized>(
    &self,
    engine: &mut E,
    behavior: ExtractionBehavior,
  ) -> Result<Vec<(StateFile, Loaded)>, Error> {
    let mut outcomes = Vec::new();
    for file in StateFile::ALL.iter().copied() {
      let path = match self.path(file) {
        Some(path) => path,
        None => return Ok(outcomes),
      };
      let result = match file {
        StateFile::PrivateKeys => engine.read_private_keys(&path),
        StateFile::Fingerprints => engine.read_fingerprints(&path),
        StateFile::InstanceTags => engine.read_instance_tags(&path),
      };
      outcomes.push((file, Self::classify(&path, result, behavior)?));
    }
    Ok(outcomes)
  }

  fn classify(
    path: &Path,
    result: Result<(), EngineError>,
    behavior: ExtractionBehavior,
  ) -> Result<Loaded, Error> {
    match result {
      Ok(()) => {
        info!(path = %path.display(), "loaded");
        Ok(Loaded::Read)
      }
      Err(e) if behavior == ExtractionBehavior::ReadOrError => Err(e.into()),
      Err(e) if e.is_not_found() => {
        debug!(path = %path.display(), "no state file yet");
        Ok(Loaded::Absent)
      }
      Err(e) => {
        warn!(path = %path.display(), error = %e, "could not load state file, skipping");
        Ok(Loaded::Failed)
      }
    }
  }

  /// Write the engine's fingerprint table. Returns whether anything was written.
  pub fn write_fingerprints<E: Engine + ?Sized>(&self, engine: &E) -> Result<bool, Error> {
    match self.path(StateFile::Fingerprints) {
      None => Ok(false),
      Some(path) => {
        engine.write_fingerprints(&path)?;
        debug!(path = %path.display(), "fingerprints written");
        Ok(true)
      }
    }
  }

  /// Mark the fingerprint of `context`'s current session as trusted or untrusted, then persist the
  /// table once. Returns [None] when no key exchange has produced a fingerprint yet.
  ///
  /// If the table cannot be written, the previous label is put back before the error is returned,
  /// so the engine never holds a trust decision that is not on disk.
  pub fn set_trust<E: Engine + ?Sized>(
    &self,
    engine: &mut E,
    context: &SessionContext,
    trusted: bool,
  ) -> Result<Option<Fingerprint>, Error> {
    let (fingerprint, previous) = match &context.active_fingerprint {
      Some(active) => (active.fingerprint, active.trust.as_str()),
      None => return Ok(None),
    };
    let label = if trusted { self.label.as_str() } else { "" };
    engine.set_trust(&context.key, &fingerprint, label)?;
    if let Err(e) = self.write_fingerprints(&*engine) {
      if let Err(restore) = engine.set_trust(&context.key, &fingerprint, previous) {
        warn!(peer = %context.key, error = %restore, "could not restore previous trust label");
      }
      return Err(e);
    }
    info!(peer = %context.key, trusted, "fingerprint trust changed");
    Ok(Some(fingerprint))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::test_support::{fingerprint, Call, StubEngine};

  use ircotr_low_level::SessionKey;

  use std::fs;
  use tempdir::TempDir;

  fn key() -> SessionKey {
    SessionKey::new("net", "me", "bob")
  }

  #[test]
  fn paths_follow_the_state_dir() {
    let store = TrustStore::new(&Config::with_state_dir("/state"));
    assert_eq!(
      store.path(StateFile::Fingerprints),
      Some(PathBuf::from("/state/otr-fingerprints.txt"))
    );
    assert_eq!(
      store.path(StateFile::PrivateKeys),
      Some(PathBuf::from("/state/otr-keys.txt"))
    );
    assert_eq!(TrustStore::new(&Config::ephemeral()).path(StateFile::InstanceTags), None);
  }

  #[test]
  fn missing_files_are_not_an_error() {
    let tmp_dir = TempDir::new("ircotr-trust").unwrap();
    let store = TrustStore::new(&Config::with_state_dir(tmp_dir.path()));
    let mut engine = StubEngine::new();
    let outcomes = store
      .load(&mut engine, ExtractionBehavior::ReadOrDefault)
      .unwrap();
    assert_eq!(
      outcomes,
      vec![
        (StateFile::PrivateKeys, Loaded::Absent),
        (StateFile::Fingerprints, Loaded::Absent),
        (StateFile::InstanceTags, Loaded::Absent),
      ]
    );
    assert!(store
      .load(&mut engine, ExtractionBehavior::ReadOrError)
      .is_err());
  }

  #[test]
  fn corrupt_file_is_skipped() {
    let tmp_dir = TempDir::new("ircotr-trust").unwrap();
    let store = TrustStore::new(&Config::with_state_dir(tmp_dir.path()));
    fs::write(store.path(StateFile::Fingerprints).unwrap(), "garbage\n").unwrap();
    fs::write(store.path(StateFile::PrivateKeys).unwrap(), "keys\n").unwrap();
    let mut engine = StubEngine::new();
    let outcomes = store
      .load(&mut engine, ExtractionBehavior::ReadOrDefault)
      .unwrap();
    assert_eq!(outcomes[0], (StateFile::PrivateKeys, Loaded::Read));
    assert_eq!(outcomes[1], (StateFile::Fingerprints, Loaded::Failed));
    assert_eq!(outcomes[2], (StateFile::InstanceTags, Loaded::Absent));
  }

  #[test]
  fn ephemeral_store_touches_nothing() {
    let store = TrustStore::new(&Config::ephemeral());
    let mut engine = StubEngine::new();
    assert!(store
      .load(&mut engine, ExtractionBehavior::ReadOrError)
      .unwrap()
      .is_empty());
    assert!(!store.write_fingerprints(&engine).unwrap());
    assert!(engine.calls.is_empty());
  }

  #[test]
  fn trust_is_written_once_and_survives_a_restart() {
    let tmp_dir = TempDir::new("ircotr-trust").unwrap();
    let store = TrustStore::new(&Config::with_state_dir(tmp_dir.path()));
    let mut engine = StubEngine::new();
    engine.establish(key(), Some(fingerprint(7)));
    let context = engine.find_context(&key()).unwrap();

    assert_eq!(
      store.set_trust(&mut engine, &context, true).unwrap(),
      Some(fingerprint(7))
    );
    assert_eq!(engine.fingerprint_writes.borrow().len(), 1);
    assert!(engine
      .calls
      .contains(&Call::SetTrust(key(), fingerprint(7), "manual".to_string())));

    let mut restarted = StubEngine::new();
    store
      .load(&mut restarted, ExtractionBehavior::ReadOrDefault)
      .unwrap();
    assert!(restarted.find_context(&key()).unwrap().is_trusted());

    let context = restarted.find_context(&key()).unwrap();
    store.set_trust(&mut restarted, &context, false).unwrap();
    let mut again = StubEngine::new();
    store
      .load(&mut again, ExtractionBehavior::ReadOrDefault)
      .unwrap();
    assert!(!again.find_context(&key()).unwrap().is_trusted());
  }

  #[test]
  fn failed_write_keeps_the_old_label() {
    let tmp_dir = TempDir::new("ircotr-trust").unwrap();
    let store = TrustStore::new(&Config::with_state_dir(tmp_dir.path()));
    fs::create_dir(store.path(StateFile::Fingerprints).unwrap()).unwrap();
    let mut engine = StubEngine::new();
    engine.establish(key(), Some(fingerprint(5)));
    let context = engine.find_context(&key()).unwrap();

    assert!(store.set_trust(&mut engine, &context, true).is_err());
    assert!(!engine.find_context(&key()).unwrap().is_trusted());
    assert_eq!(
      engine.calls,
      vec![
        Call::SetTrust(key(), fingerprint(5), "manual".to_string()),
        Call::SetTrust(key(), fingerprint(5), String::new()),
      ]
    );
  }

  #[test]
  fn no_fingerprint_no_write() {
    let tmp_dir = TempDir::new("ircotr-trust").unwrap();
    let store = TrustStore::new(&Config::with_state_dir(tmp_dir.path()));
    let mut engine = StubEngine::new();
    engine.establish(key(), None);
    let context = engine.find_context(&key()).unwrap();
    assert_eq!(store.set_trust(&mut engine, &context, true).unwrap(), None);
    assert!(engine.fingerprint_writes.borrow().is_empty());
  }
}
