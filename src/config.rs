/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Where durable state lives and how trust is labelled.

use crate::error::Error;

use tracing::debug;

use std::{
  env, fs,
  path::{Path, PathBuf},
};

/// Overrides the default state directory.
pub const CONFIG_DIR_ENV: &str = "IRCOTR_CONFIG_DIR";

/// The subdirectory of the user's config dir shared with the chat client.
pub const CLIENT_CONFIG_SUBDIR: &str = "glirc";

/// Label recorded on fingerprints the user trusts by hand.
pub const DEFAULT_TRUST_LABEL: &str = "manual";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Directory holding the key, fingerprint and instance tag files. [None] keeps everything in
  /// memory.
  pub state_dir: Option<PathBuf>,
  pub trust_label: String,
}

impl Config {
  /// Use `$IRCOTR_CONFIG_DIR`, falling back to the client's directory under the user's config dir.
  pub fn from_env() -> Self {
    Self {
      state_dir: default_state_dir(),
      trust_label: DEFAULT_TRUST_LABEL.to_string(),
    }
  }

  pub fn with_state_dir(state_dir: impl Into<PathBuf>) -> Self {
    Self {
      state_dir: Some(state_dir.into()),
      trust_label: DEFAULT_TRUST_LABEL.to_string(),
    }
  }

  /// Nothing is read from or written to disk.
  pub fn ephemeral() -> Self {
    Self {
      state_dir: None,
      trust_label: DEFAULT_TRUST_LABEL.to_string(),
    }
  }

  pub fn trust_label(mut self, label: impl Into<String>) -> Self {
    self.trust_label = label.into();
    self
  }

  /// Create the state directory if it is configured and missing.
  pub fn ensure_state_dir(&self) -> Result<Option<&Path>, Error> {
    match &self.state_dir {
      None => Ok(None),
      Some(dir) => {
        fs::create_dir_all(dir).map_err(|e| Error::StateDir(dir.clone(), e))?;
        Ok(Some(dir.as_path()))
      }
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::from_env()
  }
}

fn default_state_dir() -> Option<PathBuf> {
  match env::var_os(CONFIG_DIR_ENV) {
    Some(dir) if !dir.is_empty() => Some(dir.into()),
    _ => {
      let dir = dirs::config_dir().map(|d| d.join(CLIENT_CONFIG_SUBDIR));
      if dir.is_none() {
        debug!("no config directory available, state will not be persisted");
      }
      dir
    }
  }
}
