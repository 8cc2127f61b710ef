/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Track IRCv3 `BATCH` framing per network.
//!
//! Servers wrap replayed history (e.g. `chathistory` or znc playback) in batches. Anything
//! delivered while a network has an open batch is not live conversation, so it must not be fed to
//! the engine a second time.

use tracing::debug;

use std::collections::{HashMap, HashSet};

/// Which way a `BATCH` control token moves the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMarker<'a> {
  /// `+tag`
  Open(&'a str),
  /// `-tag`
  Close(&'a str),
}

impl<'a> BatchMarker<'a> {
  /// Split a `BATCH` reference token into its sigil and tag. Tokens not starting with `+` or `-`
  /// are not markers.
  pub fn parse(token: &'a str) -> Option<Self> {
    if let Some(tag) = token.strip_prefix('+') {
      Some(Self::Open(tag))
    } else {
      token.strip_prefix('-').map(Self::Close)
    }
  }
}

/// Registry of open batch reference tags, keyed by network name.
#[derive(Debug, Clone, Default)]
pub struct BatchTracker {
  open: HashMap<String, HashSet<String>>,
}

impl BatchTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make sure `network` has an (empty) entry without touching one that already exists.
  pub fn register(&mut self, network: &str) {
    self.open.entry(network.to_string()).or_default();
  }

  /// Forget every open batch on `network`. Called when the connection is (re-)established, since
  /// tags from a previous connection will never be closed.
  pub fn reset(&mut self, network: &str) {
    self.open.insert(network.to_string(), HashSet::new());
  }

  pub fn open(&mut self, network: &str, tag: &str) {
    debug!(network, tag, "batch opened");
    self
      .open
      .entry(network.to_string())
      .or_default()
      .insert(tag.to_string());
  }

  pub fn close(&mut self, network: &str, tag: &str) {
    if let Some(tags) = self.open.get_mut(network) {
      if tags.remove(tag) {
        debug!(network, tag, "batch closed");
      }
    }
  }

  /// Whether any batch is currently open on `network`.
  pub fn is_open(&self, network: &str) -> bool {
    self
      .open
      .get(network)
      .map_or(false, |tags| !tags.is_empty())
  }

  /// Apply the reference token of a `BATCH` line. Returns the marker that was applied, if any.
  pub fn apply<'a>(&mut self, network: &str, token: &'a str) -> Option<BatchMarker<'a>> {
    let marker = BatchMarker::parse(token)?;
    match marker {
      BatchMarker::Open(tag) => self.open(network, tag),
      BatchMarker::Close(tag) => self.close(network, tag),
    }
    Some(marker)
  }

  /// Networks that currently have an entry.
  pub fn networks(&self) -> impl Iterator<Item = &str> {
    self.open.keys().map(String::as_str)
  }
}
