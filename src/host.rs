/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! What the integration needs from the chat client hosting it.

use ircotr_low_level::IrcMessage;

/// The window the user is looking at. Either part may be missing, e.g. in the client's status
/// window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Focus {
  pub network: Option<String>,
  pub target: Option<String>,
}

impl Focus {
  pub fn new(network: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      network: Some(network.into()),
      target: Some(target.into()),
    }
  }

  pub fn network_only(network: impl Into<String>) -> Self {
    Self {
      network: Some(network.into()),
      target: None,
    }
  }

  /// Both parts, if present and non-empty.
  pub fn conversation(&self) -> Option<(&str, &str)> {
    let network = self.network.as_deref().filter(|n| !n.is_empty())?;
    let target = self.target.as_deref().filter(|t| !t.is_empty())?;
    Some((network, target))
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrintLevel {
  Normal,
  Error,
}

pub trait Host {
  fn current_focus(&self) -> Focus;
  /// Our nickname on `network`, or [None] when not connected there.
  fn my_nick(&self, network: &str) -> Option<String>;
  /// Whether `target` names a multi-party channel rather than a user.
  fn is_channel(&self, network: &str, target: &str) -> bool;
  /// Whether we currently see `nick` on `network` (e.g. through a shared channel).
  fn is_logged_on(&self, network: &str, nick: &str) -> bool;
  /// Networks that are already connected.
  fn list_networks(&self) -> Vec<String>;
  fn send_message(&mut self, message: &IrcMessage);
  /// Show a chat line in the window for `target` on `network`, as if `source` had said it.
  fn inject_chat(&mut self, network: &str, source: &str, target: &str, message: &str);
  /// Print a line to the client's generic message area.
  fn print(&mut self, level: PrintLevel, message: &str);
}
