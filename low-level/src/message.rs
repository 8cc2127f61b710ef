/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! The transport-level messages exchanged with the IRC client: parsed server lines and
//! user-initiated chat sends.

use std::fmt;

/// Source of a server message, `nick!user@host`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prefix {
  pub nick: String,
  pub user: Option<String>,
  pub host: Option<String>,
}

impl Prefix {
  pub fn nick(nick: impl Into<String>) -> Self {
    Self {
      nick: nick.into(),
      user: None,
      host: None,
    }
  }

  pub fn parse(s: &str) -> Self {
    let (rest, host) = match s.split_once('@') {
      Some((rest, host)) => (rest, Some(host.to_string())),
      None => (s, None),
    };
    let (nick, user) = match rest.split_once('!') {
      Some((nick, user)) => (nick, Some(user.to_string())),
      None => (rest, None),
    };
    Self {
      nick: nick.to_string(),
      user,
      host,
    }
  }
}

/// Renders the full `nick!user@host` user info, leaving out empty parts.
impl fmt::Display for Prefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.nick)?;
    if let Some(user) = self.user.as_deref().filter(|u| !u.is_empty()) {
      write!(f, "!{}", user)?;
    }
    if let Some(host) = self.host.as_deref().filter(|h| !h.is_empty()) {
      write!(f, "@{}", host)?;
    }
    Ok(())
  }
}

/// One IRC protocol message, tagged with the network it was received on or is destined for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
  pub network: String,
  pub prefix: Option<Prefix>,
  pub command: String,
  pub params: Vec<String>,
}

impl IrcMessage {
  pub fn new(network: impl Into<String>, command: impl Into<String>, params: Vec<String>) -> Self {
    Self {
      network: network.into(),
      prefix: None,
      command: command.into(),
      params,
    }
  }

  pub fn with_prefix(mut self, prefix: Prefix) -> Self {
    self.prefix = Some(prefix);
    self
  }

  pub fn privmsg(network: impl Into<String>, target: &str, text: &str) -> Self {
    Self::new(
      network,
      "PRIVMSG",
      vec![target.to_string(), text.to_string()],
    )
  }

  /// Parse a raw line as received from the server. Message tags are discarded. Returns [None]
  /// for lines without a command.
  pub fn parse(network: &str, line: &str) -> Option<Self> {
    let mut rest = line.trim_end_matches(|c| c == '\r' || c == '\n');

    if rest.starts_with('@') {
      rest = rest.split_once(' ').map_or("", |(_, r)| r);
    }
    rest = rest.trim_start_matches(' ');

    let mut prefix = None;
    if let Some(stripped) = rest.strip_prefix(':') {
      let (p, r) = stripped.split_once(' ').unwrap_or((stripped, ""));
      prefix = Some(Prefix::parse(p));
      rest = r.trim_start_matches(' ');
    }

    let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
    if command.is_empty() {
      return None;
    }

    let mut params = Vec::new();
    loop {
      rest = rest.trim_start_matches(' ');
      if rest.is_empty() {
        break;
      }
      if let Some(trailing) = rest.strip_prefix(':') {
        params.push(trailing.to_string());
        break;
      }
      let (param, r) = rest.split_once(' ').unwrap_or((rest, ""));
      params.push(param.to_string());
      rest = r;
    }

    Some(Self {
      network: network.to_string(),
      prefix,
      command: command.to_ascii_uppercase(),
      params,
    })
  }

  /// Serialize back into wire format, without the trailing CRLF.
  pub fn to_line(&self) -> String {
    let mut line = String::new();
    if let Some(prefix) = &self.prefix {
      line.push(':');
      line.push_str(&prefix.to_string());
      line.push(' ');
    }
    line.push_str(&self.command);
    if let Some((last, init)) = self.params.split_last() {
      for param in init {
        line.push(' ');
        line.push_str(param);
      }
      line.push(' ');
      if last.is_empty() || last.contains(' ') || last.starts_with(':') {
        line.push(':');
      }
      line.push_str(last);
    }
    line
  }

  pub fn sender_nick(&self) -> Option<&str> {
    self.prefix.as_ref().map(|p| p.nick.as_str())
  }
}

/// A chat line the user typed into a window, before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
  pub network: String,
  pub target: String,
  pub message: String,
}

impl Chat {
  pub fn new(
    network: impl Into<String>,
    target: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    Self {
      network: network.into(),
      target: target.into(),
      message: message.into(),
    }
  }
}
