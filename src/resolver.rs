/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

//! Map the focused window onto an engine session.
//!
//! Both functions are pure in their inputs: the caller captures the focus and our nickname once,
//! then asks. Missing pieces are the normal state of affairs outside a private conversation, so
//! they yield [None] rather than an error.

use crate::host::Focus;

use ircotr_low_level::{Engine, SessionContext, SessionKey};

/// A private conversation window and the session key it corresponds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
  pub network: String,
  /// The window's target as the client spells it.
  pub target: String,
  pub key: SessionKey,
}

/// A conversation for which the engine already has a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
  pub conversation: Conversation,
  pub context: SessionContext,
}

/// Build the session key for the focused window, without consulting the engine.
pub fn conversation(focus: &Focus, own_nick: Option<&str>) -> Option<Conversation> {
  let (network, target) = focus.conversation()?;
  let own_nick = own_nick.filter(|n| !n.is_empty())?;
  Some(Conversation {
    network: network.to_string(),
    target: target.to_string(),
    key: SessionKey::new(network, own_nick, target),
  })
}

/// Find the engine session for the focused window. Returns [None] both when the window is not a
/// conversation and when no session has been established with the peer yet.
pub fn resolve<E: Engine + ?Sized>(
  engine: &E,
  focus: &Focus,
  own_nick: Option<&str>,
) -> Option<Resolved> {
  let conversation = conversation(focus, own_nick)?;
  let context = engine.find_context(&conversation.key)?;
  Some(Resolved {
    conversation,
    context,
  })
}
