/* Copyright 2021 Danny McClanahan */
/* SPDX-License-Identifier: AGPL-3.0-only */

use ircotr_low_level::error::EngineError;

use displaydoc::Display;
use thiserror::Error;

use std::path::PathBuf;

#[derive(Debug, Display, Error)]
pub enum Error {
  /// engine error: {0}
  Engine(#[from] EngineError),
  /// could not create the state directory {0:?}: {1}
  StateDir(PathBuf, std::io::Error),
}
