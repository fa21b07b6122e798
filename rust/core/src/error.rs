// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for input decoding

use thiserror::Error;

/// Result type for input decoding
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding builder inputs
#[derive(Error, Debug)]
pub enum Error {
    /// Point data is neither a list of `{x, y, z}` records nor a flat
    /// numeric array grouped in threes.
    #[error("Invalid point input: {0}")]
    InvalidInput(String),

    #[error("Font descriptor parse error: {0}")]
    FontParse(#[from] serde_json::Error),

    #[error("Invalid font descriptor: {0}")]
    InvalidFont(String),
}
