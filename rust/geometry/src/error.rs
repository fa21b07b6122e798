// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building geometry
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid point input: {0}")]
    InvalidInput(String),

    #[error("Ribbon buffers are not initialized: call set_points before advance")]
    Uninitialized,

    #[error("Text layout requires a font")]
    MissingFont,

    /// Reported, never returned from a rebuild: the geometry is kept so the
    /// caller can decide to skip drawing it.
    #[error("Degenerate geometry: bounding sphere radius is {radius}")]
    DegenerateGeometry { radius: f32 },

    #[error("Core input error: {0}")]
    CoreError(meshline_core::Error),
}

impl From<meshline_core::Error> for Error {
    fn from(err: meshline_core::Error) -> Self {
        match err {
            meshline_core::Error::InvalidInput(msg) => Error::InvalidInput(msg),
            other => Error::CoreError(other),
        }
    }
}
