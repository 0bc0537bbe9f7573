// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building geometric primitives
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Plane normal has zero length")]
    DegenerateNormal,

    #[error("Coordinate is not finite: {0}")]
    NonFiniteCoordinate(f64),
}
