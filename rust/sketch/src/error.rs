// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for sketch planning and conversion.

use crate::model::PointId;

/// Result type alias for sketch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning sketches or converting campaigns.
///
/// Duplicate conversions and empty inputs are not errors; they are reported
/// through [`crate::convert::ConversionOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Arguments that cannot be processed at all.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A point needs a report location ID for indexing but has none.
    #[error("gauging point {point} has no report location ID")]
    MissingLocationId { point: PointId },

    /// The section type name is not part of the category table.
    #[error("unknown section type: {0}")]
    UnknownSectionType(String),

    /// Geometric primitive could not be built.
    #[error("geometry error: {0}")]
    Geometry(#[from] hull_sketch_geometry::Error),

    /// An external collaborator failed.
    #[error("host model error: {0}")]
    Host(String),

    /// Configuration payload could not be read.
    #[error("configuration error: {0}")]
    Config(String),

    /// Another error, annotated with the operation that was attempted.
    #[error("{operation}")]
    Context {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps this error with a description of the operation that failed.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Error::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping every [`Error::Context`] layer.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Adds [`Error::context`] to results.
pub trait ResultExt<T> {
    fn context(self, operation: impl FnOnce() -> String) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, operation: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| e.context(operation()))
    }
}
