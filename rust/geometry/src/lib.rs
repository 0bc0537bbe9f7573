// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hull-Sketch Geometry
//!
//! The small set of geometric predicates the sketch partitioner needs:
//! half-space signals against planes, plane mirroring, axis-aligned bounding
//! boxes and an ordered index used to locate the extreme points of a cloud
//! along one axis. Math types come from nalgebra.

pub mod axis_index;
pub mod bounds;
pub mod error;
pub mod plane;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use axis_index::AxisIndex;
pub use bounds::{Axis, BoundingBox};
pub use error::{Error, Result};
pub use plane::{Plane, Signal};
