// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planes and half-space tests
//!
//! Every band and every symmetry split in a sketch is described by a plane.
//! Membership is decided with [`Plane::signal`], which only reports
//! [`Signal::OnPlane`] when the signed distance is exactly zero.

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};

/// Which half-space a point lies in relative to a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// On the side the normal points toward
    Positive,
    /// On the opposite side
    Negative,
    /// Exactly on the plane
    OnPlane,
}

impl Signal {
    /// Returns `+1`, `-1` or `0`.
    #[inline]
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Positive => 1,
            Signal::Negative => -1,
            Signal::OnPlane => 0,
        }
    }

    /// Folds [`Signal::OnPlane`] into [`Signal::Negative`].
    ///
    /// Used where a binary side decision is needed and the zero case must not
    /// create a third class.
    #[inline]
    pub fn or_negative(self) -> Signal {
        match self {
            Signal::Positive => Signal::Positive,
            _ => Signal::Negative,
        }
    }
}

/// Plane defined by a point and a unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3<f64>,
    /// Normal vector (normalized)
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a new plane, normalizing `normal`.
    ///
    /// A zero-length normal yields [`Error::DegenerateNormal`].
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Result<Self> {
        let normal = normal
            .try_normalize(f64::EPSILON)
            .ok_or(Error::DegenerateNormal)?;
        Ok(Self { point, normal })
    }

    /// Plane perpendicular to a coordinate axis passing through `point`.
    pub fn axis_aligned(point: Point3<f64>, axis: crate::Axis) -> Self {
        Self {
            point,
            normal: axis.unit(),
        }
    }

    /// Signed distance from point to plane.
    /// Positive = in front, Negative = behind
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }

    /// Half-space of `point`.
    #[inline]
    pub fn signal(&self, point: &Point3<f64>) -> Signal {
        let d = self.signed_distance(point);
        if d > 0.0 {
            Signal::Positive
        } else if d < 0.0 {
            Signal::Negative
        } else {
            Signal::OnPlane
        }
    }

    /// Reflects a point across the plane.
    pub fn mirror_point(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * (2.0 * self.signed_distance(point))
    }

    /// Reflects a direction across the plane.
    pub fn mirror_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        vector - self.normal * (2.0 * vector.dot(&self.normal))
    }

    /// `true` when `point` lies strictly between `min` and `max`.
    ///
    /// This is the open slab test `signal(min) == +1 && signal(max) == -1`;
    /// points on either plane are outside.
    #[inline]
    pub fn strictly_between(min: &Plane, max: &Plane, point: &Point3<f64>) -> bool {
        min.signal(point) == Signal::Positive && max.signal(point) == Signal::Negative
    }
}
