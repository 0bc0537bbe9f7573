// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along the axis.
    #[inline]
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Coordinate of `point` along the axis.
    #[inline]
    pub fn coord(self, point: &Point3<f64>) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
            Axis::Z => point.z,
        }
    }

    /// Single-letter label.
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned bounding box in f64 precision
///
/// A freshly created box is empty (inverted corners) until a point or another
/// box is merged into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Create an empty box
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Create a box from two opposite corners in any order
    pub fn from_corners(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box containing every point
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand(p);
        }
        bounds
    }

    /// `true` until at least one point has been added
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand to include a point
    #[inline]
    pub fn expand(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Merge another box into this one
    pub fn union_with(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.expand(&other.min);
        self.expand(&other.max);
    }

    /// Union of two boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut merged = *self;
        merged.union_with(other);
        merged
    }

    /// Centre point (origin for an empty box)
    pub fn center(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis (zero for an empty box)
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Extent along X
    pub fn width(&self) -> f64 {
        self.size().x
    }

    /// Extent along Y
    pub fn height(&self) -> f64 {
        self.size().y
    }

    /// Extent along Z
    pub fn depth(&self) -> f64 {
        self.size().z
    }

    /// Axes ordered by decreasing extent; ties keep X, Y, Z order.
    pub fn size_ordered_axes(&self) -> [Axis; 3] {
        let size = self.size();
        let mut axes = [Axis::X, Axis::Y, Axis::Z];
        // stable sort keeps X before Y before Z on ties
        axes.sort_by(|a, b| {
            let sa = size[*a as usize];
            let sb = size[*b as usize];
            sb.total_cmp(&sa)
        });
        axes
    }

    /// Axis with the largest extent
    pub fn dominant_axis(&self) -> Axis {
        self.size_ordered_axes()[0]
    }

    /// Extent along the dominant axis
    pub fn dominant_size(&self) -> f64 {
        self.size()[self.dominant_axis() as usize]
    }

    /// Grow every face outward by `amount`
    pub fn padded(&self, amount: f64) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let pad = Vector3::new(amount, amount, amount);
        BoundingBox {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Inclusive containment
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Containment excluding the faces
    pub fn contains_strict(&self, p: &Point3<f64>) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }

    /// The eight corners
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
