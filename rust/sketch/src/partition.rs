// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial partitioner.
//!
//! Splits the extent of a point cloud along one axis into consecutive bands
//! of near-uniform width:
//!
//! 1. The extremes along the axis are found with an [`AxisIndex`] and padded
//!    outward by `2 * boundary_epsilon`.
//! 2. `count = floor(extent / width)`; an extent shorter than one nominal
//!    width gives a single band.
//! 3. If the remainder exceeds half a nominal width another band is added.
//! 4. Every band is `extent / count` wide, the last one ending exactly on the
//!    padded maximum.
//!
//! Each point of a [`PointArena`] is then placed directly in its band; when it
//! sits on a shared plane the lower band wins. Bands are returned in
//! increasing order and bands left empty produce nothing.

use std::collections::BTreeMap;

use hull_sketch_geometry::{Axis, AxisIndex, Plane, Signal};
use nalgebra::Point3;

use crate::arena::PointArena;
use crate::config::{BoundaryPolicy, SketchConfig};
use crate::error::{Error, Result};
use crate::keys::PointKey;

/// Most bands a single layout may hold.
pub const MAX_BAND_COUNT: usize = 100_000;

/// Band count and width covering an interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLayout {
    /// Lower end of the padded interval
    pub origin: f64,
    /// Upper end of the padded interval
    pub end: f64,
    /// Width of every band
    pub width: f64,
    pub count: usize,
}

impl BandLayout {
    /// Lays out bands over `[min, max]` for a nominal band width.
    pub fn compute(min: f64, max: f64, nominal: f64) -> Result<Self> {
        if !(nominal.is_finite() && nominal > 0.0) {
            return Err(Error::InvalidInput(format!(
                "band width must be positive, got {nominal}"
            )));
        }
        if !(min.is_finite() && max.is_finite()) || max < min {
            return Err(Error::InvalidInput(format!(
                "invalid band interval [{min}, {max}]"
            )));
        }

        let extent = max - min;
        if extent < nominal {
            return Ok(Self {
                origin: min,
                end: max,
                width: extent,
                count: 1,
            });
        }

        let whole = (extent / nominal).floor();
        if !(whole < MAX_BAND_COUNT as f64) {
            return Err(Error::InvalidInput(format!(
                "bands of width {nominal} over an extent of {extent} exceed {MAX_BAND_COUNT} bands"
            )));
        }
        let mut count = whole as usize;
        let remainder = extent - count as f64 * nominal;
        if remainder > nominal / 2.0 {
            count += 1;
        }

        Ok(Self {
            origin: min,
            end: max,
            width: extent / count as f64,
            count,
        })
    }

    pub fn extent(&self) -> f64 {
        self.end - self.origin
    }

    /// Axis interval of band `index`.
    pub fn interval(&self, index: usize) -> (f64, f64) {
        let lower = self.origin + self.width * index as f64;
        let upper = if index + 1 >= self.count {
            self.end
        } else {
            self.origin + self.width * (index + 1) as f64
        };
        (lower, upper)
    }
}

/// Slab between two parallel planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub index: usize,
    pub min_plane: Plane,
    pub max_plane: Plane,
}

impl Band {
    pub fn new(index: usize, axis: Axis, lower: f64, upper: f64) -> Self {
        let at = |c: f64| Point3::from(axis.unit() * c);
        Self {
            index,
            min_plane: Plane::axis_aligned(at(lower), axis),
            max_plane: Plane::axis_aligned(at(upper), axis),
        }
    }

    /// Membership of a point under `policy`.
    ///
    /// With [`BoundaryPolicy::LowerInclusive`] the band is `(min, max]`, and
    /// the first band also keeps points on its lower plane. With
    /// [`BoundaryPolicy::Exclusive`] it is the open slab `(min, max)`.
    pub fn contains(&self, point: &Point3<f64>, policy: BoundaryPolicy) -> bool {
        match policy {
            BoundaryPolicy::Exclusive => Plane::strictly_between(&self.min_plane, &self.max_plane, point),
            BoundaryPolicy::LowerInclusive => {
                let above_min = match self.min_plane.signal(point) {
                    Signal::Positive => true,
                    Signal::OnPlane => self.index == 0,
                    Signal::Negative => false,
                };
                above_min && self.max_plane.signal(point) != Signal::Positive
            }
        }
    }

    /// `true` when a point lies strictly between the band planes.
    pub fn strictly_contains(&self, point: &Point3<f64>) -> bool {
        Plane::strictly_between(&self.min_plane, &self.max_plane, point)
    }
}

/// Points consumed by one non-empty band.
#[derive(Debug, Clone)]
pub struct BandAssignment {
    pub band: Band,
    pub members: Vec<PointKey>,
}

/// Band partitioner along one axis.
#[derive(Debug, Clone)]
pub struct Partitioner {
    axis: Axis,
    nominal_width: f64,
    epsilon: f64,
    policy: BoundaryPolicy,
}

impl Partitioner {
    pub fn new(axis: Axis, nominal_width: f64, epsilon: f64, policy: BoundaryPolicy) -> Self {
        Self {
            axis,
            nominal_width,
            epsilon,
            policy,
        }
    }

    pub fn from_config(config: &SketchConfig) -> Self {
        Self::new(
            config.longitudinal_axis,
            config.band_width,
            config.boundary_epsilon,
            config.boundary_policy,
        )
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Padded extremes of the unassigned, positioned points of `arena`.
    pub fn extent(&self, arena: &PointArena) -> Result<Option<(f64, f64)>> {
        let mut index = AxisIndex::new(self.epsilon);
        for (key, point) in arena.remaining() {
            if let Some(p) = &point.position {
                index.insert(self.axis.coord(p), key)?;
            }
        }

        let Some(((min, _), (max, _))) = index.extremes() else {
            return Ok(None);
        };
        let pad = 2.0 * self.epsilon;
        Ok(Some((min - pad, max + pad)))
    }

    /// Band layout over the unassigned points of `arena`.
    pub fn layout(&self, arena: &PointArena) -> Result<Option<BandLayout>> {
        match self.extent(arena)? {
            Some((min, max)) => BandLayout::compute(min, max, self.nominal_width).map(Some),
            None => Ok(None),
        }
    }

    /// Band `index` of `layout`.
    pub fn band(&self, layout: &BandLayout, index: usize) -> Band {
        let (lower, upper) = layout.interval(index);
        Band::new(index, self.axis, lower, upper)
    }

    /// Index of the band holding `position`, if any.
    ///
    /// The band is found arithmetically and confirmed against its planes;
    /// rounding near a plane can move a point to a neighbour, so the bands on
    /// either side are tried too, lowest first.
    pub fn locate(&self, layout: &BandLayout, position: &Point3<f64>) -> Option<usize> {
        let last = layout.count - 1;
        let offset = (self.axis.coord(position) - layout.origin) / layout.width;
        let guess = if offset.is_finite() && offset > 0.0 {
            (offset.floor() as usize).min(last)
        } else {
            0
        };

        (guess.saturating_sub(1)..=(guess + 1).min(last))
            .find(|&i| self.band(layout, i).contains(position, self.policy))
    }

    /// Assigns the unassigned points of `arena` to bands in increasing order.
    ///
    /// Only non-empty bands are returned. Points without a position and
    /// points excluded by the boundary policy stay unassigned.
    pub fn partition(&self, arena: &mut PointArena) -> Result<Vec<BandAssignment>> {
        let Some(layout) = self.layout(arena)? else {
            return Ok(Vec::new());
        };

        tracing::debug!(
            axis = %self.axis,
            origin = layout.origin,
            end = layout.end,
            width = layout.width,
            count = layout.count,
            "band layout"
        );

        let mut filled: BTreeMap<usize, Vec<PointKey>> = BTreeMap::new();
        for (key, point) in arena.remaining() {
            let band = point
                .position
                .as_ref()
                .and_then(|pos| self.locate(&layout, pos));
            if let Some(index) = band {
                filled.entry(index).or_default().push(key);
            }
        }

        Ok(filled
            .into_iter()
            .map(|(index, members)| {
                for &key in &members {
                    arena.mark_assigned(key);
                }
                BandAssignment {
                    band: self.band(&layout, index),
                    members,
                }
            })
            .collect())
    }
}
