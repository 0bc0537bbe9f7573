// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group bookkeeping.
//!
//! The [`PointArena`] owns every point of one planning run. Instead of
//! removing points from a shared list as bands consume them, each slot carries
//! an `assigned` flag; [`PointArena::remaining`] yields only unassigned points
//! in insertion order.
//!
//! [`LocationIndex`] maps a cross-reference ID to the points sharing it. An ID
//! may repeat across sides and sections, but not within one side and
//! direction.

use nalgebra::Vector3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::error::Result;
use crate::keys::PointKey;
use crate::model::{GaugingPoint, LocationId, LocationKey, PointId};

#[derive(Debug, Clone)]
struct PointSlot {
    point: GaugingPoint,
    assigned: bool,
}

/// Owner of the points of one planning run.
#[derive(Debug, Default)]
pub struct PointArena {
    slots: SlotMap<PointKey, PointSlot>,
    order: Vec<PointKey>,
}

impl PointArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an arena holding `points` in order.
    pub fn from_points(points: impl IntoIterator<Item = GaugingPoint>) -> Self {
        let mut arena = Self::new();
        for point in points {
            arena.insert(point);
        }
        arena
    }

    pub fn insert(&mut self, point: GaugingPoint) -> PointKey {
        let key = self.slots.insert(PointSlot {
            point,
            assigned: false,
        });
        self.order.push(key);
        key
    }

    pub fn get(&self, key: PointKey) -> Option<&GaugingPoint> {
        self.slots.get(key).map(|s| &s.point)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_assigned(&self, key: PointKey) -> bool {
        self.slots.get(key).is_some_and(|s| s.assigned)
    }

    /// Flags a point as consumed by a group. Returns `false` if it already was.
    pub fn mark_assigned(&mut self, key: PointKey) -> bool {
        match self.slots.get_mut(key) {
            Some(slot) if !slot.assigned => {
                slot.assigned = true;
                true
            }
            _ => false,
        }
    }

    /// All points in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PointKey, &GaugingPoint)> {
        self.order
            .iter()
            .filter_map(move |&k| self.slots.get(k).map(|s| (k, &s.point)))
    }

    /// Unassigned points in insertion order.
    pub fn remaining(&self) -> impl Iterator<Item = (PointKey, &GaugingPoint)> {
        self.order.iter().filter_map(move |&k| {
            self.slots
                .get(k)
                .filter(|s| !s.assigned)
                .map(|s| (k, &s.point))
        })
    }

    pub fn remaining_count(&self) -> usize {
        self.slots.values().filter(|s| !s.assigned).count()
    }

    /// Clones the points behind `keys`, skipping stale keys.
    pub fn collect(&self, keys: &[PointKey]) -> Vec<GaugingPoint> {
        keys.iter()
            .filter_map(|&k| self.get(k).cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Indexed {
    point: PointId,
    forward: bool,
}

/// Cross-reference ID index.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    by_id: FxHashMap<LocationId, SmallVec<[Indexed; 2]>>,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every point, failing on the first one without a location ID.
    pub fn build<'a>(points: impl IntoIterator<Item = &'a GaugingPoint>) -> Result<Self> {
        let mut index = Self::new();
        for point in points {
            index.insert(point)?;
        }
        Ok(index)
    }

    pub fn insert(&mut self, point: &GaugingPoint) -> Result<()> {
        let key = point.require_location_key()?;
        self.by_id.entry(key.id).or_default().push(Indexed {
            point: point.id,
            forward: key.forward,
        });
        Ok(())
    }

    /// `true` when a point with the same ID and direction is indexed.
    pub fn contains(&self, key: &LocationKey) -> bool {
        self.by_id
            .get(&key.id)
            .is_some_and(|v| v.iter().any(|e| e.forward == key.forward))
    }

    /// Points sharing a location ID, in either direction.
    pub fn points(&self, id: LocationId) -> impl Iterator<Item = PointId> + '_ {
        self.by_id
            .get(&id)
            .into_iter()
            .flat_map(|v| v.iter().map(|e| e.point))
    }

    /// Number of distinct IDs.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Normalized mean of `normals`; `None` when empty or cancelling out.
pub fn average_normal<'a>(normals: impl IntoIterator<Item = &'a Vector3<f64>>) -> Option<Vector3<f64>> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for n in normals {
        sum += n;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    (sum / count as f64).try_normalize(f64::EPSILON)
}
