// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered index keyed by a single coordinate
//!
//! Values are sorted by one coordinate so the extremes of a cloud can be read
//! off both ends. Two values may share a coordinate; a colliding key is nudged
//! upward by `epsilon` until it is unique. Nudged keys only ever grow, so the
//! true minimum always sits at the front, while the maximum is resolved from
//! the stored coordinates rather than from the keys.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Total-ordered f64 key
#[derive(Debug, Clone, Copy)]
struct AxisKey(f64);

impl PartialEq for AxisKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for AxisKey {}

impl PartialOrd for AxisKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AxisKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    coord: f64,
    value: T,
}

/// Coordinate-sorted index with epsilon tie breaking
#[derive(Debug, Clone)]
pub struct AxisIndex<T> {
    epsilon: f64,
    entries: BTreeMap<AxisKey, Entry<T>>,
}

impl<T> AxisIndex<T> {
    /// Create an empty index that nudges colliding keys by `epsilon`
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.abs(),
            entries: BTreeMap::new(),
        }
    }

    /// Insert a value at `coord`. Returns the (possibly nudged) key used.
    pub fn insert(&mut self, coord: f64, value: T) -> Result<f64> {
        if !coord.is_finite() {
            return Err(Error::NonFiniteCoordinate(coord));
        }

        let mut key = coord;
        while self.entries.contains_key(&AxisKey(key)) {
            key = nudge(key, self.epsilon);
        }

        self.entries.insert(AxisKey(key), Entry { coord, value });
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the smallest coordinate
    pub fn min(&self) -> Option<(f64, &T)> {
        self.entries
            .values()
            .next()
            .map(|e| (e.coord, &e.value))
    }

    /// Entry with the largest coordinate
    ///
    /// Walks back from the last key; since a key is never below its own
    /// coordinate, once a key drops to the best coordinate seen nothing
    /// earlier can beat it.
    pub fn max(&self) -> Option<(f64, &T)> {
        let mut best: Option<&Entry<T>> = None;
        for (key, entry) in self.entries.iter().rev() {
            if let Some(b) = best {
                if key.0 <= b.coord {
                    break;
                }
                if entry.coord > b.coord {
                    best = Some(entry);
                }
            } else {
                best = Some(entry);
            }
        }
        best.map(|e| (e.coord, &e.value))
    }

    /// Both extremes at once
    pub fn extremes(&self) -> Option<((f64, &T), (f64, &T))> {
        Some((self.min()?, self.max()?))
    }

    /// Values in key order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values().map(|e| &e.value)
    }
}

/// Smallest step above `key` that is at least `epsilon` when representable.
fn nudge(key: f64, epsilon: f64) -> f64 {
    let next = key + epsilon;
    if next > key {
        return next;
    }
    // epsilon vanished in rounding: step to the next representable value
    if key == 0.0 {
        f64::from_bits(1)
    } else if key > 0.0 {
        f64::from_bits(key.to_bits() + 1)
    } else {
        f64::from_bits(key.to_bits() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_of_distinct_coordinates() {
        let mut index = AxisIndex::new(1e-6);
        for (i, x) in [3.0, -1.0, 7.5, 2.0].into_iter().enumerate() {
            index.insert(x, i).unwrap();
        }

        assert_eq!(index.len(), 4);
        assert_eq!(index.min(), Some((-1.0, &1)));
        assert_eq!(index.max(), Some((7.5, &2)));
    }

    #[test]
    fn test_collisions_are_nudged() {
        let mut index = AxisIndex::new(0.5);
        assert_eq!(index.insert(1.0, 'a').unwrap(), 1.0);
        assert_eq!(index.insert(1.0, 'b').unwrap(), 1.5);
        assert_eq!(index.insert(1.0, 'c').unwrap(), 2.0);
        assert_eq!(index.len(), 3);
        assert_eq!(index.values().copied().collect::<String>(), "abc");
    }

    #[test]
    fn test_max_is_chosen_by_value_not_key() {
        // the second 5.0 is nudged past 5.0 + 1e-10 but must not win
        let mut index = AxisIndex::new(1e-9);
        index.insert(5.0, "first").unwrap();
        index.insert(5.0 + 1e-10, "true max").unwrap();
        index.insert(5.0, "nudged").unwrap();

        let (coord, value) = index.max().unwrap();
        assert_eq!(*value, "true max");
        assert_eq!(coord, 5.0 + 1e-10);
    }

    #[test]
    fn test_nudge_survives_large_magnitudes() {
        let mut index = AxisIndex::new(1e-9);
        index.insert(1e12, 0).unwrap();
        let key = index.insert(1e12, 1).unwrap();
        assert!(key > 1e12);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut index = AxisIndex::new(1e-6);
        assert!(matches!(
            index.insert(f64::NAN, ()),
            Err(Error::NonFiniteCoordinate(_))
        ));
        assert!(index.is_empty());
    }
}
