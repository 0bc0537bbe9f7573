// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Symmetry reconciliation.
//!
//! Every source point whose `(location ID, forward)` key is missing on the
//! target side gets a mirrored counterpart on the target. The counterpart is
//! only created when the host can place the mirrored position on a real
//! target patch; otherwise the point is skipped and counted.

use hull_sketch_geometry::Plane;
use nalgebra::Vector3;

use crate::arena::LocationIndex;
use crate::error::Result;
use crate::host::SurfaceLookup;
use crate::model::{GaugingPoint, PointId, ReportLocation, SectionId};

/// How the two sides relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorMode {
    /// Two halves of one section: the normal is kept.
    SplitSection,
    /// Two distinct port/starboard sections: the normal is negated.
    PairedSections,
}

impl MirrorMode {
    pub fn mirror_normal(self, normal: &Vector3<f64>) -> Vector3<f64> {
        match self {
            MirrorMode::SplitSection => *normal,
            MirrorMode::PairedSections => -normal,
        }
    }
}

/// Symmetry plane and destination of mirrored points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorFrame {
    pub plane: Plane,
    pub mode: MirrorMode,
    pub target_section: SectionId,
}

/// Points created by one reconciliation.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub synthesized: Vec<GaugingPoint>,
    /// Mirrored positions with no target patch
    pub skipped: usize,
}

/// Synthesizes mirrored counterparts for unmatched source points.
pub struct Reconciler<'a, L: SurfaceLookup + ?Sized> {
    lookup: &'a L,
    tolerance: f64,
    next_seq: u64,
}

impl<'a, L: SurfaceLookup + ?Sized> Reconciler<'a, L> {
    pub fn new(lookup: &'a L, tolerance: f64) -> Self {
        Self {
            lookup,
            tolerance,
            next_seq: 0,
        }
    }

    /// Number of points synthesized so far.
    pub fn synthesized_count(&self) -> u64 {
        self.next_seq
    }

    /// Mirrors unmatched `source` points onto the target side.
    ///
    /// Every point on both sides needs a location ID.
    pub fn reconcile(
        &mut self,
        source: &[&GaugingPoint],
        target: &[&GaugingPoint],
        frame: &MirrorFrame,
    ) -> Result<Reconciliation> {
        let mut index = LocationIndex::build(target.iter().copied())?;
        let mut result = Reconciliation::default();

        for point in source {
            let key = point.require_location_key()?;
            if index.contains(&key) {
                continue;
            }
            let Some(position) = point.position else {
                continue;
            };

            let mirrored = frame.plane.mirror_point(&position);
            let kind = point.target.map(|t| t.kind);
            let Some(hit) = self
                .lookup
                .locate(frame.target_section, &mirrored, kind, self.tolerance)?
            else {
                tracing::debug!(
                    point = %point.id,
                    location = %key.id,
                    section = %frame.target_section,
                    "mirrored point misses target surface"
                );
                result.skipped += 1;
                continue;
            };

            let synthesized = GaugingPoint {
                id: PointId::synthetic(self.next_seq),
                section: frame.target_section,
                position: Some(mirrored),
                normal: frame.mode.mirror_normal(&point.normal),
                location: ReportLocation {
                    id: point.location.id,
                    column: None,
                    strake: point.location.strake.clone(),
                    side: point.location.side.map(|s| s.opposite()),
                    forward: point.location.forward,
                },
                target: Some(hit.patch),
                thickness: point.thickness,
                name: point.name.clone(),
            };
            self.next_seq += 1;

            index.insert(&synthesized)?;
            result.synthesized.push(synthesized);
        }

        Ok(result)
    }
}
