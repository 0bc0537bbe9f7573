// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-category sketch policies.
//!
//! A section category decides two things: whether its points are cut into
//! bands, and which surface patches are shown next to a group.
//!
//! | Category     | Grouping   | Patch predicate                                    |
//! |--------------|------------|----------------------------------------------------|
//! | Transverse   | one group  | centroid on the displayed side of the split plane  |
//! | Deck         | bands      | centroid strictly inside the band                  |
//! | Longitudinal | bands      | inside the band and aligned, or a member's target  |
//! | Generic      | one group  | centroid inside the padded point box               |

use hull_sketch_geometry::{BoundingBox, Plane, Signal};
use nalgebra::Vector3;
use rustc_hash::FxHashSet;

use crate::model::{PatchId, PatchKind, SectionCategory, SurfacePatch};
use crate::partition::Band;

/// Sketch policy of a section category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchPolicy {
    Transverse,
    Deck,
    Longitudinal,
    Generic,
}

impl From<SectionCategory> for SketchPolicy {
    fn from(category: SectionCategory) -> Self {
        match category {
            SectionCategory::Transverse => SketchPolicy::Transverse,
            SectionCategory::Deck => SketchPolicy::Deck,
            SectionCategory::Longitudinal => SketchPolicy::Longitudinal,
            SectionCategory::Generic => SketchPolicy::Generic,
        }
    }
}

/// What a group knows when its patches are picked.
#[derive(Debug, Clone)]
pub struct PatchContext<'a> {
    pub band: Option<&'a Band>,
    /// Average normal of the displayed points
    pub normal: Option<Vector3<f64>>,
    /// Patches the displayed points were measured on
    pub targets: &'a FxHashSet<PatchId>,
    /// Split plane and the displayed side
    pub side: Option<(&'a Plane, Signal)>,
    /// Padded box of a generic group
    pub region: Option<BoundingBox>,
    /// Radians
    pub angle_tolerance: f64,
}

impl SketchPolicy {
    /// `true` for categories whose points are cut into bands.
    pub fn is_banded(self) -> bool {
        matches!(self, SketchPolicy::Deck | SketchPolicy::Longitudinal)
    }

    /// Whether `patch` is shown with the group described by `ctx`.
    pub fn shows(self, patch: &SurfacePatch, ctx: &PatchContext<'_>) -> bool {
        if patch.kind != PatchKind::Plate {
            return false;
        }
        let in_band = || ctx.band.map_or(true, |b| b.strictly_contains(&patch.centroid));

        match self {
            SketchPolicy::Transverse => match ctx.side {
                Some((plane, side)) => plane.signal(&patch.centroid).or_negative() == side,
                None => true,
            },
            SketchPolicy::Deck => in_band(),
            SketchPolicy::Longitudinal => {
                let aligned = ctx
                    .normal
                    .is_some_and(|n| n.angle(&patch.normal) < ctx.angle_tolerance);
                (in_band() && aligned) || ctx.targets.contains(&patch.id)
            }
            SketchPolicy::Generic => ctx
                .region
                .map_or(true, |r| r.contains_strict(&patch.centroid)),
        }
    }

    /// Patches shown with a group, in input order.
    pub fn select(self, patches: &[SurfacePatch], ctx: &PatchContext<'_>) -> Vec<SurfacePatch> {
        patches
            .iter()
            .filter(|p| self.shows(p, ctx))
            .cloned()
            .collect()
    }
}
