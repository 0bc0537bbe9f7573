// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sketch planning.
//!
//! [`SketchPlanner`] turns the points of one section, or of a port/starboard
//! pair of sections, into an ordered list of [`SketchGroup`]s. The section
//! category picks the [`SketchPolicy`]; banded policies go through the
//! [`Partitioner`], and whenever two mirrored sides meet in a group the
//! [`Reconciler`] completes the displayed side.

use hull_sketch_geometry::{BoundingBox, Plane, Signal};
use nalgebra::Vector3;
use rustc_hash::FxHashSet;

use crate::arena::{average_normal, PointArena};
use crate::config::{SketchConfig, SourceSide};
use crate::error::{Error, Result};
use crate::host::SurfaceLookup;
use crate::model::{GaugingPoint, PatchId, PatchKind, Section, SectionCategory, SectionId, SurfacePatch};
use crate::partition::{Band, Partitioner};
use crate::reconcile::{MirrorFrame, MirrorMode, Reconciler};
use crate::strategy::{PatchContext, SketchPolicy};

/// One visual unit of output.
#[derive(Debug, Clone)]
pub struct SketchGroup {
    /// Position in the plan, from 0
    pub index: usize,
    /// Section the group is drawn on
    pub section: SectionId,
    /// Band of banded policies
    pub band: Option<Band>,
    /// Real points drawn with the group
    pub members: Vec<GaugingPoint>,
    /// Real points of the mirrored side consumed by the group
    pub counterparts: Vec<GaugingPoint>,
    /// Transient mirrored points completing the drawn side
    pub synthesized: Vec<GaugingPoint>,
    pub patches: Vec<SurfacePatch>,
    /// Average normal of the drawn points
    pub normal: Option<Vector3<f64>>,
}

impl SketchGroup {
    /// Members followed by synthesized points.
    pub fn display_points(&self) -> impl Iterator<Item = &GaugingPoint> {
        self.members.iter().chain(&self.synthesized)
    }

    /// Every real point consumed by the group.
    pub fn real_points(&self) -> impl Iterator<Item = &GaugingPoint> {
        self.members.iter().chain(&self.counterparts)
    }

    /// Union of the selected patch bounds.
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for patch in &self.patches {
            bounds.union_with(&patch.bounds);
        }
        bounds
    }
}

/// Points of one group before its patches are picked.
struct GroupParts {
    index: usize,
    section: SectionId,
    band: Option<Band>,
    members: Vec<GaugingPoint>,
    counterparts: Vec<GaugingPoint>,
    synthesized: Vec<GaugingPoint>,
}

impl GroupParts {
    fn single(section: SectionId, members: Vec<GaugingPoint>) -> Self {
        Self {
            index: 0,
            section,
            band: None,
            members,
            counterparts: Vec::new(),
            synthesized: Vec::new(),
        }
    }
}

/// Plans sketch groups for sections.
pub struct SketchPlanner<'a, L: SurfaceLookup + ?Sized> {
    config: &'a SketchConfig,
    lookup: &'a L,
    reconciler: Reconciler<'a, L>,
}

impl<'a, L: SurfaceLookup + ?Sized> SketchPlanner<'a, L> {
    pub fn new(config: &'a SketchConfig, lookup: &'a L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            lookup,
            reconciler: Reconciler::new(lookup, config.surface_tolerance),
        })
    }

    /// Groups of a single section.
    pub fn plan_section(&mut self, section: &Section, points: Vec<GaugingPoint>) -> Result<Vec<SketchGroup>> {
        let points = positioned(section, points);
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let patches = self.lookup.patches(section.id)?;
        let policy = SketchPolicy::from(section.category);
        let groups = match policy {
            SketchPolicy::Transverse => vec![self.plan_split(section, points, &patches)?],
            SketchPolicy::Deck | SketchPolicy::Longitudinal => {
                self.plan_bands(section, policy, points, &patches)?
            }
            SketchPolicy::Generic => vec![self.plan_generic(section, points, &patches)],
        };

        tracing::info!(
            section = %section.name,
            category = %section.category,
            groups = groups.len(),
            "planned section sketch"
        );
        Ok(groups)
    }

    /// Groups of two mirrored sections sharing one set of bands.
    ///
    /// Each band is drawn on one of the two sections; the other side's points
    /// are mirrored onto it where the drawn side lacks them.
    pub fn plan_pair(
        &mut self,
        primary: &Section,
        partner: &Section,
        primary_points: Vec<GaugingPoint>,
        partner_points: Vec<GaugingPoint>,
    ) -> Result<Vec<SketchGroup>> {
        if primary.id == partner.id {
            return Err(Error::InvalidInput(format!(
                "{} cannot be paired with itself",
                primary.name
            )));
        }
        for section in [primary, partner] {
            if section.category != SectionCategory::Longitudinal {
                tracing::warn!(
                    section = %section.name,
                    category = %section.category,
                    "paired sketch on a non-longitudinal section"
                );
            }
        }

        let primary_points = positioned(primary, primary_points);
        let partner_points = positioned(partner, partner_points);
        if primary_points.is_empty() && partner_points.is_empty() {
            return Ok(Vec::new());
        }

        let primary_patches = self.lookup.patches(primary.id)?;
        let partner_patches = self.lookup.patches(partner.id)?;
        let mut bounds = plate_bounds(&primary_patches).union(&plate_bounds(&partner_patches));
        if bounds.is_empty() {
            bounds = point_bounds(primary_points.iter().chain(&partner_points));
        }
        let plane = Plane::axis_aligned(bounds.center(), self.config.symmetry_axis);

        let mut arena = PointArena::from_points(primary_points.into_iter().chain(partner_points));
        let assignments = Partitioner::from_config(self.config).partition(&mut arena)?;
        log_unassigned(primary, &arena);

        let mut groups = Vec::with_capacity(assignments.len());
        for (index, assignment) in assignments.into_iter().enumerate() {
            let (partner_side, primary_side): (Vec<_>, Vec<_>) = arena
                .collect(&assignment.members)
                .into_iter()
                .partition(|p| p.section == partner.id);

            let (source, target, drawn) = if partner_side.is_empty() {
                (Vec::new(), primary_side, primary)
            } else if primary_side.is_empty() {
                (Vec::new(), partner_side, partner)
            } else if self.first_is_source(partner_side.len(), primary_side.len()) {
                (partner_side, primary_side, primary)
            } else {
                (primary_side, partner_side, partner)
            };

            let frame = MirrorFrame {
                plane,
                mode: MirrorMode::PairedSections,
                target_section: drawn.id,
            };
            let synthesized = self.mirror(&source, &target, &frame)?;

            let patches = if drawn.id == primary.id {
                &primary_patches
            } else {
                &partner_patches
            };
            groups.push(self.assemble(
                GroupParts {
                    index,
                    section: drawn.id,
                    band: Some(assignment.band),
                    members: target,
                    counterparts: source,
                    synthesized,
                },
                SketchPolicy::Longitudinal,
                patches,
                None,
                None,
            ));
        }

        tracing::info!(
            primary = %primary.name,
            partner = %partner.name,
            groups = groups.len(),
            "planned paired sketch"
        );
        Ok(groups)
    }

    /// One group split across the section's own symmetry plane.
    fn plan_split(
        &mut self,
        section: &Section,
        points: Vec<GaugingPoint>,
        patches: &[SurfacePatch],
    ) -> Result<SketchGroup> {
        let center = reference_bounds(patches, &points).center();
        let plane = Plane::new(center, section.splitting_normal())?;

        let (front, back): (Vec<_>, Vec<_>) = points
            .into_iter()
            .partition(|p| side_of(&plane, p) == Signal::Positive);

        let (source, target) = if front.is_empty() || back.is_empty() {
            let all = if front.is_empty() { back } else { front };
            (Vec::new(), all)
        } else if self.first_is_source(front.len(), back.len()) {
            (front, back)
        } else {
            (back, front)
        };
        let side = target
            .first()
            .map_or(Signal::Negative, |p| side_of(&plane, p));

        let frame = MirrorFrame {
            plane,
            mode: MirrorMode::SplitSection,
            target_section: section.id,
        };
        let synthesized = self.mirror(&source, &target, &frame)?;

        let mut parts = GroupParts::single(section.id, target);
        parts.counterparts = source;
        parts.synthesized = synthesized;
        Ok(self.assemble(parts, SketchPolicy::Transverse, patches, Some((&plane, side)), None))
    }

    fn plan_bands(
        &mut self,
        section: &Section,
        policy: SketchPolicy,
        points: Vec<GaugingPoint>,
        patches: &[SurfacePatch],
    ) -> Result<Vec<SketchGroup>> {
        let mut arena = PointArena::from_points(points);
        let assignments = Partitioner::from_config(self.config).partition(&mut arena)?;
        log_unassigned(section, &arena);

        Ok(assignments
            .into_iter()
            .enumerate()
            .map(|(index, assignment)| {
                let mut parts = GroupParts::single(section.id, arena.collect(&assignment.members));
                parts.index = index;
                parts.band = Some(assignment.band);
                self.assemble(parts, policy, patches, None, None)
            })
            .collect())
    }

    fn plan_generic(&self, section: &Section, points: Vec<GaugingPoint>, patches: &[SurfacePatch]) -> SketchGroup {
        let pad = reference_bounds(patches, &points).dominant_size() * self.config.generic_padding_ratio;
        let region = point_bounds(&points).padded(pad);
        self.assemble(
            GroupParts::single(section.id, points),
            SketchPolicy::Generic,
            patches,
            None,
            Some(region),
        )
    }

    /// Whether the first of two non-empty sides is mirrored onto the second.
    /// Ties go to the first side.
    fn first_is_source(&self, first: usize, second: usize) -> bool {
        match self.config.source_side {
            SourceSide::Fewer => second >= first,
            SourceSide::More => second <= first,
        }
    }

    fn mirror(
        &mut self,
        source: &[GaugingPoint],
        target: &[GaugingPoint],
        frame: &MirrorFrame,
    ) -> Result<Vec<GaugingPoint>> {
        if source.is_empty() {
            return Ok(Vec::new());
        }
        let source: Vec<&GaugingPoint> = source.iter().collect();
        let target: Vec<&GaugingPoint> = target.iter().collect();
        let result = self.reconciler.reconcile(&source, &target, frame)?;
        if result.skipped > 0 {
            tracing::debug!(
                section = %frame.target_section,
                skipped = result.skipped,
                synthesized = result.synthesized.len(),
                "mirror lookups missed the target surface"
            );
        }
        Ok(result.synthesized)
    }

    fn assemble(
        &self,
        parts: GroupParts,
        policy: SketchPolicy,
        patches: &[SurfacePatch],
        side: Option<(&Plane, Signal)>,
        region: Option<BoundingBox>,
    ) -> SketchGroup {
        let drawn = || parts.members.iter().chain(&parts.synthesized);
        let normal = average_normal(drawn().map(|p| &p.normal));
        let targets: FxHashSet<PatchId> = drawn().filter_map(|p| p.target.map(|t| t.id)).collect();

        let ctx = PatchContext {
            band: parts.band.as_ref(),
            normal,
            targets: &targets,
            side,
            region,
            angle_tolerance: self.config.angle_tolerance_rad(),
        };
        let patches = policy.select(patches, &ctx);

        SketchGroup {
            index: parts.index,
            section: parts.section,
            band: parts.band,
            members: parts.members,
            counterparts: parts.counterparts,
            synthesized: parts.synthesized,
            patches,
            normal,
        }
    }
}

/// Drops points the host could not place.
fn positioned(section: &Section, points: Vec<GaugingPoint>) -> Vec<GaugingPoint> {
    points
        .into_iter()
        .filter(|p| {
            if p.position.is_none() {
                tracing::warn!(section = %section.name, point = %p.id, "gauging point has no position");
                return false;
            }
            true
        })
        .collect()
}

fn side_of(plane: &Plane, point: &GaugingPoint) -> Signal {
    point
        .position
        .map_or(Signal::Negative, |p| plane.signal(&p).or_negative())
}

fn plate_bounds(patches: &[SurfacePatch]) -> BoundingBox {
    let mut bounds = BoundingBox::empty();
    for patch in patches.iter().filter(|p| p.kind == PatchKind::Plate) {
        bounds.union_with(&patch.bounds);
    }
    bounds
}

fn point_bounds<'p>(points: impl IntoIterator<Item = &'p GaugingPoint>) -> BoundingBox {
    BoundingBox::from_points(points.into_iter().filter_map(|p| p.position.as_ref()))
}

/// Plate bounds of the section, or the point bounds when it has no plates.
fn reference_bounds(patches: &[SurfacePatch], points: &[GaugingPoint]) -> BoundingBox {
    let plates = plate_bounds(patches);
    if plates.is_empty() {
        point_bounds(points)
    } else {
        plates
    }
}

fn log_unassigned(section: &Section, arena: &PointArena) {
    let left = arena.remaining_count();
    if left > 0 {
        tracing::debug!(section = %section.name, points = left, "points left on band boundaries");
    }
}
