// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sketch sessions.
//!
//! A session plans groups, hands each one to a [`GroupSink`] and then
//! releases its synthesized points. Group numbers keep counting across every
//! call on the same session, so a whole campaign can be sketched as one
//! numbered sequence.

use crate::config::SketchConfig;
use crate::error::{Result, ResultExt};
use crate::highlight::highlight_region;
use crate::host::{GroupSink, PointSource, SurfaceLookup, ViewProjection};
use crate::model::{GaugingPoint, ReportId, Section};
use crate::planner::{SketchGroup, SketchPlanner};

/// Counts of one sketch call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SketchSummary {
    pub groups: usize,
    pub points: usize,
    pub synthesized: usize,
}

impl SketchSummary {
    fn add(&mut self, other: SketchSummary) {
        self.groups += other.groups;
        self.points += other.points;
        self.synthesized += other.synthesized;
    }
}

/// Drives planning and emission of sketch groups.
pub struct SketchSession<'a, L: SurfaceLookup + ?Sized, S: GroupSink + ?Sized> {
    config: &'a SketchConfig,
    planner: SketchPlanner<'a, L>,
    sink: &'a mut S,
    view: Option<&'a dyn ViewProjection>,
    next_number: usize,
}

impl<'a, L: SurfaceLookup + ?Sized, S: GroupSink + ?Sized> SketchSession<'a, L, S> {
    pub fn new(config: &'a SketchConfig, lookup: &'a L, sink: &'a mut S) -> Result<Self> {
        Ok(Self {
            config,
            planner: SketchPlanner::new(config, lookup)?,
            sink,
            view: None,
            next_number: 1,
        })
    }

    /// Computes a highlight region for every emitted group.
    pub fn with_view(mut self, view: &'a dyn ViewProjection) -> Self {
        self.view = Some(view);
        self
    }

    /// Number the next emitted group will get.
    pub fn next_number(&self) -> usize {
        self.next_number
    }

    /// Sketches one section.
    pub fn sketch_section(&mut self, section: &Section, points: Vec<GaugingPoint>) -> Result<SketchSummary> {
        let groups = self
            .planner
            .plan_section(section, points)
            .context(|| format!("sketching section {}", section.name))?;
        self.emit_all(groups)
    }

    /// Sketches two mirrored sections together.
    pub fn sketch_pair(
        &mut self,
        primary: &Section,
        partner: &Section,
        primary_points: Vec<GaugingPoint>,
        partner_points: Vec<GaugingPoint>,
    ) -> Result<SketchSummary> {
        let groups = self
            .planner
            .plan_pair(primary, partner, primary_points, partner_points)
            .context(|| format!("sketching sections {} and {}", primary.name, partner.name))?;
        self.emit_all(groups)
    }

    /// Sketches a section (or pair) for every report, numbering groups
    /// consecutively across reports.
    pub fn sketch_reports(
        &mut self,
        source: &dyn PointSource,
        reports: &[ReportId],
        section: &Section,
        partner: Option<&Section>,
    ) -> Result<SketchSummary> {
        let mut summary = SketchSummary::default();
        for &report in reports {
            let points = source
                .points(report, section.id)
                .context(|| format!("reading {report} points of {}", section.name))?;

            let report_summary = match partner {
                Some(partner) => {
                    let partner_points = source
                        .points(report, partner.id)
                        .context(|| format!("reading {report} points of {}", partner.name))?;
                    self.sketch_pair(section, partner, points, partner_points)
                }
                None => self.sketch_section(section, points),
            }
            .context(|| format!("sketching {report}"))?;

            summary.add(report_summary);
        }

        tracing::info!(
            section = %section.name,
            reports = reports.len(),
            groups = summary.groups,
            "sketched campaign"
        );
        Ok(summary)
    }

    fn emit_all(&mut self, groups: Vec<SketchGroup>) -> Result<SketchSummary> {
        let mut summary = SketchSummary::default();
        for group in groups {
            let number = self.next_number;
            self.next_number += 1;

            let region = self
                .view
                .and_then(|view| highlight_region(&group.bounds(), view, self.config.highlight_expansion));

            let emitted = self.sink.emit(number, &group, region);
            let released = self.sink.release(&group.synthesized);
            emitted.context(|| format!("emitting sketch {number}"))?;
            released.context(|| format!("releasing synthesized points of sketch {number}"))?;

            summary.groups += 1;
            summary.points += group.members.len() + group.counterparts.len();
            summary.synthesized += group.synthesized.len();
        }
        Ok(summary)
    }
}
