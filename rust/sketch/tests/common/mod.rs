// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory host model shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use hull_sketch::geometry::BoundingBox;
use hull_sketch::{
    AverageBuilder, AverageOptions, AverageRequest, CampaignId, CampaignInfo, CampaignRegistry, Error, GaugingPoint,
    GroupSink, HullSide, LocationId, PatchId, PatchKind, PatchRef, PixelRect, PointId, PointSource,
    ReportId, ReportInfo, Result, Section, SectionId, SketchGroup, SurfaceHit, SurfaceLookup,
    SurfacePatch, ViewProjection,
};
use nalgebra::{Point3, Vector3};

/// Sections, plates and points of a small hull.
#[derive(Debug, Default)]
pub struct FakeHull {
    pub sections: Vec<Section>,
    pub patches: Vec<SurfacePatch>,
    pub points: BTreeMap<(ReportId, SectionId), Vec<GaugingPoint>>,
    pub partners: Vec<(SectionId, SectionId)>,
}

impl FakeHull {
    pub fn add_section(&mut self, id: u32, name: &str, type_name: &str, normal: Vector3<f64>, up: Vector3<f64>) {
        self.sections
            .push(Section::new(SectionId(id), name, type_name, normal, up).unwrap());
    }

    pub fn section(&self, id: u32) -> Section {
        self.sections
            .iter()
            .find(|s| s.id == SectionId(id))
            .cloned()
            .unwrap()
    }

    pub fn add_points(&mut self, report: u32, section: u32, points: Vec<GaugingPoint>) {
        self.points
            .entry((ReportId(report), SectionId(section)))
            .or_default()
            .extend(points);
    }

    pub fn points_of(&self, report: u32, section: u32) -> Vec<GaugingPoint> {
        self.points
            .get(&(ReportId(report), SectionId(section)))
            .cloned()
            .unwrap_or_default()
    }
}

impl SurfaceLookup for FakeHull {
    fn patches(&self, section: SectionId) -> Result<Vec<SurfacePatch>> {
        Ok(self
            .patches
            .iter()
            .filter(|p| p.section == section)
            .cloned()
            .collect())
    }

    fn locate(
        &self,
        section: SectionId,
        position: &Point3<f64>,
        kind: Option<PatchKind>,
        tolerance: f64,
    ) -> Result<Option<SurfaceHit>> {
        Ok(self
            .patches
            .iter()
            .filter(|p| p.section == section && kind.map_or(true, |k| k == p.kind))
            .find(|p| p.bounds.padded(tolerance).contains(position))
            .map(|p| SurfaceHit {
                patch: PatchRef { id: p.id, kind: p.kind },
                closest: *position,
                local: [position.x - p.bounds.min.x, position.z - p.bounds.min.z],
            }))
    }
}

impl PointSource for FakeHull {
    fn sections(&self, report: ReportId) -> Result<Vec<Section>> {
        Ok(self
            .sections
            .iter()
            .filter(|s| self.points.contains_key(&(report, s.id)))
            .cloned()
            .collect())
    }

    fn points(&self, report: ReportId, section: SectionId) -> Result<Vec<GaugingPoint>> {
        Ok(self.points.get(&(report, section)).cloned().unwrap_or_default())
    }

    fn symmetric_partner(&self, section: SectionId) -> Result<Option<SectionId>> {
        Ok(self.partners.iter().find_map(|&(a, b)| {
            if a == section {
                Some(b)
            } else if b == section {
                Some(a)
            } else {
                None
            }
        }))
    }
}

/// A plate spanning `min..max` with the given face normal.
pub fn plate(id: u32, section: u32, min: [f64; 3], max: [f64; 3], normal: Vector3<f64>) -> SurfacePatch {
    let bounds = BoundingBox::from_corners(Point3::from(min), Point3::from(max));
    SurfacePatch {
        id: PatchId(id),
        section: SectionId(section),
        kind: PatchKind::Plate,
        centroid: bounds.center(),
        normal,
        bounds,
    }
}

/// A gauging point with a location ID, side and mounting plate.
pub fn gauge(
    id: u64,
    section: u32,
    location: u32,
    position: [f64; 3],
    normal: Vector3<f64>,
    side: HullSide,
    patch: u32,
) -> GaugingPoint {
    GaugingPoint::new(PointId(id), SectionId(section), Point3::from(position), normal)
        .with_location_id(location)
        .with_side(side)
        .with_target(PatchId(patch), PatchKind::Plate)
        .with_thickness(10.0 + location as f64 / 10.0)
}

/// Deck points spread evenly over `x0..x1`.
pub fn deck_points(first_id: u64, section: u32, count: usize, x0: f64, x1: f64) -> Vec<GaugingPoint> {
    (0..count)
        .map(|i| {
            let x = x0 + (x1 - x0) * i as f64 / (count - 1) as f64;
            gauge(
                first_id + i as u64,
                section,
                i as u32 + 1,
                [x, 3.0, 20.0],
                Vector3::z(),
                HullSide::Port,
                1,
            )
        })
        .collect()
}

/// Sink recording every emitted group.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub emitted: Vec<(usize, SketchGroup, Option<PixelRect>)>,
    pub released: Vec<usize>,
    pub fail_on: Option<usize>,
}

impl GroupSink for RecordingSink {
    fn emit(&mut self, number: usize, group: &SketchGroup, region: Option<PixelRect>) -> Result<()> {
        if self.fail_on == Some(number) {
            return Err(Error::Host(format!("renderer failed on sketch {number}")));
        }
        self.emitted.push((number, group.clone(), region));
        Ok(())
    }

    fn release(&mut self, synthesized: &[GaugingPoint]) -> Result<()> {
        self.released.push(synthesized.len());
        Ok(())
    }
}

/// Side view looking along +Y, 2 pixels per unit, y up.
pub struct SideView;

impl ViewProjection for SideView {
    fn world_to_pixel(&self, p: &Point3<f64>) -> (f64, f64) {
        (p.x * 2.0, 1000.0 - p.z * 2.0)
    }
}

/// Campaign registry keeping converted links in memory.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    pub campaigns: Vec<CampaignInfo>,
    pub campaign_links: Vec<(CampaignId, CampaignId)>,
    pub report_links: Vec<(ReportId, ReportId)>,
    pub writes: usize,
    next_id: u32,
}

impl FakeRegistry {
    pub fn with_campaign(id: u32, name: &str, is_gauging: bool, reports: &[(u32, &str)]) -> Self {
        let id = CampaignId(id);
        let campaign = CampaignInfo {
            id,
            name: name.to_string(),
            is_gauging,
            reports: reports
                .iter()
                .map(|&(r, n)| ReportInfo {
                    id: ReportId(r),
                    campaign: id,
                    name: n.to_string(),
                })
                .collect(),
        };
        Self {
            campaigns: vec![campaign],
            next_id: 1000,
            ..Self::default()
        }
    }
}

impl CampaignRegistry for FakeRegistry {
    fn campaign(&self, id: CampaignId) -> Result<CampaignInfo> {
        self.campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Error::Host(format!("no {id}")))
    }

    fn converted_campaign(&self, source: CampaignId) -> Result<Option<CampaignId>> {
        Ok(self
            .campaign_links
            .iter()
            .find(|(s, _)| *s == source)
            .map(|&(_, t)| t))
    }

    fn converted_report(&self, source: ReportId) -> Result<Option<ReportId>> {
        Ok(self
            .report_links
            .iter()
            .find(|(s, _)| *s == source)
            .map(|&(_, t)| t))
    }

    fn create_campaign(&mut self, source: &CampaignInfo, name: &str) -> Result<CampaignId> {
        self.next_id += 1;
        let id = CampaignId(self.next_id);
        self.campaigns.push(CampaignInfo {
            id,
            name: name.to_string(),
            is_gauging: false,
            reports: Vec::new(),
        });
        self.campaign_links.push((source.id, id));
        self.writes += 1;
        Ok(id)
    }

    fn create_report(&mut self, campaign: CampaignId, source: &ReportInfo, name: &str) -> Result<ReportId> {
        self.next_id += 1;
        let id = ReportId(self.next_id);
        let target = self
            .campaigns
            .iter_mut()
            .find(|c| c.id == campaign)
            .ok_or_else(|| Error::Host(format!("no {campaign}")))?;
        target.reports.push(ReportInfo {
            id,
            campaign,
            name: name.to_string(),
        });
        self.report_links.push((source.id, id));
        self.writes += 1;
        Ok(id)
    }
}

/// One recorded averaging request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub section: SectionId,
    pub partner: Option<SectionId>,
    pub points: usize,
    pub partner_points: usize,
}

/// Averaging collaborator that returns one point per input point, dropping
/// location IDs of starboard points to exercise ID assignment.
#[derive(Debug, Default)]
pub struct FakeBuilder {
    pub max_ids: BTreeMap<SectionId, LocationId>,
    pub requests: Vec<RecordedRequest>,
    pub stored: Vec<(ReportId, SectionId, Vec<GaugingPoint>)>,
    pub options: Vec<AverageOptions>,
    pub fail_section: Option<SectionId>,
}

impl AverageBuilder for FakeBuilder {
    fn average(&mut self, request: &AverageRequest<'_>) -> Result<Vec<GaugingPoint>> {
        if self.fail_section == Some(request.section.id) {
            return Err(Error::Host("averaging failed".into()));
        }
        self.options.push(request.options.clone());
        self.requests.push(RecordedRequest {
            section: request.section.id,
            partner: request.partner.map(|p| p.id),
            points: request.points.len(),
            partner_points: request.partner_points.len(),
        });
        Ok(request
            .points
            .iter()
            .chain(&request.partner_points)
            .cloned()
            .map(|mut p| {
                if p.location.side == Some(HullSide::Starboard) {
                    p.location.id = None;
                }
                p.section = request.section.id;
                p
            })
            .collect())
    }

    fn max_location_id(&self, section: SectionId) -> Result<Option<LocationId>> {
        Ok(self.max_ids.get(&section).copied())
    }

    fn store(&mut self, report: ReportId, section: SectionId, points: Vec<GaugingPoint>) -> Result<()> {
        self.stored.push((report, section, points));
        Ok(())
    }
}
