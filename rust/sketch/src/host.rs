// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capabilities consumed from the host document model.
//!
//! The planner and the converter never see a concrete document. They talk to
//! these narrow traits, so tests run against in-memory fakes.

use nalgebra::Point3;

use crate::config::AverageOptions;
use crate::error::Result;
use crate::highlight::PixelRect;
use crate::model::{
    CampaignId, GaugingPoint, LocationId, PatchKind, PatchRef, ReportId, Section, SectionId,
    SurfacePatch,
};
use crate::planner::SketchGroup;

/// Result of a point-on-surface query.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHit {
    /// Patch containing the queried position
    pub patch: PatchRef,
    /// Closest point on the patch
    pub closest: Point3<f64>,
    /// Local surface coordinates of `closest`
    pub local: [f64; 2],
}

/// Surface patches of a section and point-on-surface projection.
pub trait SurfaceLookup {
    /// Every patch of `section`.
    fn patches(&self, section: SectionId) -> Result<Vec<SurfacePatch>>;

    /// The patch of `section` containing `position` within `tolerance`.
    ///
    /// With `kind` set, only patches of that kind are considered. `Ok(None)`
    /// is a normal miss, not a failure.
    fn locate(
        &self,
        section: SectionId,
        position: &Point3<f64>,
        kind: Option<PatchKind>,
        tolerance: f64,
    ) -> Result<Option<SurfaceHit>>;
}

/// Gauging points and sections of reports.
pub trait PointSource {
    /// Sections holding points of `report`, in host order.
    fn sections(&self, report: ReportId) -> Result<Vec<Section>>;

    /// Points of `report` measured on `section`.
    fn points(&self, report: ReportId, section: SectionId) -> Result<Vec<GaugingPoint>>;

    /// Port/starboard counterpart of a section, if one is modelled.
    fn symmetric_partner(&self, section: SectionId) -> Result<Option<SectionId>>;
}

/// Receiver of finished sketch groups.
pub trait GroupSink {
    /// Renders or stores one group. `number` starts at 1.
    fn emit(&mut self, number: usize, group: &SketchGroup, region: Option<PixelRect>) -> Result<()>;

    /// Discards host objects created for synthesized points.
    ///
    /// Called once per group after [`GroupSink::emit`], whether or not the
    /// emission succeeded.
    fn release(&mut self, synthesized: &[GaugingPoint]) -> Result<()> {
        let _ = synthesized;
        Ok(())
    }
}

/// World to pixel projection of the current view.
pub trait ViewProjection {
    /// Pixel coordinates `(x, y)` of a world position.
    fn world_to_pixel(&self, point: &Point3<f64>) -> (f64, f64);
}

/// Campaign as seen by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignInfo {
    pub id: CampaignId,
    pub name: String,
    /// Only gauging campaigns can be converted
    pub is_gauging: bool,
    pub reports: Vec<ReportInfo>,
}

/// Report as seen by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInfo {
    pub id: ReportId,
    pub campaign: CampaignId,
    pub name: String,
}

/// Creation and lookup of converted campaigns and reports.
///
/// Converted items keep a link to the item they were made from, which is what
/// the duplicate guard checks.
pub trait CampaignRegistry {
    fn campaign(&self, id: CampaignId) -> Result<CampaignInfo>;

    /// Converted campaign made from `source`, if any.
    fn converted_campaign(&self, source: CampaignId) -> Result<Option<CampaignId>>;

    /// Converted report made from `source`, if any.
    fn converted_report(&self, source: ReportId) -> Result<Option<ReportId>>;

    fn create_campaign(&mut self, source: &CampaignInfo, name: &str) -> Result<CampaignId>;

    fn create_report(&mut self, campaign: CampaignId, source: &ReportInfo, name: &str) -> Result<ReportId>;
}

/// Input of one averaging step.
#[derive(Debug, Clone)]
pub struct AverageRequest<'a> {
    pub source_report: ReportId,
    pub target_report: ReportId,
    pub options: &'a AverageOptions,
    pub section: &'a Section,
    /// Symmetric partner folded into this request
    pub partner: Option<&'a Section>,
    pub points: Vec<GaugingPoint>,
    pub partner_points: Vec<GaugingPoint>,
}

/// Computes and stores averaged points.
pub trait AverageBuilder {
    /// Averaged points for one section (and its partner, if any).
    fn average(&mut self, request: &AverageRequest<'_>) -> Result<Vec<GaugingPoint>>;

    /// Highest location ID already used on `section`.
    fn max_location_id(&self, section: SectionId) -> Result<Option<LocationId>>;

    /// Persists converted points into a report.
    fn store(&mut self, report: ReportId, section: SectionId, points: Vec<GaugingPoint>) -> Result<()>;
}
