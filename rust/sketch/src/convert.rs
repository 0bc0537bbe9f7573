// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of gauging campaigns into averaged campaigns.
//!
//! A conversion creates one target campaign per source campaign and one
//! target report per source report, then averages every section that has
//! points. Longitudinal sections with a modelled port/starboard partner are
//! averaged together and the partner is not visited again.
//!
//! Converting something that was already converted, or that has no points,
//! changes nothing and is reported through [`ConversionOutcome`].
//! A failure part way through leaves whatever was already written in place.

use rustc_hash::FxHashSet;

use crate::config::SketchConfig;
use crate::error::{Error, Result, ResultExt};
use crate::host::{AverageBuilder, AverageRequest, CampaignInfo, CampaignRegistry, PointSource, ReportInfo};
use crate::model::{CampaignId, GaugingPoint, LocationId, ReportId, SectionCategory, SectionId};

/// Result of a conversion request.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted(ConvertedCampaign),
    /// The source was converted before; nothing was changed.
    AlreadyConverted { existing: ConvertedTarget },
    /// No section of the source holds points; nothing was created.
    EmptyInput,
}

/// Existing conversion found by the duplicate guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertedTarget {
    Campaign(CampaignId),
    Report(ReportId),
}

/// What a conversion created.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvertedCampaign {
    pub campaign: Option<CampaignId>,
    pub reports: Vec<ReportId>,
    pub sections: usize,
    pub points: usize,
}

/// Converts gauging campaigns and reports.
pub struct Converter<'a, R: ?Sized, P: ?Sized, A: ?Sized> {
    config: &'a SketchConfig,
    registry: &'a mut R,
    source: &'a P,
    builder: &'a mut A,
}

impl<'a, R, P, A> Converter<'a, R, P, A>
where
    R: CampaignRegistry + ?Sized,
    P: PointSource + ?Sized,
    A: AverageBuilder + ?Sized,
{
    pub fn new(config: &'a SketchConfig, registry: &'a mut R, source: &'a P, builder: &'a mut A) -> Self {
        Self {
            config,
            registry,
            source,
            builder,
        }
    }

    /// Converts every report of a campaign.
    pub fn convert_campaign(&mut self, campaign: CampaignId) -> Result<ConversionOutcome> {
        self.try_convert_campaign(campaign)
            .context(|| format!("converting {campaign}"))
    }

    /// Converts one report, reusing the converted campaign if there is one.
    pub fn convert_report(&mut self, campaign: CampaignId, report: ReportId) -> Result<ConversionOutcome> {
        self.try_convert_report(campaign, report)
            .context(|| format!("converting {report} of {campaign}"))
    }

    fn try_convert_campaign(&mut self, id: CampaignId) -> Result<ConversionOutcome> {
        let campaign = self.gauging_campaign(id)?;

        if let Some(existing) = self.registry.converted_campaign(id)? {
            tracing::info!(campaign = %campaign.name, existing = existing.0, "campaign already converted");
            return Ok(ConversionOutcome::AlreadyConverted {
                existing: ConvertedTarget::Campaign(existing),
            });
        }

        let mut sections = 0;
        for report in &campaign.reports {
            sections += self.sections_with_points(report.id)?;
        }
        if sections == 0 {
            tracing::info!(campaign = %campaign.name, "nothing to convert");
            return Ok(ConversionOutcome::EmptyInput);
        }

        tracing::info!(campaign = %campaign.name, reports = campaign.reports.len(), "converting campaign");
        let name = self.converted_name(&campaign.name);
        let target = self.registry.create_campaign(&campaign, &name)?;

        let mut summary = ConvertedCampaign {
            campaign: Some(target),
            ..ConvertedCampaign::default()
        };
        for report in &campaign.reports {
            self.convert_into(target, report, &mut summary)?;
        }

        tracing::info!(
            campaign = %campaign.name,
            sections = summary.sections,
            points = summary.points,
            "campaign converted"
        );
        Ok(ConversionOutcome::Converted(summary))
    }

    fn try_convert_report(&mut self, campaign_id: CampaignId, report_id: ReportId) -> Result<ConversionOutcome> {
        let campaign = self.gauging_campaign(campaign_id)?;
        let report = campaign
            .reports
            .iter()
            .find(|r| r.id == report_id)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidInput(format!("{report_id} does not belong to {}", campaign.name))
            })?;

        if let Some(existing) = self.registry.converted_report(report_id)? {
            tracing::info!(report = %report.name, existing = existing.0, "report already converted");
            return Ok(ConversionOutcome::AlreadyConverted {
                existing: ConvertedTarget::Report(existing),
            });
        }

        if self.sections_with_points(report_id)? == 0 {
            tracing::info!(report = %report.name, "nothing to convert");
            return Ok(ConversionOutcome::EmptyInput);
        }

        let target = match self.registry.converted_campaign(campaign_id)? {
            Some(existing) => existing,
            None => {
                let name = self.converted_name(&campaign.name);
                self.registry.create_campaign(&campaign, &name)?
            }
        };

        let mut summary = ConvertedCampaign {
            campaign: Some(target),
            ..ConvertedCampaign::default()
        };
        self.convert_into(target, &report, &mut summary)?;
        Ok(ConversionOutcome::Converted(summary))
    }

    fn gauging_campaign(&self, id: CampaignId) -> Result<CampaignInfo> {
        let campaign = self.registry.campaign(id)?;
        if !campaign.is_gauging {
            return Err(Error::InvalidInput(format!(
                "{} is not a gauging campaign",
                campaign.name
            )));
        }
        Ok(campaign)
    }

    fn sections_with_points(&self, report: ReportId) -> Result<usize> {
        let mut count = 0;
        for section in self.source.sections(report)? {
            if !self.source.points(report, section.id)?.is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn converted_name(&self, name: &str) -> String {
        format!("{} {}", self.config.converted_name_prefix, name)
    }

    /// Creates the target report and averages every section of `report`.
    fn convert_into(&mut self, campaign: CampaignId, report: &ReportInfo, summary: &mut ConvertedCampaign) -> Result<()> {
        let name = self.converted_name(&report.name);
        let target = self.registry.create_report(campaign, report, &name)?;
        summary.reports.push(target);

        let config = self.config;
        let sections = self.source.sections(report.id)?;
        let mut consumed: FxHashSet<SectionId> = FxHashSet::default();

        for section in &sections {
            if !consumed.insert(section.id) {
                continue;
            }
            let points = self.source.points(report.id, section.id)?;
            if points.is_empty() {
                continue;
            }

            let partner = match section.category {
                SectionCategory::Longitudinal => self
                    .source
                    .symmetric_partner(section.id)?
                    .and_then(|id| sections.iter().find(|s| s.id == id))
                    .filter(|p| !consumed.contains(&p.id)),
                _ => None,
            };
            let partner_points = match partner {
                Some(p) => {
                    consumed.insert(p.id);
                    self.source.points(report.id, p.id)?
                }
                None => Vec::new(),
            };

            let request = AverageRequest {
                source_report: report.id,
                target_report: target,
                options: &config.averaging,
                section,
                partner,
                points,
                partner_points,
            };
            let stored = self
                .average_section(&request)
                .context(|| format!("averaging section {}", section.name))?;

            summary.sections += 1;
            summary.points += stored;
        }
        Ok(())
    }

    fn average_section(&mut self, request: &AverageRequest<'_>) -> Result<usize> {
        let mut points = self.builder.average(request)?;
        let section = request.section.id;

        let mut next = match self.builder.max_location_id(section)? {
            Some(id) => next_location(id)?,
            None => LocationId(1),
        };
        for point in &mut points {
            assign_location(point, &mut next)?;
        }

        let count = points.len();
        tracing::debug!(section = %request.section.name, points = count, "storing averaged points");
        self.builder.store(request.target_report, section, points)?;
        Ok(count)
    }
}

fn next_location(id: LocationId) -> Result<LocationId> {
    id.0
        .checked_add(1)
        .map(LocationId)
        .ok_or_else(|| Error::InvalidInput(format!("no location ID left after {id}")))
}

/// Gives a point without a location ID the next free one, and names the
/// point after its ID.
fn assign_location(point: &mut GaugingPoint, next: &mut LocationId) -> Result<()> {
    let id = match point.location.id {
        Some(id) => id,
        None => {
            let id = *next;
            *next = next_location(id)?;
            point.location.id = Some(id);
            id
        }
    };
    point.name = id.to_string();
    Ok(())
}
