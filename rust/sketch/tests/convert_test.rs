// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Campaign and report conversion.

mod common;

use common::{deck_points, gauge, FakeBuilder, FakeHull, FakeRegistry, RecordedRequest};
use hull_sketch::{
    AverageOptions, CampaignId, CampaignRegistry, ConversionOutcome, ConvertedTarget, Converter, Error, HullSide,
    LocationId, ReportId, SectionId, SketchConfig,
};
use nalgebra::Vector3;

const CAMPAIGN: CampaignId = CampaignId(1);

fn hull() -> FakeHull {
    let mut hull = FakeHull::default();
    hull.add_section(1, "Shell PS", "Shell", Vector3::y(), Vector3::z());
    hull.add_section(2, "Shell SB", "Shell", -Vector3::y(), Vector3::z());
    hull.add_section(3, "Main deck", "MainDeck", Vector3::z(), Vector3::y());
    hull.partners.push((SectionId(1), SectionId(2)));

    hull.add_points(
        10,
        1,
        vec![
            gauge(1, 1, 1, [5.0, 10.0, 2.0], Vector3::y(), HullSide::Port, 11),
            gauge(2, 1, 2, [10.0, 10.0, 2.0], Vector3::y(), HullSide::Port, 11),
        ],
    );
    hull.add_points(
        10,
        2,
        vec![gauge(3, 2, 1, [5.0, -10.0, 2.0], -Vector3::y(), HullSide::Starboard, 21)],
    );
    hull.add_points(10, 3, deck_points(10, 3, 4, 0.0, 30.0));
    hull.add_points(11, 3, deck_points(20, 3, 3, 0.0, 30.0));
    hull
}

fn registry() -> FakeRegistry {
    FakeRegistry::with_campaign(1, "Survey 2026", true, &[(10, "Port side"), (11, "Deck")])
}

#[test]
fn campaign_is_converted_once() {
    let hull = hull();
    let config = SketchConfig::default();
    let mut registry = registry();
    let mut builder = FakeBuilder::default();

    let outcome = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_campaign(CAMPAIGN)
        .unwrap();

    let ConversionOutcome::Converted(summary) = outcome else {
        panic!("expected a conversion");
    };
    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.sections, 3);
    assert_eq!(summary.points, 10);

    let target = summary.campaign.unwrap();
    let created = registry.campaign(target).unwrap();
    assert_eq!(created.name, "Average Survey 2026");
    assert_eq!(created.reports[0].name, "Average Port side");

    // the starboard shell is averaged together with the port shell
    assert_eq!(
        builder.requests[0],
        RecordedRequest {
            section: SectionId(1),
            partner: Some(SectionId(2)),
            points: 2,
            partner_points: 1,
        }
    );
    assert_eq!(builder.requests.len(), 3);
    assert!(builder.requests.iter().all(|r| r.section != SectionId(2)));

    // second attempt changes nothing
    let writes = registry.writes;
    let stored = builder.stored.len();
    let again = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_campaign(CAMPAIGN)
        .unwrap();
    assert_eq!(
        again,
        ConversionOutcome::AlreadyConverted {
            existing: ConvertedTarget::Campaign(target),
        }
    );
    assert_eq!(registry.writes, writes);
    assert_eq!(builder.stored.len(), stored);
}

#[test]
fn report_is_converted_once_and_reuses_campaign() {
    let hull = hull();
    let config = SketchConfig::default();
    let mut registry = registry();
    let mut builder = FakeBuilder::default();

    let first = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_report(CAMPAIGN, ReportId(11))
        .unwrap();
    let ConversionOutcome::Converted(first) = first else {
        panic!("expected a conversion");
    };
    assert_eq!(first.sections, 1);

    let second = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_report(CAMPAIGN, ReportId(10))
        .unwrap();
    let ConversionOutcome::Converted(second) = second else {
        panic!("expected a conversion");
    };
    assert_eq!(second.campaign, first.campaign);
    assert_eq!(registry.campaign_links.len(), 1);

    let writes = registry.writes;
    let again = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_report(CAMPAIGN, ReportId(10))
        .unwrap();
    assert_eq!(
        again,
        ConversionOutcome::AlreadyConverted {
            existing: ConvertedTarget::Report(second.reports[0]),
        }
    );
    assert_eq!(registry.writes, writes);
}

#[test]
fn empty_campaign_creates_nothing() {
    let hull = FakeHull::default();
    let config = SketchConfig::default();
    let mut registry = registry();
    let mut builder = FakeBuilder::default();

    let outcome = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_campaign(CAMPAIGN)
        .unwrap();

    assert_eq!(outcome, ConversionOutcome::EmptyInput);
    assert_eq!(registry.writes, 0);
    assert!(builder.requests.is_empty());
}

#[test]
fn invalid_requests_are_rejected() {
    let hull = hull();
    let config = SketchConfig::default();
    let mut builder = FakeBuilder::default();

    let mut thickness_only = FakeRegistry::with_campaign(1, "Visual", false, &[(10, "R")]);
    let err = Converter::new(&config, &mut thickness_only, &hull, &mut builder)
        .convert_campaign(CAMPAIGN)
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::InvalidInput(_)));

    let mut registry = registry();
    let err = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_report(CAMPAIGN, ReportId(99))
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::InvalidInput(_)));
    assert_eq!(registry.writes, 0);
}

#[test]
fn averaged_points_get_free_location_ids() {
    let hull = hull();
    let config = SketchConfig::default();
    let mut registry = registry();
    let mut builder = FakeBuilder::default();
    builder.max_ids.insert(SectionId(1), LocationId(40));

    Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_report(CAMPAIGN, ReportId(10))
        .unwrap();

    let (_, section, points) = &builder.stored[0];
    assert_eq!(*section, SectionId(1));
    let ids: Vec<_> = points.iter().map(|p| p.location.id).collect();
    assert_eq!(ids, vec![Some(LocationId(1)), Some(LocationId(2)), Some(LocationId(41))]);
    let names: Vec<_> = points.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["1", "2", "41"]);
}

#[test]
fn section_failure_names_the_section() {
    let hull = hull();
    let config = SketchConfig::default();
    let mut registry = registry();
    let mut builder = FakeBuilder {
        fail_section: Some(SectionId(3)),
        ..FakeBuilder::default()
    };

    let err = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_campaign(CAMPAIGN)
        .unwrap_err();

    assert!(matches!(err.root_cause(), Error::Host(_)));
    let Error::Context { source, .. } = &err else {
        panic!("expected context");
    };
    assert_eq!(source.to_string(), "averaging section Main deck");
    // the shell pair was written before the failure and stays
    assert_eq!(builder.stored.len(), 1);
}

#[test]
fn averaging_options_reach_the_builder() {
    let hull = hull();
    let config = SketchConfig {
        averaging: AverageOptions {
            average: false,
            average_on_stiffeners: true,
            convergence_tolerance: 0.25,
            stiffener_grouping_length: 4.5,
        },
        ..SketchConfig::default()
    };
    let mut registry = registry();
    let mut builder = FakeBuilder::default();

    Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_campaign(CAMPAIGN)
        .unwrap();

    assert_eq!(builder.options.len(), 3);
    assert!(builder.options.iter().all(|o| *o == config.averaging));
    assert_eq!(builder.options[0].effective_tolerance(), 0.0);
}

#[test]
fn exhausted_location_ids_fail_the_section() {
    let hull = hull();
    let config = SketchConfig::default();
    let mut registry = registry();
    let mut builder = FakeBuilder::default();
    builder.max_ids.insert(SectionId(1), LocationId(u32::MAX));

    let err = Converter::new(&config, &mut registry, &hull, &mut builder)
        .convert_report(CAMPAIGN, ReportId(10))
        .unwrap_err();

    assert!(matches!(err.root_cause(), Error::InvalidInput(_)));
    assert!(builder.stored.is_empty());
}
