// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Hull Sketch
//!
//! Partitions hull thickness gauging points into sketch groups for visual
//! reporting.
//!
//! Points of a structural section are cut into bands along the hull's
//! longitudinal axis (or kept as a single group, depending on the section
//! category). Where two mirrored sides meet in one group, points missing on
//! the drawn side are mirrored across the symmetry plane so every sketch is
//! complete. Each group carries the surface patches to draw with it.
//!
//! The host document model stays outside this crate; it is reached through
//! the capability traits in [`host`].
//!
//! ```no_run
//! use hull_sketch::{SketchConfig, SketchPlanner};
//! # fn demo(lookup: &dyn hull_sketch::SurfaceLookup, section: &hull_sketch::Section) -> hull_sketch::Result<()> {
//! let config = SketchConfig::from_env();
//! let mut planner = SketchPlanner::new(&config, lookup)?;
//! let groups = planner.plan_section(section, Vec::new())?;
//! assert!(groups.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod arena;
pub mod config;
pub mod convert;
pub mod error;
pub mod highlight;
pub mod host;
pub mod keys;
pub mod model;
pub mod partition;
pub mod planner;
pub mod reconcile;
pub mod session;
pub mod strategy;

pub use arena::{average_normal, LocationIndex, PointArena};
pub use config::{AverageOptions, BoundaryPolicy, SketchConfig, SourceSide, MIN_BAND_WIDTH};
pub use convert::{ConversionOutcome, ConvertedCampaign, ConvertedTarget, Converter};
pub use error::{Error, Result, ResultExt};
pub use highlight::{highlight_region, PixelRect};
pub use host::{
    AverageBuilder, AverageRequest, CampaignInfo, CampaignRegistry, GroupSink, PointSource,
    ReportInfo, SurfaceHit, SurfaceLookup, ViewProjection,
};
pub use keys::PointKey;
pub use model::{
    parse_column, CampaignId, GaugingPoint, HullSide, LocationId, LocationKey, PatchId, PatchKind,
    PatchRef, PointId, ReportId, ReportLocation, Section, SectionCategory, SectionId, SurfacePatch,
};
pub use partition::{Band, BandAssignment, BandLayout, Partitioner, MAX_BAND_COUNT};
pub use planner::{SketchGroup, SketchPlanner};
pub use reconcile::{MirrorFrame, MirrorMode, Reconciler, Reconciliation};
pub use session::{SketchSession, SketchSummary};
pub use strategy::{PatchContext, SketchPolicy};

pub use hull_sketch_geometry as geometry;
