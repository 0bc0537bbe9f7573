// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain model: sections, surface patches and gauging points.
//!
//! These are plain values copied out of the host document. The planner never
//! holds references into the host model; everything it needs travels in
//! these structs.

use std::fmt;
use std::str::FromStr;

use hull_sketch_geometry::BoundingBox;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a gauging point.
///
/// Synthesized (mirrored) points carry the high bit so they can never collide
/// with identifiers handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub u64);

impl PointId {
    const SYNTHETIC_BIT: u64 = 1 << 63;

    /// Identifier for the `seq`-th synthesized point.
    pub fn synthetic(seq: u64) -> Self {
        PointId(Self::SYNTHETIC_BIT | seq)
    }

    pub fn is_synthetic(self) -> bool {
        self.0 & Self::SYNTHETIC_BIT != 0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "~{}", self.0 & !Self::SYNTHETIC_BIT)
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Identifier of a surface patch (plate, stiffener, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(pub u32);

/// Identifier of a structural section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub u32);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section {}", self.0)
    }
}

/// Identifier of an inspection campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CampaignId(pub u32);

/// Identifier of a report within a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportId(pub u32);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "campaign {}", self.0)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "report {}", self.0)
    }
}

/// Cross-reference identifier linking a point to a report location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port or starboard side of the hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullSide {
    Port,
    Starboard,
}

impl HullSide {
    /// The opposite side.
    pub fn opposite(self) -> Self {
        match self {
            HullSide::Port => HullSide::Starboard,
            HullSide::Starboard => HullSide::Port,
        }
    }
}

/// Kind of structural surface a patch represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchKind {
    Plate,
    Stiffener,
    Bracket,
    Other,
}

/// Reference to the patch a point was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchRef {
    pub id: PatchId,
    pub kind: PatchKind,
}

/// Reporting attributes of a gauging point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportLocation {
    /// Cross-reference ID (`None` when the host has not assigned one)
    pub id: Option<LocationId>,
    /// Report table column, cleared on synthesized points
    pub column: Option<i32>,
    /// Strake label
    pub strake: Option<String>,
    /// Port/starboard flag
    pub side: Option<HullSide>,
    /// Forward/aft flag: `true` for forward
    pub forward: bool,
}

/// Key identifying one physical inspection location on one side.
///
/// Two points with the same key represent the same location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub id: LocationId,
    pub forward: bool,
}

/// A hull thickness measurement location.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugingPoint {
    pub id: PointId,
    pub section: SectionId,
    /// Position; `None` for points the host could not place
    pub position: Option<Point3<f64>>,
    pub normal: Vector3<f64>,
    pub location: ReportLocation,
    /// Patch the measurement was taken on
    pub target: Option<PatchRef>,
    /// Measured thickness
    pub thickness: Option<f64>,
    pub name: String,
}

impl GaugingPoint {
    /// A point at `position` with no reporting attributes.
    pub fn new(id: PointId, section: SectionId, position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            id,
            section,
            position: Some(position),
            normal,
            location: ReportLocation::default(),
            target: None,
            thickness: None,
            name: String::new(),
        }
    }

    pub fn with_location_id(mut self, id: u32) -> Self {
        self.location.id = Some(LocationId(id));
        self
    }

    pub fn with_side(mut self, side: HullSide) -> Self {
        self.location.side = Some(side);
        self
    }

    pub fn with_forward(mut self, forward: bool) -> Self {
        self.location.forward = forward;
        self
    }

    pub fn with_target(mut self, id: PatchId, kind: PatchKind) -> Self {
        self.target = Some(PatchRef { id, kind });
        self
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = Some(thickness);
        self
    }

    /// `true` for transient mirrored points.
    pub fn is_synthesized(&self) -> bool {
        self.id.is_synthetic()
    }

    /// Matching key, or `None` without a location ID.
    pub fn location_key(&self) -> Option<LocationKey> {
        self.location.id.map(|id| LocationKey {
            id,
            forward: self.location.forward,
        })
    }

    /// Matching key, failing when the location ID is absent.
    pub fn require_location_key(&self) -> Result<LocationKey> {
        self.location_key()
            .ok_or(Error::MissingLocationId { point: self.id })
    }
}

/// A structural surface patch (e.g. a hull plate).
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePatch {
    pub id: PatchId,
    pub section: SectionId,
    pub kind: PatchKind,
    pub centroid: Point3<f64>,
    /// Face normal (not necessarily unit length)
    pub normal: Vector3<f64>,
    pub bounds: BoundingBox,
}

/// Partitioning policy family of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionCategory {
    /// Web frames and transverse bulkheads
    Transverse,
    /// Decks and bottoms
    Deck,
    /// Shell and longitudinal bulkheads
    Longitudinal,
    /// Anything else
    Generic,
}

/// Host section type names and their category.
const SECTION_TYPES: &[(&str, SectionCategory)] = &[
    ("WebFrames", SectionCategory::Transverse),
    ("TransverseBulkheads", SectionCategory::Transverse),
    ("TransverseCentralBulkheads", SectionCategory::Transverse),
    ("SwashBulkheads", SectionCategory::Transverse),
    ("MainDeck", SectionCategory::Deck),
    ("OtherDecks", SectionCategory::Deck),
    ("InnerBottom", SectionCategory::Deck),
    ("Bottom", SectionCategory::Deck),
    ("Shell", SectionCategory::Longitudinal),
    ("Longitudinal", SectionCategory::Longitudinal),
    ("LongitudinalBulkheads", SectionCategory::Longitudinal),
    ("LongitudinalCentralBulkheads", SectionCategory::Longitudinal),
    ("AnyOtherSection", SectionCategory::Generic),
];

impl SectionCategory {
    /// Category of a host section type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        SECTION_TYPES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionCategory::Transverse => "Transverse",
            SectionCategory::Deck => "Deck",
            SectionCategory::Longitudinal => "Longitudinal",
            SectionCategory::Generic => "Generic",
        }
    }
}

impl FromStr for SectionCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_type_name(s).ok_or_else(|| Error::UnknownSectionType(s.to_string()))
    }
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural section of the hull.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub type_name: String,
    pub category: SectionCategory,
    /// Viewing normal of the section
    pub normal: Vector3<f64>,
    /// Up direction of the section view
    pub up: Vector3<f64>,
}

impl Section {
    /// Builds a section, resolving its category from the host type name.
    pub fn new(
        id: SectionId,
        name: impl Into<String>,
        type_name: impl Into<String>,
        normal: Vector3<f64>,
        up: Vector3<f64>,
    ) -> Result<Self> {
        let type_name = type_name.into();
        let category = type_name.parse()?;
        Ok(Self {
            id,
            name: name.into(),
            type_name,
            category,
            normal,
            up,
        })
    }

    /// Normal of the plane that splits the section into two halves,
    /// `normal × up`. Points on its positive side form the front half.
    pub fn splitting_normal(&self) -> Vector3<f64> {
        self.normal.cross(&self.up)
    }
}

/// Splits a report column label such as `"12A"` into `(12, "A")`.
///
/// Digits and `-` form the column number; every other character goes to the
/// complement, in order.
pub fn parse_column(label: &str) -> Result<(i32, String)> {
    let (digits, complement): (String, String) = label
        .chars()
        .partition(|c| c.is_ascii_digit() || *c == '-');

    let column = digits
        .parse::<i32>()
        .map_err(|e| Error::InvalidInput(format!("column label {label:?}: {e}")))?;

    Ok((column, complement))
}
