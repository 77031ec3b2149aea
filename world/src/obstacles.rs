//! Obstacle geometry and footprint construction.

use std::{
    collections::BTreeSet,
    f64::consts::{FRAC_PI_4, PI, TAU},
};

use mission_control_core::{
    Coordinate, Direction, GeometryError, ObstacleError, ObstacleKind, ObstacleSpec,
    RangeParameter,
};
use rand::Rng;

/// Movement cost charged for leaving a cell no cost-bearing obstacle claims.
pub const DEFAULT_MOVEMENT_COST: u32 = 1;

/// Largest range accepted for sensors, spotlights and quicksand.
pub const MAX_RANGE: f64 = 1_000.0;

/// Radius of the disk lit by a spotlight around the end of its beam.
const SPOTLIGHT_RADIUS: f64 = 2.0;

/// Set of map cells claimed by an obstacle.
#[derive(Clone, Debug, PartialEq)]
pub enum Footprint {
    /// Finite footprint enumerated once at construction.
    Cells(BTreeSet<Coordinate>),
    /// Unbounded vision cone tested on demand.
    Cone(VisionCone),
}

impl Footprint {
    /// Reports whether the footprint claims the provided cell.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        match self {
            Self::Cells(cells) => cells.contains(&cell),
            Self::Cone(cone) => cone.contains(cell),
        }
    }

    /// Enumerated cells of a finite footprint; `None` for cones.
    #[must_use]
    pub fn finite_cells(&self) -> Option<&BTreeSet<Coordinate>> {
        match self {
            Self::Cells(cells) => Some(cells),
            Self::Cone(_) => None,
        }
    }
}

/// Cone of vision with a 45 degree half-angle and unlimited reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisionCone {
    origin: Coordinate,
    facing: Direction,
}

impl VisionCone {
    /// Half-angle of the cone measured from the facing direction.
    pub const HALF_ANGLE: f64 = FRAC_PI_4;

    /// Creates a cone anchored at `origin` looking toward `facing`.
    #[must_use]
    pub const fn new(origin: Coordinate, facing: Direction) -> Self {
        Self { origin, facing }
    }

    /// Cell the cone is anchored on.
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Direction the cone faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Reports whether the cell is the anchor or falls inside the cone.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        if cell == self.origin {
            return true;
        }

        let dx = f64::from(cell.x()) - f64::from(self.origin.x());
        let dy = f64::from(cell.y()) - f64::from(self.origin.y());
        let heading = self.facing.unit();
        let to_cell = dy.atan2(dx);
        let to_heading = f64::from(heading.y()).atan2(f64::from(heading.x()));

        let mut delta = to_cell - to_heading;
        while delta > PI {
            delta -= TAU;
        }
        while delta <= -PI {
            delta += TAU;
        }

        delta.abs() <= Self::HALF_ANGLE
    }
}

/// Stationary obstacle with an immutable footprint.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    kind: ObstacleKind,
    origin: Coordinate,
    footprint: Footprint,
    movement_cost: u32,
}

impl Obstacle {
    /// Builds the obstacle described by `spec`, drawing randomness from `rng`.
    ///
    /// Only quicksand consumes randomness; every other kind is deterministic.
    pub fn from_spec<R>(spec: ObstacleSpec, rng: &mut R) -> Result<Self, ObstacleError>
    where
        R: Rng + ?Sized,
    {
        match spec {
            ObstacleSpec::Guard { position } => Ok(Self::guard(position)),
            ObstacleSpec::Fence { start, end } => Self::fence(start, end),
            ObstacleSpec::Sensor { position, range } => Self::sensor(position, range),
            ObstacleSpec::Camera { position, facing } => Ok(Self::camera(position, facing)),
            ObstacleSpec::Spotlight {
                position,
                facing,
                range,
            } => Self::spotlight(position, facing, range),
            ObstacleSpec::Quicksand {
                origin,
                range,
                depth,
            } => Self::quicksand(origin, range, depth, rng),
        }
    }

    /// Guard standing on a single cell.
    #[must_use]
    pub fn guard(position: Coordinate) -> Self {
        Self::enumerated(ObstacleKind::Guard, position, BTreeSet::from([position]))
    }

    /// Fence covering every cell between two axis-aligned endpoints.
    pub fn fence(start: Coordinate, end: Coordinate) -> Result<Self, ObstacleError> {
        if start == end {
            return Err(GeometryError::Degenerate.into());
        }

        let cells: BTreeSet<Coordinate> = if start.x() == end.x() {
            (start.y().min(end.y())..=start.y().max(end.y()))
                .map(|y| Coordinate::new(start.x(), y))
                .collect()
        } else if start.y() == end.y() {
            (start.x().min(end.x())..=start.x().max(end.x()))
                .map(|x| Coordinate::new(x, start.y()))
                .collect()
        } else {
            return Err(GeometryError::NotAxisAligned.into());
        };

        Ok(Self::enumerated(ObstacleKind::Fence, start, cells))
    }

    /// Sensor detecting every cell within `range` of its mount.
    pub fn sensor(position: Coordinate, range: f64) -> Result<Self, ObstacleError> {
        let range = validate_range(range)?;
        let half_side = range.trunc() as i32;
        let cells = disk(position, range, half_side).collect();
        Ok(Self::enumerated(ObstacleKind::Sensor, position, cells))
    }

    /// Camera watching an unbounded cone in front of its mount.
    #[must_use]
    pub fn camera(position: Coordinate, facing: Direction) -> Self {
        Self {
            kind: ObstacleKind::Camera,
            origin: position,
            footprint: Footprint::Cone(VisionCone::new(position, facing)),
            movement_cost: DEFAULT_MOVEMENT_COST,
        }
    }

    /// Spotlight lighting a small disk `range` cells ahead of its mount.
    pub fn spotlight(
        position: Coordinate,
        facing: Direction,
        range: f64,
    ) -> Result<Self, ObstacleError> {
        let range = validate_range(range)?;
        let centre = facing
            .unit()
            .checked_scaled(range.round() as i32)
            .and_then(|beam| position.checked_add(beam))
            .ok_or(GeometryError::OffPlane)?;

        let mut cells: BTreeSet<Coordinate> =
            disk(centre, SPOTLIGHT_RADIUS, SPOTLIGHT_RADIUS as i32).collect();
        let _ = cells.insert(position);

        Ok(Self::enumerated(ObstacleKind::Spotlight, position, cells))
    }

    /// Quicksand splattered around `origin`, denser toward the centre.
    ///
    /// Each cell within `range` survives with probability
    /// `1 - distance / (round(range) + 1)`, so the origin is always kept. The
    /// draw happens once here; the footprint never changes afterwards. Wading
    /// out of a quicksand cell costs `round(depth)`, never less than one.
    pub fn quicksand<R>(
        origin: Coordinate,
        range: f64,
        depth: f64,
        rng: &mut R,
    ) -> Result<Self, ObstacleError>
    where
        R: Rng + ?Sized,
    {
        let range = validate_range(range)?;
        let depth = validate_positive(RangeParameter::Depth, depth)?;

        let half_side = range.round() as i32;
        let falloff = f64::from(half_side) + 1.0;
        let cells = disk(origin, range, half_side)
            .filter(|cell| {
                let probability = 1.0 - cell.distance_to(origin) / falloff;
                rng.gen::<f64>() < probability
            })
            .collect();

        Ok(Self {
            kind: ObstacleKind::Quicksand,
            origin,
            footprint: Footprint::Cells(cells),
            movement_cost: (depth.round() as u32).max(DEFAULT_MOVEMENT_COST),
        })
    }

    fn enumerated(kind: ObstacleKind, origin: Coordinate, cells: BTreeSet<Coordinate>) -> Self {
        Self {
            kind,
            origin,
            footprint: Footprint::Cells(cells),
            movement_cost: DEFAULT_MOVEMENT_COST,
        }
    }

    /// Kind of the obstacle.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.kind
    }

    /// Anchor cell the obstacle was placed on.
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Cells claimed by the obstacle.
    #[must_use]
    pub const fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Reports whether the obstacle claims the provided cell.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        self.footprint.contains(cell)
    }

    /// Whether the obstacle makes its footprint impassable.
    #[must_use]
    pub const fn blocks_movement(&self) -> bool {
        self.kind.blocks_movement()
    }

    /// Cost charged for leaving a cell claimed by the obstacle.
    #[must_use]
    pub const fn movement_cost(&self) -> u32 {
        self.movement_cost
    }

    /// Character drawn for cells claimed by the obstacle.
    #[must_use]
    pub const fn display_code(&self) -> char {
        self.kind.display_code()
    }

    /// Human-readable name of the obstacle's kind.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.kind.display_name()
    }

    /// Menu position of the obstacle's kind.
    #[must_use]
    pub const fn menu_priority(&self) -> u8 {
        self.kind.menu_priority()
    }
}

fn validate_positive(parameter: RangeParameter, value: f64) -> Result<f64, ObstacleError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ObstacleError::InvalidRange { parameter, value })
    }
}

fn validate_range(value: f64) -> Result<f64, ObstacleError> {
    let range = validate_positive(RangeParameter::Range, value)?;
    if range > MAX_RANGE {
        return Err(ObstacleError::RangeTooLarge {
            parameter: RangeParameter::Range,
            value,
            limit: MAX_RANGE,
        });
    }
    Ok(range)
}

/// Cells of the `(2 * half_side + 1)` box around `centre` within `radius`.
fn disk(centre: Coordinate, radius: f64, half_side: i32) -> impl Iterator<Item = Coordinate> {
    (-half_side..=half_side)
        .flat_map(move |dx| (-half_side..=half_side).map(move |dy| Coordinate::new(dx, dy)))
        .filter(move |offset| offset.length() <= radius)
        .filter_map(move |offset| centre.checked_add(offset))
}
