#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mission Control engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing obstacles to place, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values describing the outcome.
//! Systems answer queries (safe directions, shortest paths) from immutable
//! borrows of the world's obstacle registry and never mutate it.

use std::{
    fmt,
    ops::{Add, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that an obstacle be constructed and appended to the registry.
    PlaceObstacle {
        /// Geometric parameters of the obstacle to construct.
        spec: ObstacleSpec,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that an obstacle was appended to the registry.
    ObstaclePlaced {
        /// Handle allocated to the obstacle by the registry.
        obstacle: ObstacleId,
        /// Kind of obstacle that was placed.
        kind: ObstacleKind,
    },
    /// Reports that an obstacle specification failed validation.
    ObstaclePlacementRejected {
        /// Kind of obstacle requested for placement.
        kind: ObstacleKind,
        /// Specific reason the construction failed.
        reason: ObstacleError,
    },
}

/// Immutable integer point on the tactical map.
///
/// The Y axis grows southward, so North is `y - 1` and South is `y + 1`.
/// Coordinates double as vectors for the geometry helpers used by obstacle
/// footprints.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Origin of the coordinate system.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the coordinate; grows eastward.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the coordinate; grows southward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Reports whether both fields match the other coordinate.
    #[must_use]
    pub const fn equals(&self, other: Coordinate) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Reports whether `other` lies on a strict diagonal from this coordinate.
    #[must_use]
    pub fn is_diagonal_from(&self, other: Coordinate) -> bool {
        let column_diff = self.x.abs_diff(other.x);
        let row_diff = self.y.abs_diff(other.y);
        column_diff == row_diff && column_diff != 0
    }

    /// Euclidean magnitude of the vector from the origin to this coordinate.
    #[must_use]
    pub fn length(&self) -> f64 {
        f64::from(self.x).hypot(f64::from(self.y))
    }

    /// Euclidean distance between two coordinates.
    #[must_use]
    pub fn distance_to(&self, other: Coordinate) -> f64 {
        (f64::from(other.x) - f64::from(self.x)).hypot(f64::from(other.y) - f64::from(self.y))
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(&self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Dot product of the two coordinates treated as vectors.
    #[must_use]
    pub fn dot(&self, other: Coordinate) -> i64 {
        i64::from(self.x) * i64::from(other.x) + i64::from(self.y) * i64::from(other.y)
    }

    /// Multiplies both components by the provided factor.
    #[must_use]
    pub const fn scaled(&self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Multiplies both components, returning `None` on overflow.
    #[must_use]
    pub fn checked_scaled(&self, factor: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_mul(factor)?,
            self.y.checked_mul(factor)?,
        ))
    }

    /// Component-wise sum, returning `None` when it leaves the `i32` plane.
    #[must_use]
    pub fn checked_add(&self, other: Coordinate) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(other.x)?,
            self.y.checked_add(other.y)?,
        ))
    }

    /// Neighbouring coordinate one step in the provided direction.
    ///
    /// # Panics
    ///
    /// Overflows on the edge of the `i32` plane; use
    /// [`Coordinate::checked_step`] where that edge is reachable.
    #[must_use]
    pub fn step(&self, direction: Direction) -> Self {
        *self + direction.unit()
    }

    /// Neighbouring coordinate, or `None` past the edge of the `i32` plane.
    #[must_use]
    pub fn checked_step(&self, direction: Direction) -> Option<Self> {
        self.checked_add(direction.unit())
    }

    /// Converts the coordinate into an `[x, y]` array.
    #[must_use]
    pub const fn to_array(&self) -> [i32; 2] {
        [self.x, self.y]
    }
}

impl Add for Coordinate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coordinate {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    /// Parses the `X,Y` notation used by adapters.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (x, y) = value
            .trim()
            .split_once(',')
            .ok_or_else(|| ParseCoordinateError::MissingSeparator(value.to_owned()))?;
        if y.contains(',') {
            return Err(ParseCoordinateError::MissingSeparator(value.to_owned()));
        }

        let x = x
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseCoordinateError::InvalidComponent(x.trim().to_owned()))?;
        let y = y
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseCoordinateError::InvalidComponent(y.trim().to_owned()))?;

        Ok(Self::new(x, y))
    }
}

/// Cardinal directions an agent may step in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in canonical reporting order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Unit vector pointing in the direction.
    #[must_use]
    pub const fn unit(self) -> Coordinate {
        match self {
            Self::North => Coordinate::new(0, -1),
            Self::South => Coordinate::new(0, 1),
            Self::East => Coordinate::new(1, 0),
            Self::West => Coordinate::new(-1, 0),
        }
    }

    /// Upper-case letter used when printing routes and direction sets.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::North => 'N',
            Self::South => 'S',
            Self::East => 'E',
            Self::West => 'W',
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`, if any.
    #[must_use]
    pub fn between(from: Coordinate, to: Coordinate) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| from.checked_step(*direction) == Some(to))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "n" => Ok(Self::North),
            "s" => Ok(Self::South),
            "e" => Ok(Self::East),
            "w" => Ok(Self::West),
            _ => Err(ParseDirectionError(value.to_owned())),
        }
    }
}

/// Handle referencing an obstacle stored inside the registry.
///
/// Handles are allocated sequentially and never reused because the registry
/// is append-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed set of obstacle kinds that can be placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Single stationary guard.
    Guard,
    /// Straight horizontal or vertical fence.
    Fence,
    /// Detection disk that does not impede movement.
    Sensor,
    /// Fixed camera watching an infinite cone.
    Camera,
    /// Spotlight illuminating a disk some distance ahead of its mount.
    Spotlight,
    /// Randomly splattered traversable quicksand.
    Quicksand,
}

/// Display and behaviour metadata attached to an [`ObstacleKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindMetadata {
    /// Character drawn on rendered maps and used as the menu key.
    pub code: char,
    /// Human-readable name of the kind.
    pub name: &'static str,
    /// Position of the kind in adapter menus; lower comes first.
    pub menu_priority: u8,
    /// Whether the kind makes its footprint impassable.
    pub blocks_movement: bool,
}

const KIND_METADATA: [(ObstacleKind, KindMetadata); 6] = [
    (
        ObstacleKind::Guard,
        KindMetadata {
            code: 'g',
            name: "Guard",
            menu_priority: 0,
            blocks_movement: true,
        },
    ),
    (
        ObstacleKind::Fence,
        KindMetadata {
            code: 'f',
            name: "Fence",
            menu_priority: 1,
            blocks_movement: true,
        },
    ),
    (
        ObstacleKind::Sensor,
        KindMetadata {
            code: 's',
            name: "Sensor",
            menu_priority: 2,
            blocks_movement: false,
        },
    ),
    (
        ObstacleKind::Camera,
        KindMetadata {
            code: 'c',
            name: "Camera",
            menu_priority: 3,
            blocks_movement: true,
        },
    ),
    (
        ObstacleKind::Spotlight,
        KindMetadata {
            code: 'l',
            name: "Spotlight",
            menu_priority: 4,
            blocks_movement: true,
        },
    ),
    (
        ObstacleKind::Quicksand,
        KindMetadata {
            code: 'q',
            name: "Quicksand",
            menu_priority: 5,
            blocks_movement: false,
        },
    ),
];

impl ObstacleKind {
    /// Every obstacle kind ordered by menu priority.
    pub const ALL: [ObstacleKind; 6] = [
        ObstacleKind::Guard,
        ObstacleKind::Fence,
        ObstacleKind::Sensor,
        ObstacleKind::Camera,
        ObstacleKind::Spotlight,
        ObstacleKind::Quicksand,
    ];

    /// Static metadata row describing the kind.
    #[must_use]
    pub const fn metadata(self) -> KindMetadata {
        KIND_METADATA[self as usize].1
    }

    /// Character drawn on rendered maps for cells claimed by the kind.
    #[must_use]
    pub const fn display_code(self) -> char {
        self.metadata().code
    }

    /// Human-readable name of the kind.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        self.metadata().name
    }

    /// Position of the kind in adapter menus.
    #[must_use]
    pub const fn menu_priority(self) -> u8 {
        self.metadata().menu_priority
    }

    /// Whether cells claimed by the kind are impassable.
    #[must_use]
    pub const fn blocks_movement(self) -> bool {
        self.metadata().blocks_movement
    }

    /// Resolves the kind whose display code matches `code`, ignoring case.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_lowercase();
        KIND_METADATA
            .iter()
            .find(|(_, metadata)| metadata.code == code)
            .map(|(kind, _)| *kind)
    }

    /// Menu line advertising placement of the kind.
    #[must_use]
    pub fn menu_entry(self) -> String {
        format!(
            "{}) Add '{}' obstacle.",
            self.display_code(),
            self.display_name()
        )
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Parameters a caller supplies to construct an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObstacleSpec {
    /// Guard standing on a single cell.
    Guard {
        /// Cell occupied by the guard.
        position: Coordinate,
    },
    /// Fence spanning two axis-aligned endpoints, inclusive.
    Fence {
        /// First endpoint of the fence.
        start: Coordinate,
        /// Second endpoint of the fence.
        end: Coordinate,
    },
    /// Sensor detecting every cell within its range.
    Sensor {
        /// Cell the sensor is mounted on.
        position: Coordinate,
        /// Detection radius in cells.
        range: f64,
    },
    /// Camera watching an infinite cone.
    Camera {
        /// Cell the camera is mounted on.
        position: Coordinate,
        /// Direction the camera faces.
        facing: Direction,
    },
    /// Spotlight illuminating a disk ahead of its mount.
    Spotlight {
        /// Cell the spotlight is mounted on.
        position: Coordinate,
        /// Direction the spotlight faces.
        facing: Direction,
        /// Distance from the mount to the centre of the illuminated disk.
        range: f64,
    },
    /// Quicksand splattered around an origin.
    Quicksand {
        /// Centre of the splatter.
        origin: Coordinate,
        /// Maximum distance of splattered cells from the origin.
        range: f64,
        /// Depth that determines the cost of wading through.
        depth: f64,
    },
}

impl ObstacleSpec {
    /// Kind of obstacle the specification constructs.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        match self {
            Self::Guard { .. } => ObstacleKind::Guard,
            Self::Fence { .. } => ObstacleKind::Fence,
            Self::Sensor { .. } => ObstacleKind::Sensor,
            Self::Camera { .. } => ObstacleKind::Camera,
            Self::Spotlight { .. } => ObstacleKind::Spotlight,
            Self::Quicksand { .. } => ObstacleKind::Quicksand,
        }
    }
}

/// Inclusive rectangle of map cells anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapBounds {
    top_left: Coordinate,
    bottom_right: Coordinate,
}

impl MapBounds {
    /// Validates that `bottom_right` lies south-east of (or on) `top_left`.
    pub fn new(top_left: Coordinate, bottom_right: Coordinate) -> Result<Self, MapError> {
        if bottom_right.x() >= top_left.x() && bottom_right.y() >= top_left.y() {
            Ok(Self {
                top_left,
                bottom_right,
            })
        } else {
            Err(MapError::InvalidMapSpecification {
                top_left,
                bottom_right,
            })
        }
    }

    /// Upper-left cell of the rectangle.
    #[must_use]
    pub const fn top_left(&self) -> Coordinate {
        self.top_left
    }

    /// Lower-right cell of the rectangle.
    #[must_use]
    pub const fn bottom_right(&self) -> Coordinate {
        self.bottom_right
    }

    /// Number of columns spanned by the rectangle.
    #[must_use]
    pub fn width(&self) -> u64 {
        u64::from(self.bottom_right.x().abs_diff(self.top_left.x())) + 1
    }

    /// Number of rows spanned by the rectangle.
    #[must_use]
    pub fn height(&self) -> u64 {
        u64::from(self.bottom_right.y().abs_diff(self.top_left.y())) + 1
    }

    /// Number of cells inside the rectangle, saturating at `u64::MAX`.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        self.width().saturating_mul(self.height())
    }

    /// Reports whether the coordinate lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        (self.top_left.x()..=self.bottom_right.x()).contains(&cell.x())
            && (self.top_left.y()..=self.bottom_right.y()).contains(&cell.y())
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> {
        let (left, right) = (self.top_left.x(), self.bottom_right.x());
        (self.top_left.y()..=self.bottom_right.y())
            .flat_map(move |y| (left..=right).map(move |x| Coordinate::new(x, y)))
    }
}

/// Reasons a map rectangle may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MapError {
    /// The bottom-right corner lies north or west of the top-left corner.
    #[error("Invalid map specification.")]
    InvalidMapSpecification {
        /// Requested top-left corner.
        top_left: Coordinate,
        /// Requested bottom-right corner.
        bottom_right: Coordinate,
    },
    /// The rectangle holds more cells than can be rendered.
    #[error("Map is too large to display ({cells} cells, at most {limit}).")]
    TooLarge {
        /// Cells in the requested rectangle.
        cells: u64,
        /// Largest number of cells accepted.
        limit: u64,
    },
}

/// Reasons an obstacle specification may fail validation.
#[derive(Clone, Copy, Debug, PartialEq, Error, Serialize, Deserialize)]
pub enum ObstacleError {
    /// The requested shape cannot be laid out on the grid.
    #[error(transparent)]
    InvalidGeometry(#[from] GeometryError),
    /// A range or depth parameter was zero, negative or not finite.
    #[error("{parameter} must be greater than zero (got {value}).")]
    InvalidRange {
        /// Parameter that failed validation.
        parameter: RangeParameter,
        /// Value supplied by the caller.
        value: f64,
    },
    /// A range was larger than the footprint enumeration accepts.
    #[error("{parameter} must not exceed {limit} (got {value}).")]
    RangeTooLarge {
        /// Parameter that failed validation.
        parameter: RangeParameter,
        /// Value supplied by the caller.
        value: f64,
        /// Largest accepted value.
        limit: f64,
    },
}

/// Shape violations detected while constructing linear obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GeometryError {
    /// Both endpoints name the same cell.
    #[error("Fences must span at least two cells.")]
    Degenerate,
    /// The endpoints share neither a row nor a column.
    #[error("Fences must be horizontal or vertical.")]
    NotAxisAligned,
    /// Part of the footprint lies past the edge of the `i32` plane.
    #[error("Obstacles must lie within the map plane.")]
    OffPlane,
}

/// Numeric obstacle parameters subject to range validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeParameter {
    /// Detection or illumination range.
    Range,
    /// Quicksand depth.
    Depth,
}

impl fmt::Display for RangeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range => f.write_str("Range"),
            Self::Depth => f.write_str("Depth"),
        }
    }
}

/// Failure to parse the `X,Y` coordinate notation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseCoordinateError {
    /// The input did not consist of exactly two comma-separated parts.
    #[error("expected coordinates formatted as X,Y but got '{0}'")]
    MissingSeparator(String),
    /// One of the components was not an integer.
    #[error("'{0}' is not a valid integer coordinate")]
    InvalidComponent(String),
}

/// Failure to parse a direction letter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("expected one of n, s, e or w but got '{0}'")]
pub struct ParseDirectionError(String);
