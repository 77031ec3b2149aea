//! Rectangular map snapshot used to render obstacle placement.

use std::fmt;

use mission_control_core::{Coordinate, MapBounds, MapError, ObstacleId};

use crate::registry::ObstacleRegistry;

/// Character drawn for cells no obstacle claims.
pub const EMPTY_CELL: char = '.';

/// Largest number of cells a single grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 20;

/// Single map cell and the obstacle drawn on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    position: Coordinate,
    occupant: Option<ObstacleId>,
    display_char: char,
}

impl Cell {
    fn new(position: Coordinate) -> Self {
        Self {
            position,
            occupant: None,
            display_char: EMPTY_CELL,
        }
    }

    fn assign(&mut self, occupant: ObstacleId, display_char: char) {
        self.occupant = Some(occupant);
        self.display_char = display_char;
    }

    /// Absolute coordinate of the cell.
    #[must_use]
    pub const fn position(&self) -> Coordinate {
        self.position
    }

    /// Handle of the obstacle drawn on the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<ObstacleId> {
        self.occupant
    }

    /// Character drawn for the cell.
    #[must_use]
    pub const fn display_char(&self) -> char {
        self.display_char
    }
}

/// Dense row-major grid of cells covering a [`MapBounds`] rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    bounds: MapBounds,
    cells: Vec<Cell>,
}

/// Builds a grid between two corners, painting obstacles in registry order.
pub fn create_grid(
    top_left: Coordinate,
    bottom_right: Coordinate,
    obstacles: &ObstacleRegistry,
) -> Result<Grid, MapError> {
    MapBounds::new(top_left, bottom_right).and_then(|bounds| Grid::from_bounds(bounds, obstacles))
}

impl Grid {
    /// Builds a grid over already-validated bounds.
    ///
    /// Each cell consults every obstacle in registry order; when several
    /// footprints overlap the last one painted wins. Rectangles holding more
    /// than [`MAX_GRID_CELLS`] cells are rejected.
    pub fn from_bounds(bounds: MapBounds, obstacles: &ObstacleRegistry) -> Result<Self, MapError> {
        let count = bounds.cell_count();
        if count > MAX_GRID_CELLS {
            return Err(MapError::TooLarge {
                cells: count,
                limit: MAX_GRID_CELLS,
            });
        }

        let cells = bounds
            .cells()
            .map(|position| {
                let mut cell = Cell::new(position);
                for (id, obstacle) in obstacles.iter() {
                    if obstacle.contains(position) {
                        cell.assign(id, obstacle.display_code());
                    }
                }
                cell
            })
            .collect();

        Ok(Self { bounds, cells })
    }

    /// Rectangle covered by the grid.
    #[must_use]
    pub const fn bounds(&self) -> MapBounds {
        self.bounds
    }

    /// Top-left cell of the grid.
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.bounds.top_left()
    }

    /// Number of columns in the grid.
    #[must_use]
    pub fn width(&self) -> u64 {
        self.bounds.width()
    }

    /// Number of rows in the grid.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.bounds.height()
    }

    /// Cell at the absolute coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, position: Coordinate) -> Option<&Cell> {
        self.index(position).and_then(|index| self.cells.get(index))
    }

    /// Iterates rows from north to south.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        let width = usize::try_from(self.width()).unwrap_or(usize::MAX);
        self.cells.chunks(width)
    }

    /// Renders the grid as newline-terminated rows of display characters.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn index(&self, position: Coordinate) -> Option<usize> {
        if !self.bounds.contains(position) {
            return None;
        }

        let origin = self.origin();
        let column = usize::try_from(position.x().abs_diff(origin.x())).ok()?;
        let row = usize::try_from(position.y().abs_diff(origin.y())).ok()?;
        let width = usize::try_from(self.width()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{}", cell.display_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::Obstacle;
    use mission_control_core::Direction;

    #[test]
    fn create_grid_rejects_inverted_corners() {
        let registry = ObstacleRegistry::new();
        let result = create_grid(Coordinate::new(3, 3), Coordinate::new(2, 5), &registry);
        assert!(matches!(
            result,
            Err(MapError::InvalidMapSpecification { .. })
        ));
    }

    #[test]
    fn empty_grid_renders_dots() {
        let registry = ObstacleRegistry::new();
        let grid =
            create_grid(Coordinate::new(0, 0), Coordinate::new(2, 1), &registry).expect("valid");
        assert_eq!(grid.render(), "...\n...\n");
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
    }

    #[test]
    fn obstacles_paint_their_codes() {
        let mut registry = ObstacleRegistry::new();
        let guard = registry.insert(Obstacle::guard(Coordinate::new(1, 1)));
        let _ = registry.insert(
            Obstacle::fence(Coordinate::new(0, 2), Coordinate::new(2, 2)).expect("valid"),
        );

        let grid =
            create_grid(Coordinate::new(0, 0), Coordinate::new(2, 2), &registry).expect("valid");

        assert_eq!(grid.render(), "...\n.g.\nfff\n");
        let cell = grid.cell(Coordinate::new(1, 1)).expect("inside");
        assert_eq!(cell.occupant(), Some(guard));
        assert_eq!(cell.display_char(), 'g');
    }

    #[test]
    fn grid_uses_absolute_coordinates() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::guard(Coordinate::new(-1, 5)));

        let grid =
            create_grid(Coordinate::new(-2, 4), Coordinate::new(0, 5), &registry).expect("valid");

        assert_eq!(grid.render(), "...\n.g.\n");
        assert_eq!(grid.origin(), Coordinate::new(-2, 4));
        assert!(grid.cell(Coordinate::new(1, 5)).is_none());
        assert_eq!(
            grid.cell(Coordinate::new(-1, 5)).map(Cell::position),
            Some(Coordinate::new(-1, 5))
        );
    }

    #[test]
    fn later_obstacles_overwrite_earlier_ones() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::guard(Coordinate::new(1, 0)));
        let sensor = registry.insert(Obstacle::sensor(Coordinate::new(1, 0), 1.0).expect("valid"));

        let grid =
            create_grid(Coordinate::new(0, 0), Coordinate::new(2, 1), &registry).expect("valid");

        assert_eq!(grid.render(), "sss\n.s.\n");
        assert_eq!(
            grid.cell(Coordinate::new(1, 0)).and_then(Cell::occupant),
            Some(sensor)
        );
    }

    #[test]
    fn oversized_maps_are_rejected_without_allocating() {
        let registry = ObstacleRegistry::new();
        let result = create_grid(
            Coordinate::new(i32::MIN, 0),
            Coordinate::new(i32::MAX, 0),
            &registry,
        );
        assert_eq!(
            result,
            Err(MapError::TooLarge {
                cells: 1 << 32,
                limit: MAX_GRID_CELLS,
            })
        );

        let largest = create_grid(Coordinate::new(0, 0), Coordinate::new(1023, 1023), &registry)
            .expect("at the limit");
        assert_eq!(largest.width() * largest.height(), MAX_GRID_CELLS);
    }

    #[test]
    fn camera_cone_is_painted_to_the_map_edge() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::camera(Coordinate::new(0, 1), Direction::East));

        let grid =
            create_grid(Coordinate::new(0, 0), Coordinate::new(3, 2), &registry).expect("valid");

        assert_eq!(grid.render(), ".ccc\ncccc\n.ccc\n");
    }
}
