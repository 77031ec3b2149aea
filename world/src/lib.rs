#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Mission Control.
//!
//! The world owns the obstacle registry and the random source used to
//! splatter quicksand. Adapters mutate it exclusively through [`apply`];
//! systems read it through the [`query`] module.

pub mod grid;
pub mod obstacles;
pub mod registry;

use log::{debug, warn};
use mission_control_core::{Command, Event, ObstacleError, ObstacleId, ObstacleSpec};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use grid::{create_grid, Cell, Grid, MAX_GRID_CELLS};
pub use obstacles::{Footprint, Obstacle, VisionCone, DEFAULT_MOVEMENT_COST, MAX_RANGE};
pub use registry::ObstacleRegistry;

/// Seed used for quicksand splatter when the caller does not provide one.
pub const DEFAULT_QUICKSAND_SEED: u64 = 0x5eed_6d69_7373_696f;

/// Represents the authoritative Mission Control world state.
#[derive(Debug)]
pub struct World {
    registry: ObstacleRegistry,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world using the default quicksand seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_QUICKSAND_SEED)
    }

    /// Creates an empty world whose quicksand splatter derives from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            registry: ObstacleRegistry::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceObstacle { spec } => match place_obstacle(world, spec) {
            Ok(obstacle) => out_events.push(Event::ObstaclePlaced {
                obstacle,
                kind: spec.kind(),
            }),
            Err(reason) => out_events.push(Event::ObstaclePlacementRejected {
                kind: spec.kind(),
                reason,
            }),
        },
    }
}

/// Constructs the obstacle described by `spec` and appends it to the registry.
pub fn place_obstacle(world: &mut World, spec: ObstacleSpec) -> Result<ObstacleId, ObstacleError> {
    let kind = spec.kind();
    match Obstacle::from_spec(spec, &mut world.rng) {
        Ok(obstacle) => {
            let origin = obstacle.origin();
            let id = world.registry.insert(obstacle);
            debug!("placed {kind} {} at {origin}", id.get());
            Ok(id)
        }
        Err(reason) => {
            warn!("rejected {kind} placement: {reason}");
            Err(reason)
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use mission_control_core::{Coordinate, MapError, ObstacleId, ObstacleKind};

    use super::{create_grid, Grid, Obstacle, ObstacleRegistry, World};

    /// Provides read-only access to the ordered obstacle registry.
    #[must_use]
    pub fn obstacles(world: &World) -> &ObstacleRegistry {
        &world.registry
    }

    /// Looks up a placed obstacle by handle.
    #[must_use]
    pub fn obstacle(world: &World, id: ObstacleId) -> Option<&Obstacle> {
        world.registry.get(id)
    }

    /// Builds a grid snapshot between two corners of the map.
    pub fn grid(
        world: &World,
        top_left: Coordinate,
        bottom_right: Coordinate,
    ) -> Result<Grid, MapError> {
        create_grid(top_left, bottom_right, &world.registry)
    }

    /// Obstacle kinds in the order adapters should list them.
    #[must_use]
    pub fn obstacle_menu() -> [ObstacleKind; 6] {
        let mut kinds = ObstacleKind::ALL;
        kinds.sort_by_key(|kind| kind.menu_priority());
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_control_core::{Coordinate, Direction, GeometryError, ObstacleKind};

    fn quicksand_spec() -> ObstacleSpec {
        ObstacleSpec::Quicksand {
            origin: Coordinate::new(0, 0),
            range: 4.0,
            depth: 2.0,
        }
    }

    #[test]
    fn apply_places_valid_obstacle() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceObstacle {
                spec: ObstacleSpec::Guard {
                    position: Coordinate::new(3, 2),
                },
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ObstaclePlaced {
                obstacle: ObstacleId::new(0),
                kind: ObstacleKind::Guard,
            }]
        );
        assert_eq!(query::obstacles(&world).len(), 1);
        assert!(query::obstacle(&world, ObstacleId::new(0))
            .expect("placed")
            .contains(Coordinate::new(3, 2)));
    }

    #[test]
    fn apply_reports_rejected_obstacle() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceObstacle {
                spec: ObstacleSpec::Fence {
                    start: Coordinate::new(0, 0),
                    end: Coordinate::new(1, 1),
                },
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ObstaclePlacementRejected {
                kind: ObstacleKind::Fence,
                reason: ObstacleError::InvalidGeometry(GeometryError::NotAxisAligned),
            }]
        );
        assert!(query::obstacles(&world).is_empty());
    }

    #[test]
    fn rejected_placement_does_not_consume_handles() {
        let mut world = World::new();
        let rejected = place_obstacle(
            &mut world,
            ObstacleSpec::Sensor {
                position: Coordinate::new(0, 0),
                range: -1.0,
            },
        );
        assert!(rejected.is_err());

        let placed = place_obstacle(
            &mut world,
            ObstacleSpec::Camera {
                position: Coordinate::new(0, 0),
                facing: Direction::North,
            },
        );
        assert_eq!(placed, Ok(ObstacleId::new(0)));
    }

    #[test]
    fn quicksand_is_reproducible_for_same_seed() {
        let mut first = World::with_seed(0xfeed);
        let mut second = World::with_seed(0xfeed);
        let _ = place_obstacle(&mut first, quicksand_spec()).expect("valid");
        let _ = place_obstacle(&mut second, quicksand_spec()).expect("valid");

        assert_eq!(
            query::obstacle(&first, ObstacleId::new(0)),
            query::obstacle(&second, ObstacleId::new(0))
        );
    }

    #[test]
    fn grid_query_renders_registry() {
        let mut world = World::new();
        let _ = place_obstacle(
            &mut world,
            ObstacleSpec::Guard {
                position: Coordinate::new(1, 0),
            },
        )
        .expect("valid");

        let grid = query::grid(&world, Coordinate::new(0, 0), Coordinate::new(2, 0)).expect("valid");
        assert_eq!(grid.render(), ".g.\n");
        assert!(query::grid(&world, Coordinate::new(2, 0), Coordinate::new(0, 0)).is_err());
    }

    #[test]
    fn obstacle_menu_follows_priority() {
        let menu = query::obstacle_menu();
        assert_eq!(menu[0], ObstacleKind::Guard);
        assert_eq!(menu[5], ObstacleKind::Quicksand);
        assert!(menu
            .windows(2)
            .all(|pair| pair[0].menu_priority() < pair[1].menu_priority()));
    }
}
