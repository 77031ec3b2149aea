//! Append-only registry of placed obstacles.

use std::collections::BTreeMap;

use mission_control_core::{Coordinate, ObstacleId, ObstacleKind};

use crate::obstacles::{Obstacle, DEFAULT_MOVEMENT_COST};

/// Ordered collection of every obstacle placed in the world.
///
/// Registry order is significant: when several footprints claim the same
/// cell, the obstacle inserted last wins. Obstacles are never removed or
/// mutated, so an [`ObstacleId`] stays valid for the registry's lifetime.
#[derive(Clone, Debug, Default)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an obstacle and returns its handle.
    pub fn insert(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = handle(self.obstacles.len());
        self.obstacles.push(obstacle);
        id
    }

    /// Looks up an obstacle by handle.
    #[must_use]
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.obstacles.get(index))
    }

    /// Iterates obstacles in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (ObstacleId, &Obstacle)> + '_ {
        self.obstacles
            .iter()
            .enumerate()
            .map(|(index, obstacle)| (handle(index), obstacle))
    }

    /// Number of obstacles placed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Reports whether no obstacle has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Obstacle that owns the cell under last-writer-wins semantics.
    #[must_use]
    pub fn claimant(&self, cell: Coordinate) -> Option<(ObstacleId, &Obstacle)> {
        self.iter().rev().find(|(_, obstacle)| obstacle.contains(cell))
    }

    /// Reports whether any blocking obstacle claims the cell.
    #[must_use]
    pub fn is_blocked(&self, cell: Coordinate) -> bool {
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.blocks_movement() && obstacle.contains(cell))
    }

    /// Cost charged for leaving the cell; never below one.
    ///
    /// The earliest placed obstacle claiming the cell sets the cost.
    #[must_use]
    pub fn movement_cost(&self, cell: Coordinate) -> u32 {
        self.obstacles
            .iter()
            .find(|obstacle| obstacle.contains(cell))
            .map_or(DEFAULT_MOVEMENT_COST, Obstacle::movement_cost)
            .max(DEFAULT_MOVEMENT_COST)
    }

    /// Number of placed obstacles per kind, in menu order.
    #[must_use]
    pub fn kinds(&self) -> BTreeMap<ObstacleKind, usize> {
        let mut summary = BTreeMap::new();
        for obstacle in &self.obstacles {
            *summary.entry(obstacle.kind()).or_insert(0) += 1;
        }
        summary
    }
}

fn handle(index: usize) -> ObstacleId {
    ObstacleId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_control_core::Direction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn registry_starts_empty() {
        let registry = ObstacleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.claimant(Coordinate::new(0, 0)).is_none());
    }

    #[test]
    fn insert_allocates_sequential_handles() {
        let mut registry = ObstacleRegistry::new();
        let first = registry.insert(Obstacle::guard(Coordinate::new(0, 0)));
        let second = registry.insert(Obstacle::guard(Coordinate::new(1, 0)));

        assert_eq!(first, ObstacleId::new(0));
        assert_eq!(second, ObstacleId::new(1));
        assert_eq!(
            registry.get(second).map(Obstacle::origin),
            Some(Coordinate::new(1, 0))
        );
        assert!(registry.get(ObstacleId::new(2)).is_none());
    }

    #[test]
    fn last_inserted_obstacle_claims_overlapping_cell() {
        let mut registry = ObstacleRegistry::new();
        let cell = Coordinate::new(2, 2);
        let _ = registry.insert(Obstacle::guard(cell));
        let sensor = registry.insert(Obstacle::sensor(cell, 1.0).expect("valid"));

        let (id, obstacle) = registry.claimant(cell).expect("claimed");
        assert_eq!(id, sensor);
        assert_eq!(obstacle.kind(), ObstacleKind::Sensor);
        assert!(
            registry.is_blocked(cell),
            "a traversable claimant does not hide the guard underneath",
        );
    }

    #[test]
    fn non_blocking_obstacles_do_not_block() {
        let mut registry = ObstacleRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let _ = registry.insert(Obstacle::sensor(Coordinate::new(0, 0), 2.0).expect("valid"));
        let _ = registry.insert(
            Obstacle::quicksand(Coordinate::new(0, 0), 1.0, 3.0, &mut rng).expect("valid"),
        );

        assert!(!registry.is_blocked(Coordinate::new(0, 0)));
        assert!(!registry.is_blocked(Coordinate::new(1, 1)));
    }

    #[test]
    fn movement_cost_follows_claimant_and_defaults_to_one() {
        let mut registry = ObstacleRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let origin = Coordinate::new(4, 4);
        let _ = registry
            .insert(Obstacle::quicksand(origin, 1.0, 4.0, &mut rng).expect("valid quicksand"));

        assert_eq!(registry.movement_cost(origin), 4);
        assert_eq!(registry.movement_cost(Coordinate::new(20, 20)), 1);
    }

    #[test]
    fn kinds_counts_each_placed_kind() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::guard(Coordinate::new(0, 0)));
        let _ = registry.insert(Obstacle::camera(Coordinate::new(4, 4), Direction::West));
        let _ = registry.insert(Obstacle::guard(Coordinate::new(1, 0)));

        let summary: Vec<_> = registry.kinds().into_iter().collect();
        assert_eq!(
            summary,
            vec![(ObstacleKind::Guard, 2), (ObstacleKind::Camera, 1)]
        );
    }

    #[test]
    fn earliest_overlapping_quicksand_sets_cost() {
        let mut registry = ObstacleRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let cell = Coordinate::new(0, 0);
        let _ = registry.insert(Obstacle::quicksand(cell, 0.5, 2.0, &mut rng).expect("valid"));
        let deeper = registry.insert(Obstacle::quicksand(cell, 0.5, 9.0, &mut rng).expect("valid"));

        assert_eq!(registry.movement_cost(cell), 2);
        assert_eq!(
            registry.claimant(cell).map(|(id, _)| id),
            Some(deeper),
            "rendering still shows the latest footprint"
        );
    }

    #[test]
    fn iteration_handles_match_inserted_handles() {
        let mut registry = ObstacleRegistry::new();
        let inserted: Vec<_> = (0..3)
            .map(|x| registry.insert(Obstacle::guard(Coordinate::new(x, 0))))
            .collect();
        let iterated: Vec<_> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(inserted, iterated);
    }

    #[test]
    fn camera_cone_blocks_far_cells() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::camera(Coordinate::new(0, 0), Direction::South));
        assert!(registry.is_blocked(Coordinate::new(0, 100)));
        assert!(!registry.is_blocked(Coordinate::new(0, -1)));
    }
}
