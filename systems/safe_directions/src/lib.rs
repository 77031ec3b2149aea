#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that reports which cardinal steps avoid every blocking footprint.

use std::fmt;

use log::debug;
use mission_control_core::{Coordinate, Direction};
use mission_control_world::ObstacleRegistry;

/// Outcome of evaluating an agent's position against the placed obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionReport {
    /// The agent already stands inside a blocking footprint.
    Compromised,
    /// At least one neighbouring cell is free of blocking footprints.
    Safe(SafeDirections),
    /// Every neighbouring cell is claimed by a blocking footprint.
    NoSafeDirection,
}

impl DirectionReport {
    /// User-facing sentence describing the report.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Compromised => "Agent, your location is compromised. Abort mission.".to_owned(),
            Self::Safe(directions) => {
                format!("You can safely take any of the following directions: {directions}")
            }
            Self::NoSafeDirection => {
                "You cannot safely move in any direction. Abort mission.".to_owned()
            }
        }
    }
}

/// Non-empty subset of the cardinal directions kept in `N`, `S`, `E`, `W` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafeDirections {
    allowed: [bool; 4],
}

impl SafeDirections {
    /// Iterates the safe directions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .zip(self.allowed)
            .filter_map(|(direction, allowed)| allowed.then_some(direction))
    }

    /// Reports whether stepping in `direction` is safe.
    #[must_use]
    pub fn contains(&self, direction: Direction) -> bool {
        self.iter().any(|candidate| candidate == direction)
    }

    /// Number of safe directions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.iter().filter(|allowed| **allowed).count()
    }

    /// Always false; an empty set is reported as [`DirectionReport::NoSafeDirection`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SafeDirections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for direction in self.iter() {
            write!(f, "{}", direction.letter())?;
        }
        Ok(())
    }
}

/// Evaluates which neighbouring cells of `position` are free of blocking obstacles.
///
/// Traversable footprints such as sensors and quicksand never remove a
/// direction and never compromise the agent. A step past the edge of the
/// plane is never safe.
#[must_use]
pub fn evaluate_safe_directions(
    position: Coordinate,
    obstacles: &ObstacleRegistry,
) -> DirectionReport {
    if obstacles.is_blocked(position) {
        debug!("agent at {position} stands inside a blocking footprint");
        return DirectionReport::Compromised;
    }

    let mut allowed = [true; 4];
    for (slot, direction) in allowed.iter_mut().zip(Direction::ALL) {
        *slot = position
            .checked_step(direction)
            .is_some_and(|neighbour| !obstacles.is_blocked(neighbour));
    }

    if allowed.iter().any(|allowed| *allowed) {
        DirectionReport::Safe(SafeDirections { allowed })
    } else {
        DirectionReport::NoSafeDirection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_control_world::Obstacle;

    #[test]
    fn empty_registry_allows_every_direction() {
        let registry = ObstacleRegistry::new();
        let report = evaluate_safe_directions(Coordinate::new(3, 3), &registry);

        let DirectionReport::Safe(directions) = report else {
            panic!("expected safe directions, got {report:?}");
        };
        assert_eq!(directions.to_string(), "NSEW");
        assert_eq!(directions.len(), 4);
        assert!(!directions.is_empty());
    }

    #[test]
    fn guard_to_the_north_removes_north() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::guard(Coordinate::new(3, 2)));

        let report = evaluate_safe_directions(Coordinate::new(3, 3), &registry);
        let DirectionReport::Safe(directions) = report else {
            panic!("expected safe directions, got {report:?}");
        };
        assert!(!directions.contains(Direction::North));
        assert_eq!(directions.to_string(), "SEW");
    }

    #[test]
    fn standing_on_a_guard_is_compromised() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::guard(Coordinate::new(0, 0)));

        assert_eq!(
            evaluate_safe_directions(Coordinate::new(0, 0), &registry),
            DirectionReport::Compromised
        );
    }

    #[test]
    fn surrounded_agent_has_no_safe_direction() {
        let mut registry = ObstacleRegistry::new();
        let centre = Coordinate::new(1, 1);
        for direction in Direction::ALL {
            let _ = registry.insert(Obstacle::guard(centre.step(direction)));
        }

        let report = evaluate_safe_directions(centre, &registry);
        assert_eq!(report, DirectionReport::NoSafeDirection);
        assert_eq!(
            report.message(),
            "You cannot safely move in any direction. Abort mission."
        );
    }

    #[test]
    fn steps_off_the_plane_are_not_safe() {
        let registry = ObstacleRegistry::new();
        let report = evaluate_safe_directions(Coordinate::new(i32::MAX, 0), &registry);
        let DirectionReport::Safe(directions) = report else {
            panic!("expected safe directions, got {report:?}");
        };
        assert_eq!(directions.to_string(), "NSW");

        let corner = Coordinate::new(i32::MIN, i32::MIN);
        let report = evaluate_safe_directions(corner, &registry);
        assert_eq!(report.message(), "You can safely take any of the following directions: SE");
    }

    #[test]
    fn sensors_never_restrict_movement() {
        let mut registry = ObstacleRegistry::new();
        let _ = registry.insert(Obstacle::sensor(Coordinate::new(0, 0), 3.0).expect("valid"));

        let report = evaluate_safe_directions(Coordinate::new(0, 0), &registry);
        assert_eq!(
            report.message(),
            "You can safely take any of the following directions: NSEW"
        );
    }
}
