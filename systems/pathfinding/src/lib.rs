#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cost-aware A* pathfinder that routes an agent around blocking footprints.
//!
//! The search runs on the unbounded integer plane using four-way movement and
//! a Manhattan heuristic. Leaving a cell costs that cell's movement cost, so
//! quicksand is avoided whenever a cheaper detour exists.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, trace, warn};
use mission_control_core::{Coordinate, Direction, MapBounds};
use mission_control_world::ObstacleRegistry;

/// Default number of cells the search may expand before giving up.
pub const DEFAULT_MAX_EXPANSIONS: usize = 100_000;

/// Tunable limits for the pathfinder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of cells moved to the closed set before the search stops.
    pub max_expansions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Sequence of cells from start to goal together with its accumulated cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    cells: Vec<Coordinate>,
    cost: u32,
}

impl Route {
    /// Cells visited by the route, including the start and the goal.
    #[must_use]
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    /// Total movement cost charged along the route.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of steps in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Reports whether the route requires no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the cardinal direction of every step.
    pub fn steps(&self) -> impl Iterator<Item = Direction> + '_ {
        self.cells
            .windows(2)
            .filter_map(|pair| Direction::between(pair[0], pair[1]))
    }

    /// Renders the route as one direction letter per step.
    #[must_use]
    pub fn directions(&self) -> String {
        self.steps().map(Direction::letter).collect()
    }
}

/// Result of a single pathfinding request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// A cheapest route was found.
    Found(Route),
    /// Every reachable cell was explored without reaching the goal.
    NoPath,
    /// The expansion budget ran out before the search concluded.
    BudgetExhausted {
        /// Number of cells expanded before stopping.
        expanded: usize,
    },
}

impl PathOutcome {
    /// User-facing sentence describing the outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Found(route) => format!(
                "The following path will take you to the objective:\n{}",
                route.directions()
            ),
            Self::NoPath | Self::BudgetExhausted { .. } => {
                "There is no safe path to the objective.".to_owned()
            }
        }
    }
}

/// Finds a route with the default configuration on the unbounded plane.
#[must_use]
pub fn find_path(start: Coordinate, goal: Coordinate, obstacles: &ObstacleRegistry) -> PathOutcome {
    Pathfinder::default().find_path(start, goal, obstacles, None)
}

/// A* search engine that keeps its scratch buffers between requests.
#[derive(Debug, Default)]
pub struct Pathfinder {
    config: Config,
    open: BinaryHeap<OpenEntry>,
    closed: HashSet<Coordinate>,
    records: HashMap<Coordinate, NodeRecord>,
    sequence: u64,
}

impl Pathfinder {
    /// Creates a pathfinder using the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Searches for the cheapest route from `start` to `goal`.
    ///
    /// When `bounds` is provided, cells outside the rectangle are never
    /// visited. A start inside a blocking footprint is still searched from; a
    /// blocked goal is unreachable.
    pub fn find_path(
        &mut self,
        start: Coordinate,
        goal: Coordinate,
        obstacles: &ObstacleRegistry,
        bounds: Option<MapBounds>,
    ) -> PathOutcome {
        self.reset();

        if let Some(bounds) = bounds {
            if !bounds.contains(start) || !bounds.contains(goal) {
                debug!("path {start} -> {goal} leaves the map bounds");
                return PathOutcome::NoPath;
            }
        }

        if obstacles.is_blocked(goal) {
            debug!("goal {goal} lies inside a blocking footprint");
            return PathOutcome::NoPath;
        }

        let _ = self.records.insert(
            start,
            NodeRecord {
                g: 0,
                parent: None,
            },
        );
        self.push(start, 0, start.manhattan_distance(goal));

        let mut expanded = 0_usize;
        while let Some(entry) = self.open.pop() {
            if self.closed.contains(&entry.cell) || self.is_stale(&entry) {
                continue;
            }

            if entry.cell == goal {
                let route = self.reconstruct(goal, entry.g);
                debug!(
                    "path {start} -> {goal} found: {} steps, cost {}, {expanded} expanded",
                    route.len(),
                    route.cost()
                );
                return PathOutcome::Found(route);
            }

            if expanded == self.config.max_expansions {
                warn!("path {start} -> {goal} abandoned after {expanded} expansions");
                return PathOutcome::BudgetExhausted { expanded };
            }
            expanded += 1;
            let _ = self.closed.insert(entry.cell);
            trace!("expanding {} (g = {}, f = {})", entry.cell, entry.g, entry.f);

            let step_cost = obstacles.movement_cost(entry.cell);
            for direction in Direction::ALL {
                let Some(neighbour) = entry.cell.checked_step(direction) else {
                    continue;
                };
                if self.closed.contains(&neighbour) {
                    continue;
                }
                if bounds.is_some_and(|bounds| !bounds.contains(neighbour)) {
                    continue;
                }
                if obstacles.is_blocked(neighbour) {
                    let _ = self.closed.insert(neighbour);
                    continue;
                }

                let tentative = entry.g.saturating_add(step_cost);
                let improves = self
                    .records
                    .get(&neighbour)
                    .map_or(true, |record| tentative < record.g);
                if improves {
                    let _ = self.records.insert(
                        neighbour,
                        NodeRecord {
                            g: tentative,
                            parent: Some(entry.cell),
                        },
                    );
                    self.push(neighbour, tentative, neighbour.manhattan_distance(goal));
                }
            }
        }

        debug!("path {start} -> {goal} not found after {expanded} expansions");
        PathOutcome::NoPath
    }

    fn reset(&mut self) {
        self.open.clear();
        self.closed.clear();
        self.records.clear();
        self.sequence = 0;
    }

    fn push(&mut self, cell: Coordinate, g: u32, h: u32) {
        let entry = OpenEntry {
            f: u64::from(g) + u64::from(h),
            h,
            sequence: self.sequence,
            g,
            cell,
        };
        self.sequence += 1;
        self.open.push(entry);
    }

    fn is_stale(&self, entry: &OpenEntry) -> bool {
        self.records
            .get(&entry.cell)
            .is_some_and(|record| record.g < entry.g)
    }

    fn reconstruct(&self, goal: Coordinate, cost: u32) -> Route {
        let mut cells = vec![goal];
        let mut cursor = goal;
        while let Some(parent) = self.records.get(&cursor).and_then(|record| record.parent) {
            cells.push(parent);
            cursor = parent;
        }
        cells.reverse();
        Route { cells, cost }
    }
}

#[derive(Clone, Copy, Debug)]
struct NodeRecord {
    g: u32,
    parent: Option<Coordinate>,
}

/// Heap entry ordered so the lowest `f`, then lowest `h`, then earliest push
/// is popped first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    f: u64,
    h: u32,
    sequence: u64,
    g: u32,
    cell: Coordinate,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
