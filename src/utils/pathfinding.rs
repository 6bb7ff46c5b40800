//! # Pathfinding
//!
//! Per-call walkability snapshots and the bounded A* planner that runs on
//! them.
//!
//! A [`WalkabilityMap`] merges terrain with the blocking occupants of the
//! moment. It is built fresh for every planning request and dropped with it:
//! occupants move every turn, so nothing is cached between calls.

use crate::config::{DIAGONAL_COST, MAX_PATH_LENGTH, ORTHOGONAL_COST};
use crate::{Direction, EntityId, MapView, OccupantRegistry, Position};
use pathfinding::prelude::astar;
use serde::{Deserialize, Serialize};

/// Step costs are planned in hundredths to keep the search in integers.
const COST_SCALE: f64 = 100.0;

/// Tunables for path planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Paths with this many steps or more are rejected
    pub max_path_length: usize,
    /// Cost of an orthogonal step
    pub orthogonal_cost: f64,
    /// Cost of a diagonal step; `0.0` forbids diagonal moves
    pub diagonal_cost: f64,
}

impl MovementConfig {
    /// Creates the standard configuration: octile costs and a 25 step cap.
    ///
    /// # Examples
    ///
    /// ```
    /// use delver::MovementConfig;
    ///
    /// let config = MovementConfig::new();
    /// assert_eq!(config.max_path_length, 25);
    /// assert_eq!(config.diagonal_cost, 1.41);
    /// ```
    pub fn new() -> Self {
        Self {
            max_path_length: MAX_PATH_LENGTH,
            orthogonal_cost: ORTHOGONAL_COST,
            diagonal_cost: DIAGONAL_COST,
        }
    }

    /// Four-directional movement only.
    pub fn orthogonal_only() -> Self {
        Self {
            diagonal_cost: 0.0,
            ..Self::new()
        }
    }

    pub fn allows_diagonal(&self) -> bool {
        self.diagonal_cost > 0.0
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    transparent: bool,
    walkable: bool,
}

/// Transient grid of `(transparent, walkable)` flags used for one planning
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkabilityMap {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl WalkabilityMap {
    /// Builds a snapshot from terrain, then marks every blocking occupant not
    /// listed in `exclude` as unwalkable. Transparency is left as the terrain
    /// has it.
    pub fn build<M, R>(map: &M, occupants: &R, exclude: &[EntityId]) -> Self
    where
        M: MapView + ?Sized,
        R: OccupantRegistry + ?Sized,
    {
        let mut snapshot = Self::from_terrain(map);
        let mut marked = 0usize;

        for (id, pos) in occupants.blockers_excluding(exclude) {
            if snapshot.mark_unwalkable(pos) {
                marked += 1;
            } else {
                log::warn!("Blocking occupant {} at {} is off the map, ignoring it", id, pos);
            }
        }

        log::trace!(
            "Built {}x{} walkability snapshot with {} occupied cells",
            snapshot.width,
            snapshot.height,
            marked
        );
        snapshot
    }

    /// Builds a snapshot from terrain alone.
    pub fn from_terrain<M: MapView + ?Sized>(map: &M) -> Self {
        let width = map.width();
        let height = map.height();
        let mut cells = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(Cell {
                    transparent: !map.tile_blocks_sight(x, y),
                    walkable: !map.tile_blocked(x, y),
                });
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x as u32 >= self.width || pos.y as u32 >= self.height {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Whether a mover may enter `pos`. Off-map cells are never walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.index(pos)
            .map(|index| self.cells[index].walkable)
            .unwrap_or(false)
    }

    /// Whether sight passes through `pos`. Off-map cells are opaque.
    pub fn is_transparent(&self, pos: Position) -> bool {
        self.index(pos)
            .map(|index| self.cells[index].transparent)
            .unwrap_or(false)
    }

    /// Marks `pos` as unwalkable. Returns `false` if `pos` is off the map.
    pub fn mark_unwalkable(&mut self, pos: Position) -> bool {
        match self.index(pos) {
            Some(index) => {
                self.cells[index].walkable = false;
                true
            }
            None => false,
        }
    }

    /// Bresenham line of sight: true if every cell strictly between `from`
    /// and `to` is transparent.
    ///
    /// ```
    /// use delver::{GameMap, Position, WalkabilityMap};
    ///
    /// let map = GameMap::from_rows(&[".....", "..=..", "..#.."]).unwrap();
    /// let snapshot = WalkabilityMap::from_terrain(&map);
    /// assert!(snapshot.has_line_of_sight(Position::new(0, 1), Position::new(4, 1)));
    /// assert!(!snapshot.has_line_of_sight(Position::new(0, 2), Position::new(4, 2)));
    /// ```
    pub fn has_line_of_sight(&self, from: Position, to: Position) -> bool {
        let mut x = from.x;
        let mut y = from.y;
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if x == to.x && y == to.y {
                return true;
            }
            let current = Position::new(x, y);
            if current != from && !self.is_transparent(current) {
                return false;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// A planned route. Steps exclude the start and end on the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedPath {
    steps: Vec<Position>,
    cost: f64,
}

impl ComputedPath {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The tile to move to next.
    pub fn first_step(&self) -> Option<Position> {
        self.steps.first().copied()
    }

    pub fn steps(&self) -> &[Position] {
        &self.steps
    }

    /// Total movement cost in tile units.
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

/// Bounded shortest-path search over a [`WalkabilityMap`].
///
/// Moves go to any of the eight neighbours (four when diagonals are
/// disabled). Neighbours are expanded in [`Direction::ALL`] order, so equal
/// cost routes are always resolved the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlanner {
    config: MovementConfig,
    orthogonal_step: u32,
    diagonal_step: Option<u32>,
}

impl PathPlanner {
    /// Creates a planner from a movement configuration.
    pub fn new(config: MovementConfig) -> Self {
        let orthogonal_step = scaled_cost(config.orthogonal_cost).max(1);
        let diagonal_step = config
            .allows_diagonal()
            .then(|| scaled_cost(config.diagonal_cost).max(1));
        Self {
            config,
            orthogonal_step,
            diagonal_step,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Computes the cheapest path from `start` to `goal`, ignoring the
    /// length cap.
    ///
    /// Returns `None` when the goal cannot be reached. The start cell does
    /// not need to be walkable; the goal cell does. A path from a cell to
    /// itself is empty.
    pub fn compute_path(
        &self,
        snapshot: &WalkabilityMap,
        start: Position,
        goal: Position,
    ) -> Option<ComputedPath> {
        if !snapshot.is_walkable(goal) {
            log::debug!("Goal {} is not walkable", goal);
            return None;
        }

        let (nodes, cost) = astar(
            &start,
            |&pos| self.successors(snapshot, pos),
            |&pos| self.heuristic(pos, goal),
            |&pos| pos == goal,
        )?;

        Some(ComputedPath {
            steps: nodes.into_iter().skip(1).collect(),
            cost: cost as f64 / COST_SCALE,
        })
    }

    /// Computes a path that is non-empty and shorter than the configured
    /// cap. Anything else is "no usable path".
    pub fn usable_path(
        &self,
        snapshot: &WalkabilityMap,
        start: Position,
        goal: Position,
    ) -> Option<ComputedPath> {
        let path = self.compute_path(snapshot, start, goal)?;
        if path.is_empty() {
            return None;
        }
        if path.len() >= self.config.max_path_length {
            log::debug!(
                "Path from {} to {} is {} steps, over the {} step cap",
                start,
                goal,
                path.len(),
                self.config.max_path_length
            );
            return None;
        }
        Some(path)
    }

    fn successors(&self, snapshot: &WalkabilityMap, pos: Position) -> Vec<(Position, u32)> {
        let directions: &[Direction] = match self.diagonal_step {
            Some(_) => &Direction::ALL,
            None => &Direction::CARDINAL,
        };

        directions
            .iter()
            .filter_map(|&direction| {
                let cost = match (direction.is_diagonal(), self.diagonal_step) {
                    (true, Some(diagonal)) => diagonal,
                    _ => self.orthogonal_step,
                };
                let delta = direction.to_delta();
                let next = pos.offset(delta.x, delta.y);
                snapshot.is_walkable(next).then_some((next, cost))
            })
            .collect()
    }

    /// Octile distance in scaled units, never above the true remaining cost.
    fn heuristic(&self, pos: Position, goal: Position) -> u32 {
        let dx = (pos.x - goal.x).unsigned_abs();
        let dy = (pos.y - goal.y).unsigned_abs();
        let (long, short) = (dx.max(dy), dx.min(dy));
        let orthogonal = self.orthogonal_step;

        match self.diagonal_step {
            None => orthogonal * (dx + dy),
            Some(diagonal) if diagonal < orthogonal => diagonal * long,
            Some(diagonal) => orthogonal * (long - short) + diagonal.min(2 * orthogonal) * short,
        }
    }
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

fn scaled_cost(cost: f64) -> u32 {
    (cost * COST_SCALE).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameMap, Object, Tile};

    fn open_snapshot(width: u32, height: u32) -> WalkabilityMap {
        WalkabilityMap::from_terrain(&GameMap::new(width, height))
    }

    #[test]
    fn test_snapshot_mirrors_terrain() {
        let map = GameMap::from_rows(&["#=.", "..."]).unwrap();
        let snapshot = WalkabilityMap::from_terrain(&map);

        assert_eq!((snapshot.width(), snapshot.height()), (3, 2));
        assert!(!snapshot.is_walkable(Position::new(0, 0)));
        assert!(!snapshot.is_transparent(Position::new(0, 0)));
        assert!(!snapshot.is_walkable(Position::new(1, 0)));
        assert!(snapshot.is_transparent(Position::new(1, 0)));
        assert!(snapshot.is_walkable(Position::new(2, 1)));
        assert!(!snapshot.is_walkable(Position::new(3, 0)));
    }

    #[test]
    fn test_snapshot_marks_blockers_except_excluded() {
        let map = GameMap::new(5, 5);
        let mover = Object::new(0, 0, 'o', "orc", true);
        let target = Object::new(4, 4, '@', "player", true);
        let troll = Object::new(2, 2, 'T', "troll", true);
        let scroll = Object::new(3, 3, '?', "scroll", false);
        let exclude = [mover.id(), target.id()];
        let objects = vec![mover, target, troll, scroll];

        let snapshot = WalkabilityMap::build(&map, &objects, &exclude);

        assert!(snapshot.is_walkable(Position::new(0, 0)));
        assert!(snapshot.is_walkable(Position::new(4, 4)));
        assert!(!snapshot.is_walkable(Position::new(2, 2)));
        assert!(snapshot.is_transparent(Position::new(2, 2)));
        assert!(snapshot.is_walkable(Position::new(3, 3)));
    }

    #[test]
    fn test_snapshot_ignores_off_map_blockers() {
        let map = GameMap::new(3, 3);
        let objects = vec![Object::new(7, -1, 'g', "ghost", true)];
        let snapshot = WalkabilityMap::build(&map, &objects, &[]);
        assert_eq!(snapshot, WalkabilityMap::from_terrain(&map));
    }

    #[test]
    fn test_straight_diagonal_path() {
        let planner = PathPlanner::default();
        let snapshot = open_snapshot(10, 10);
        let path = planner
            .compute_path(&snapshot, Position::new(0, 0), Position::new(9, 9))
            .unwrap();

        assert_eq!(path.len(), 9);
        assert_eq!(path.first_step(), Some(Position::new(1, 1)));
        assert_eq!(path.steps().last(), Some(&Position::new(9, 9)));
        assert!((path.cost() - 9.0 * 1.41).abs() < 1e-9);
    }

    #[test]
    fn test_path_to_self_is_empty_and_unusable() {
        let planner = PathPlanner::default();
        let snapshot = open_snapshot(3, 3);
        let here = Position::new(1, 1);
        assert!(planner.compute_path(&snapshot, here, here).unwrap().is_empty());
        assert!(planner.usable_path(&snapshot, here, here).is_none());
    }

    #[test]
    fn test_unwalkable_goal_has_no_path() {
        let mut map = GameMap::new(5, 5);
        map.set_tile(Position::new(4, 4), Tile::wall()).unwrap();
        let snapshot = WalkabilityMap::from_terrain(&map);
        assert!(PathPlanner::default()
            .compute_path(&snapshot, Position::new(0, 0), Position::new(4, 4))
            .is_none());
    }

    #[test]
    fn test_walled_off_goal_has_no_path() {
        let map = GameMap::from_rows(&["..#..", "..#..", "..#.."]).unwrap();
        let snapshot = WalkabilityMap::from_terrain(&map);
        assert!(PathPlanner::default()
            .compute_path(&snapshot, Position::new(0, 1), Position::new(4, 1))
            .is_none());
    }

    #[test]
    fn test_length_cap() {
        let planner = PathPlanner::default();
        let snapshot = open_snapshot(40, 1);
        let start = Position::new(0, 0);

        let just_under = planner.usable_path(&snapshot, start, Position::new(24, 0));
        assert_eq!(just_under.map(|path| path.len()), Some(24));

        assert!(planner.usable_path(&snapshot, start, Position::new(25, 0)).is_none());
        assert_eq!(
            planner
                .compute_path(&snapshot, start, Position::new(25, 0))
                .map(|path| path.len()),
            Some(25)
        );
    }

    #[test]
    fn test_orthogonal_only_planner() {
        let planner = PathPlanner::new(MovementConfig::orthogonal_only());
        let snapshot = open_snapshot(5, 5);
        let path = planner
            .compute_path(&snapshot, Position::new(0, 0), Position::new(2, 2))
            .unwrap();

        assert_eq!(path.len(), 4);
        assert!((path.cost() - 4.0).abs() < 1e-9);
        for pair in std::iter::once(Position::new(0, 0))
            .chain(path.steps().iter().copied())
            .collect::<Vec<_>>()
            .windows(2)
        {
            assert_eq!((pair[1] - pair[0]).x.abs() + (pair[1] - pair[0]).y.abs(), 1);
        }
    }

    #[test]
    fn test_transparency_does_not_gate_movement() {
        // Opaque but walkable cells do not exist in terrain, so build one by hand.
        let map = GameMap::new(3, 1);
        let mut snapshot = WalkabilityMap::from_terrain(&map);
        snapshot.cells[1].transparent = false;

        let path = PathPlanner::default()
            .compute_path(&snapshot, Position::new(0, 0), Position::new(2, 0))
            .unwrap();
        assert_eq!(path.steps(), &[Position::new(1, 0), Position::new(2, 0)]);
        assert!(!snapshot.has_line_of_sight(Position::new(0, 0), Position::new(2, 0)));
    }

    #[test]
    fn test_line_of_sight_to_adjacent_and_self() {
        let snapshot = WalkabilityMap::from_terrain(&GameMap::from_rows(&["#.#"]).unwrap());
        assert!(snapshot.has_line_of_sight(Position::new(1, 0), Position::new(1, 0)));
        assert!(snapshot.has_line_of_sight(Position::new(1, 0), Position::new(0, 0)));
    }

    #[test]
    fn test_movement_config_from_partial_json() {
        let config: MovementConfig = serde_json::from_str(r#"{"max_path_length": 40}"#).unwrap();
        assert_eq!(config.max_path_length, 40);
        assert_eq!(config.diagonal_cost, DIAGONAL_COST);
    }
}
