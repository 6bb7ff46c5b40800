//! # Scenario Module
//!
//! JSON-described chase setups: a map, a pursuing monster, its quarry and
//! whatever stands in between. Used by the `delver` binary and by tests that
//! want a whole level instead of a hand-built one.

use crate::config::DEFAULT_SCENARIO_TURNS;
use crate::{
    Ai, DelverError, DelverResult, EntityId, Fighter, GameMap, MapView, MoveOutcome,
    MovementConfig, Object, ObjectRegistry, OccupantRegistry, PathPlanner, Position,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_turns() -> u32 {
    DEFAULT_SCENARIO_TURNS
}

/// A chase to simulate.
///
/// # Examples
///
/// ```
/// use delver::Scenario;
///
/// let scenario = Scenario::from_json_str(r######"{
///     "map": ["#####", "#...#", "#####"],
///     "mover": {"x": 1, "y": 1},
///     "target": {"x": 3, "y": 1}
/// }"######).unwrap();
/// assert_eq!(scenario.turns, 50);
/// assert!(scenario.blockers.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Terrain rows: `#` wall, `=` window, `.` floor
    pub map: Vec<String>,
    /// Start of the pursuing monster
    pub mover: Position,
    /// Where the quarry stands
    pub target: Position,
    /// Fixed blocking occupants
    #[serde(default)]
    pub blockers: Vec<Position>,
    /// Extra blocking occupants scattered over free floor
    #[serde(default)]
    pub random_blockers: usize,
    /// Seed for scattering `random_blockers`
    #[serde(default)]
    pub seed: u64,
    /// Turn limit
    #[serde(default = "default_turns")]
    pub turns: u32,
    #[serde(default)]
    pub movement: MovementConfig,
}

impl Scenario {
    /// Parses a scenario from JSON text.
    pub fn from_json_str(json: &str) -> DelverResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a scenario from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> DelverResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded scenario from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Two rooms split by a wall with two doorways. A troll stands in the
    /// southern one, so the orc has to go around through the northern one.
    pub fn corridor() -> Self {
        Self {
            map: [
                "####################",
                "#..................#",
                "#........#.........#",
                "#..................#",
                "#........#.........#",
                "#........#.........#",
                "####################",
            ]
            .iter()
            .map(|row| row.to_string())
            .collect(),
            mover: Position::new(2, 3),
            target: Position::new(17, 3),
            blockers: vec![Position::new(9, 3)],
            random_blockers: 0,
            seed: 0,
            turns: DEFAULT_SCENARIO_TURNS,
            movement: MovementConfig::default(),
        }
    }

    /// Builds the map and objects, checking that everyone starts on floor.
    pub fn build(&self) -> DelverResult<ScenarioWorld> {
        let map = GameMap::from_rows(&self.map)?;
        let mut objects = ObjectRegistry::new();

        let place = |pos: Position, what: &str, objects: &ObjectRegistry| {
            if map.is_blocked(pos.x, pos.y) {
                return Err(DelverError::InvalidScenario(format!(
                    "{} at {} is not on open floor",
                    what, pos
                )));
            }
            if objects.blocking_occupant_at(pos).is_some() {
                return Err(DelverError::InvalidScenario(format!(
                    "{} at {} overlaps another occupant",
                    what, pos
                )));
            }
            Ok(pos)
        };

        let at = place(self.target, "target", &objects)?;
        let target = objects.add(
            Object::new(at.x, at.y, '@', "player", true).with_fighter(Fighter::new(30, 2, 5, 0)),
        );

        let at = place(self.mover, "mover", &objects)?;
        let mover = objects.add(
            Object::new(at.x, at.y, 'o', "orc", true)
                .with_fighter(Fighter::new(10, 0, 3, 35))
                .with_ai(Ai::basic()),
        );

        for &pos in &self.blockers {
            let at = place(pos, "blocker", &objects)?;
            objects.add(
                Object::new(at.x, at.y, 'T', "troll", true)
                    .with_fighter(Fighter::new(16, 1, 4, 100))
                    .with_ai(Ai::basic()),
            );
        }

        scatter_blockers(&map, &mut objects, self.random_blockers, self.seed)?;

        Ok(ScenarioWorld {
            map,
            objects,
            mover,
            target,
            planner: PathPlanner::new(self.movement.clone()),
            turns: self.turns,
        })
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::corridor()
    }
}

/// Places `count` goblins on random free floor tiles.
fn scatter_blockers(
    map: &GameMap,
    objects: &mut ObjectRegistry,
    count: usize,
    seed: u64,
) -> DelverResult<()> {
    if count == 0 {
        return Ok(());
    }

    let mut free: Vec<Position> = (0..map.height as i32)
        .flat_map(|y| (0..map.width as i32).map(move |x| Position::new(x, y)))
        .filter(|pos| !map.is_blocked(pos.x, pos.y) && objects.blocking_occupant_at(*pos).is_none())
        .collect();

    if free.len() < count {
        return Err(DelverError::InvalidScenario(format!(
            "cannot scatter {} blockers over {} free tiles",
            count,
            free.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..count {
        let pos = free.swap_remove(rng.gen_range(0..free.len()));
        objects.add(Object::new(pos.x, pos.y, 'g', "goblin", true).with_ai(Ai::basic()));
    }
    log::debug!("Scattered {} blockers with seed {}", count, seed);
    Ok(())
}

/// A built scenario, ready to be stepped turn by turn.
#[derive(Debug, Clone)]
pub struct ScenarioWorld {
    pub map: GameMap,
    pub objects: ObjectRegistry,
    pub mover: EntityId,
    pub target: EntityId,
    pub planner: PathPlanner,
    pub turns: u32,
}

impl ScenarioWorld {
    /// Whether the mover stands next to the target.
    pub fn mover_adjacent(&self) -> DelverResult<bool> {
        let mover = self.objects.position_of(self.mover)?;
        let target = self.objects.position_of(self.target)?;
        Ok(mover.is_adjacent(target))
    }

    /// Runs one turn of pursuit.
    pub fn step(&mut self) -> DelverResult<MoveOutcome> {
        self.objects
            .move_astar_with(&self.planner, self.mover, self.target, &self.map)
    }

    /// Steps until the mover is adjacent to the target, a move goes nowhere
    /// twice in a row, or the turn limit runs out.
    pub fn run(&mut self) -> DelverResult<Vec<MoveOutcome>> {
        let mut outcomes = Vec::new();
        while outcomes.len() < self.turns as usize && !self.mover_adjacent()? {
            let outcome = self.step()?;
            outcomes.push(outcome);

            let stuck = outcomes
                .iter()
                .rev()
                .take(2)
                .filter(|outcome| !outcome.moved())
                .count();
            if stuck == 2 {
                log::info!("Mover made no progress for two turns, giving up");
                break;
            }
        }
        Ok(outcomes)
    }

    /// The map with every object drawn over it, later objects on top.
    pub fn render(&self) -> Vec<String> {
        let mut rows: Vec<Vec<char>> = self
            .map
            .to_rows()
            .into_iter()
            .map(|row| row.chars().collect())
            .collect();

        for object in self.objects.iter() {
            let pos = object.position();
            if let Some(cell) = rows
                .get_mut(pos.y as usize)
                .and_then(|row| row.get_mut(pos.x as usize))
            {
                *cell = object.glyph;
            }
        }

        rows.into_iter().map(|row| row.into_iter().collect()).collect()
    }
}
