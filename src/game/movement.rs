//! # Movement Module
//!
//! Stepping, greedy steering, and path-following for [`Object`]s.
//!
//! Planning and applying are split: [`plan_steer`] and [`plan_astar_move`]
//! only read the map and the occupants and return a [`MoveOutcome`]; the
//! caller then commits the destination to the mover. That way the mover can
//! live inside the occupant list it is being checked against.

use crate::{EntityId, MapView, Object, Occupant, OccupantRegistry, PathPlanner, Position, WalkabilityMap};

/// What a single movement request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Followed the first step of a planned path
    PathStep { to: Position, path_len: usize },
    /// Took a greedy step toward the target
    Steered { to: Position },
    /// The greedy step was refused by terrain or a blocking occupant
    Blocked { attempted: Position },
    /// Already on the target; nothing to do
    Stationary,
}

impl MoveOutcome {
    /// The tile the mover ends up on, if it moved.
    pub fn destination(&self) -> Option<Position> {
        match *self {
            MoveOutcome::PathStep { to, .. } | MoveOutcome::Steered { to } => Some(to),
            MoveOutcome::Blocked { .. } | MoveOutcome::Stationary => None,
        }
    }

    pub fn moved(&self) -> bool {
        self.destination().is_some()
    }
}

/// Unit step from `from` toward `to`: the direction vector divided by its
/// length with each axis rounded to the nearest of -1, 0 and 1.
///
/// Returns `None` when the two positions coincide.
///
/// ```
/// use delver::{steer_step, Position};
///
/// assert_eq!(steer_step(Position::new(0, 0), Position::new(5, 1)), Some((1, 0)));
/// assert_eq!(steer_step(Position::new(0, 0), Position::new(-4, 4)), Some((-1, 1)));
/// assert_eq!(steer_step(Position::new(2, 2), Position::new(2, 2)), None);
/// ```
pub fn steer_step(from: Position, to: Position) -> Option<(i32, i32)> {
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance == 0.0 {
        return None;
    }
    Some(((dx / distance).round() as i32, (dy / distance).round() as i32))
}

/// Plans one greedy step from `from` toward `toward`.
///
/// The step is refused if the destination is blocked terrain or holds any
/// blocking occupant. No occupant is exempt from that check.
pub fn plan_steer<M, R>(from: Position, toward: Position, map: &M, occupants: &R) -> MoveOutcome
where
    M: MapView + ?Sized,
    R: OccupantRegistry + ?Sized,
{
    let Some((dx, dy)) = steer_step(from, toward) else {
        return MoveOutcome::Stationary;
    };
    let destination = from.offset(dx, dy);

    if map.is_blocked(destination.x, destination.y)
        || occupants.blocking_occupant_at(destination).is_some()
    {
        log::trace!("Steering from {} to {} refused", from, destination);
        return MoveOutcome::Blocked {
            attempted: destination,
        };
    }
    MoveOutcome::Steered { to: destination }
}

/// Plans one move of `mover` toward `target` along a bounded shortest path.
///
/// A fresh [`WalkabilityMap`] is built with both the mover and the target
/// left walkable. If the planner finds a usable path the first step is
/// returned; otherwise the move falls back to [`plan_steer`].
pub fn plan_astar_move<M, R>(
    planner: &PathPlanner,
    mover: (EntityId, Position),
    target: (EntityId, Position),
    occupants: &R,
    map: &M,
) -> MoveOutcome
where
    M: MapView + ?Sized,
    R: OccupantRegistry + ?Sized,
{
    let (mover_id, from) = mover;
    let (target_id, goal) = target;
    let snapshot = WalkabilityMap::build(map, occupants, &[mover_id, target_id]);

    match planner.usable_path(&snapshot, from, goal) {
        Some(path) => match path.first_step() {
            Some(step) if step != from => {
                log::debug!("{} follows a {} step path toward {}", mover_id, path.len(), goal);
                MoveOutcome::PathStep {
                    to: step,
                    path_len: path.len(),
                }
            }
            _ => MoveOutcome::Stationary,
        },
        None => {
            log::debug!("{} has no usable path to {}, steering", mover_id, goal);
            plan_steer(from, goal, map, occupants)
        }
    }
}

impl Object {
    /// Shifts the object by `(dx, dy)`. The caller is responsible for having
    /// checked the destination.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        let to = self.position().offset(dx, dy);
        self.set_position(to);
    }

    /// Takes one greedy step toward `(target_x, target_y)` if the destination
    /// is free. Does nothing when already there.
    pub fn move_towards<M, R>(&mut self, target_x: i32, target_y: i32, map: &M, occupants: &R) -> MoveOutcome
    where
        M: MapView + ?Sized,
        R: OccupantRegistry + ?Sized,
    {
        let outcome = plan_steer(self.position(), Position::new(target_x, target_y), map, occupants);
        if let MoveOutcome::Steered { to } = outcome {
            self.move_by(to.x - self.x(), to.y - self.y());
        }
        outcome
    }

    /// Moves one step toward `target` along a path of fewer than 25 steps,
    /// steering directly when no such path exists.
    ///
    /// ```
    /// use delver::{GameMap, MoveOutcome, Object, Position};
    ///
    /// let map = GameMap::new(10, 10);
    /// let mut orc = Object::new(0, 0, 'o', "orc", true);
    /// let player = Object::new(9, 9, '@', "player", true);
    ///
    /// let outcome = orc.move_astar(&player, &Vec::<Object>::new(), &map);
    /// assert!(matches!(outcome, MoveOutcome::PathStep { .. }));
    /// assert_eq!(orc.position(), Position::new(1, 1));
    /// ```
    pub fn move_astar<T, R, M>(&mut self, target: &T, occupants: &R, map: &M) -> MoveOutcome
    where
        T: Occupant + ?Sized,
        R: OccupantRegistry + ?Sized,
        M: MapView + ?Sized,
    {
        self.move_astar_with(&PathPlanner::default(), target, occupants, map)
    }

    /// Same as [`move_astar`](Object::move_astar) with a caller-supplied
    /// planner.
    pub fn move_astar_with<T, R, M>(
        &mut self,
        planner: &PathPlanner,
        target: &T,
        occupants: &R,
        map: &M,
    ) -> MoveOutcome
    where
        T: Occupant + ?Sized,
        R: OccupantRegistry + ?Sized,
        M: MapView + ?Sized,
    {
        let outcome = plan_astar_move(
            planner,
            (self.id(), self.position()),
            (target.id(), target.position()),
            occupants,
            map,
        );
        if let Some(destination) = outcome.destination() {
            self.set_position(destination);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameMap, MovementConfig};

    fn no_one() -> Vec<Object> {
        Vec::new()
    }

    #[test]
    fn test_move_by_is_unchecked() {
        let mut object = Object::new(1, 1, 'o', "orc", true);
        object.move_by(-3, 2);
        assert_eq!(object.position(), Position::new(-2, 3));
    }

    #[test]
    fn test_steer_step_rounds_each_axis() {
        let origin = Position::new(0, 0);
        assert_eq!(steer_step(origin, Position::new(10, 0)), Some((1, 0)));
        assert_eq!(steer_step(origin, Position::new(3, 3)), Some((1, 1)));
        assert_eq!(steer_step(origin, Position::new(1, -2)), Some((0, -1)));
        assert_eq!(steer_step(origin, Position::new(-2, -1)), Some((-1, 0)));
        assert_eq!(steer_step(origin, Position::new(-5, -4)), Some((-1, -1)));
    }

    #[test]
    fn test_move_towards_steps_when_free() {
        let map = GameMap::new(10, 10);
        let mut orc = Object::new(2, 2, 'o', "orc", true);
        let outcome = orc.move_towards(8, 8, &map, &no_one());
        assert_eq!(outcome, MoveOutcome::Steered { to: Position::new(3, 3) });
        assert_eq!(orc.position(), Position::new(3, 3));
    }

    #[test]
    fn test_move_towards_refuses_walls() {
        let map = GameMap::from_rows(&["..#.."]).unwrap();
        let mut orc = Object::new(1, 0, 'o', "orc", true);
        let outcome = orc.move_towards(4, 0, &map, &no_one());
        assert_eq!(outcome, MoveOutcome::Blocked { attempted: Position::new(2, 0) });
        assert_eq!(orc.position(), Position::new(1, 0));
    }

    #[test]
    fn test_move_towards_refuses_blocking_occupants_only() {
        let map = GameMap::new(5, 1);
        let mut orc = Object::new(0, 0, 'o', "orc", true);
        let potion = Object::new(1, 0, '!', "potion", false);
        let troll = Object::new(2, 0, 'T', "troll", true);
        let occupants = vec![potion, troll];

        assert!(orc.move_towards(4, 0, &map, &occupants).moved());
        assert_eq!(orc.position(), Position::new(1, 0));
        assert!(!orc.move_towards(4, 0, &map, &occupants).moved());
        assert_eq!(orc.position(), Position::new(1, 0));
    }

    #[test]
    fn test_move_towards_own_tile_is_a_no_op() {
        let map = GameMap::new(3, 3);
        let mut orc = Object::new(1, 1, 'o', "orc", true);
        assert_eq!(orc.move_towards(1, 1, &map, &no_one()), MoveOutcome::Stationary);
        assert_eq!(orc.position(), Position::new(1, 1));
    }

    #[test]
    fn test_move_towards_never_leaves_the_map() {
        let map = GameMap::new(3, 3);
        let mut orc = Object::new(0, 0, 'o', "orc", true);
        let outcome = orc.move_towards(-5, -5, &map, &no_one());
        assert_eq!(outcome, MoveOutcome::Blocked { attempted: Position::new(-1, -1) });
        assert_eq!(orc.position(), Position::new(0, 0));
    }

    #[test]
    fn test_move_astar_first_step_is_diagonal_on_open_grid() {
        let map = GameMap::new(10, 10);
        let mut orc = Object::new(0, 0, 'o', "orc", true);
        let player = Object::new(9, 9, '@', "player", true);
        let outcome = orc.move_astar(&player, &vec![player.clone()], &map);
        assert_eq!(
            outcome,
            MoveOutcome::PathStep {
                to: Position::new(1, 1),
                path_len: 9
            }
        );
    }

    #[test]
    fn test_move_astar_ignores_mover_and_target_when_blocking() {
        let map = GameMap::new(3, 1);
        let mut orc = Object::new(0, 0, 'o', "orc", true);
        let player = Object::new(2, 0, '@', "player", true);
        let occupants = vec![orc.clone(), player.clone()];

        let outcome = orc.move_astar(&player, &occupants, &map);
        assert_eq!(outcome.destination(), Some(Position::new(1, 0)));
    }

    #[test]
    fn test_move_astar_falls_back_to_steering_when_corridor_is_plugged() {
        let map = GameMap::from_rows(&[
            "#######",
            "#.....#",
            "#######",
        ])
        .unwrap();
        let mut orc = Object::new(1, 1, 'o', "orc", true);
        let player = Object::new(5, 1, '@', "player", true);
        let troll = Object::new(3, 1, 'T', "troll", true);
        let occupants = vec![troll, player.clone()];

        let outcome = orc.move_astar(&player, &occupants, &map);
        assert_eq!(outcome, MoveOutcome::Steered { to: Position::new(2, 1) });
        assert_eq!(orc.position(), Position::new(2, 1));

        let outcome = orc.move_astar(&player, &occupants, &map);
        assert_eq!(outcome, MoveOutcome::Blocked { attempted: Position::new(3, 1) });
        assert_eq!(orc.position(), Position::new(2, 1));
    }

    #[test]
    fn test_move_astar_on_target_stays_put() {
        let map = GameMap::new(3, 3);
        let mut orc = Object::new(1, 1, 'o', "orc", true);
        let ghost = Object::new(1, 1, 'G', "ghost", false);
        assert_eq!(orc.move_astar(&ghost, &no_one(), &map), MoveOutcome::Stationary);
        assert_eq!(orc.position(), Position::new(1, 1));
    }

    #[test]
    fn test_move_astar_with_custom_cap() {
        let map = GameMap::new(12, 1);
        let mut orc = Object::new(0, 0, 'o', "orc", true);
        let player = Object::new(10, 0, '@', "player", true);
        let planner = PathPlanner::new(MovementConfig {
            max_path_length: 5,
            ..MovementConfig::default()
        });

        let outcome = orc.move_astar_with(&planner, &player, &no_one(), &map);
        assert_eq!(outcome, MoveOutcome::Steered { to: Position::new(1, 0) });
    }
}
