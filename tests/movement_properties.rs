//! Property tests for distances, steering safety and planner optimality.

use delver::{GameMap, MapView, Object, OccupantRegistry, PathPlanner, Position, Tile, WalkabilityMap};
use proptest::prelude::*;

const SIZE: i32 = 12;

fn position() -> impl Strategy<Value = Position> {
    (0..SIZE, 0..SIZE).prop_map(|(x, y)| Position::new(x, y))
}

/// A map with roughly a quarter of its tiles walled.
fn cluttered_map() -> impl Strategy<Value = GameMap> {
    prop::collection::vec(prop::bool::weighted(0.25), (SIZE * SIZE) as usize).prop_map(|walls| {
        let mut map = GameMap::new(SIZE as u32, SIZE as u32);
        for (index, wall) in walls.into_iter().enumerate() {
            if wall {
                let pos = Position::new(index as i32 % SIZE, index as i32 / SIZE);
                map.set_tile(pos, Tile::wall()).expect("in bounds");
            }
        }
        map
    })
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in position(), b in position()) {
        let first = Object::new(a.x, a.y, 'a', "a", true);
        let second = Object::new(b.x, b.y, 'b', "b", false);
        prop_assert_eq!(first.distance_to(&second), second.distance_to(&first));
        prop_assert_eq!(first.distance(a.x, a.y), 0.0);
    }

    #[test]
    fn steering_never_enters_blocked_tiles(
        map in cluttered_map(),
        start in position(),
        target in position(),
        blockers in prop::collection::vec(position(), 0..8),
    ) {
        let mut mover = Object::new(start.x, start.y, 'o', "orc", true);
        let occupants: Vec<Object> = blockers
            .iter()
            .map(|pos| Object::new(pos.x, pos.y, 'T', "troll", true))
            .collect();

        let outcome = mover.move_towards(target.x, target.y, &map, &occupants);

        if let Some(to) = outcome.destination() {
            prop_assert!(!map.is_blocked(to.x, to.y));
            prop_assert!(occupants.blocking_occupant_at(to).is_none());
            prop_assert!(start.is_adjacent(to));
            prop_assert_eq!(mover.position(), to);
        } else {
            prop_assert_eq!(mover.position(), start);
        }
    }

    #[test]
    fn open_grid_paths_match_the_octile_bound(start in position(), goal in position()) {
        let snapshot = WalkabilityMap::from_terrain(&GameMap::new(SIZE as u32, SIZE as u32));
        let path = PathPlanner::default()
            .compute_path(&snapshot, start, goal)
            .expect("open grids are connected");

        let dx = (start.x - goal.x).abs() as f64;
        let dy = (start.y - goal.y).abs() as f64;
        let octile = 1.41 * dx.min(dy) + (dx.max(dy) - dx.min(dy));

        prop_assert!((path.cost() - octile).abs() < 1e-9);
        prop_assert_eq!(path.len() as u32, start.chebyshev_distance(goal));
    }

    #[test]
    fn astar_moves_are_single_legal_steps(
        map in cluttered_map(),
        start in position(),
        goal in position(),
    ) {
        prop_assume!(!map.is_blocked(start.x, start.y));
        let mut mover = Object::new(start.x, start.y, 'o', "orc", true);
        let target = Object::new(goal.x, goal.y, '@', "player", true);

        let outcome = mover.move_astar(&target, &vec![target.clone()], &map);

        match outcome.destination() {
            Some(to) => {
                prop_assert!(start.is_adjacent(to));
                prop_assert!(!map.is_blocked(to.x, to.y));
            }
            None => prop_assert_eq!(mover.position(), start),
        }
    }
}
