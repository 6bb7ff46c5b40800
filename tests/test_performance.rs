//! Performance tests for per-turn snapshot building and path planning

use delver::config::{DEFAULT_SCENARIO_TURNS, MAX_PATH_LENGTH};
use delver::{DelverResult, GameMap, Object, ObjectRegistry, PathPlanner, Position, Tile, WalkabilityMap};
use std::time::Instant;

/// 80x40 level with a wall every fourth column, each with a single gap.
fn pillared_level() -> DelverResult<GameMap> {
    let mut map = GameMap::new(80, 40);
    for x in (4..80).step_by(4) {
        let gap = (x * 7) % 40;
        for y in 0..40 {
            if y != gap {
                map.set_tile(Position::new(x, y), Tile::wall())?;
            }
        }
    }
    Ok(map)
}

#[test]
fn test_snapshot_build_performance() -> DelverResult<()> {
    let map = pillared_level()?;
    let mut objects = ObjectRegistry::new();
    for i in 0..200 {
        objects.add(Object::new((i * 13) % 80, (i * 7) % 40, 'g', "goblin", true));
    }

    let start = Instant::now();
    let iterations = 200;
    for _ in 0..iterations {
        let _snapshot = WalkabilityMap::build(&map, &objects, &[]);
    }
    let elapsed = start.elapsed();
    let average = elapsed / iterations;

    println!("Average snapshot build time: {:?}", average);
    assert!(
        average.as_millis() < 5,
        "Snapshot building too slow: {:?}",
        average
    );
    Ok(())
}

#[test]
fn test_unreachable_goal_planning_performance() -> DelverResult<()> {
    // Worst case for a turn: the search floods the whole level before
    // giving up.
    let mut map = pillared_level()?;
    for (dx, dy) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
        map.set_tile(Position::new(78 + dx, 20 + dy), Tile::wall())?;
    }
    let snapshot = WalkabilityMap::from_terrain(&map);
    let planner = PathPlanner::default();

    let start = Instant::now();
    let iterations = DEFAULT_SCENARIO_TURNS;
    for _ in 0..iterations {
        assert!(planner
            .compute_path(&snapshot, Position::new(1, 1), Position::new(78, 20))
            .is_none());
    }
    let average = start.elapsed() / iterations;

    println!("Average failed search time: {:?}", average);
    assert!(
        average.as_millis() < 50,
        "Failed searches too slow: {:?}",
        average
    );
    Ok(())
}

#[test]
fn test_capped_paths_stay_short() -> DelverResult<()> {
    let map = pillared_level()?;
    let snapshot = WalkabilityMap::from_terrain(&map);
    let planner = PathPlanner::default();

    for x in (1..80).step_by(3) {
        if let Some(path) = planner.usable_path(&snapshot, Position::new(1, 1), Position::new(x, 1)) {
            assert!(path.len() < MAX_PATH_LENGTH);
        }
    }
    Ok(())
}
