mod common;

use battlegrid::PathHelper;
use common::{parse_move_scenario, seeded_rng, settings};
use std::fs;
use std::path::PathBuf;

/// Run every board scenario under test_data/move: parse the board, run the
/// reachability search and check the marked cells.
#[test]
fn move_scenarios() {
    let dir = PathBuf::from("test_data/move");
    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
        .expect("test_data/move directory should exist")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "txt").unwrap_or(false))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "No scenario files found in {:?}", dir);

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let scenario = parse_move_scenario(&path)
            .unwrap_or_else(|e| panic!("{}: failed to parse: {}", name, e));

        let helper = PathHelper::new(settings(scenario.grid_size));
        let mut rng = seeded_rng();
        let move_path = helper.get_move_path(
            scenario.origin,
            &scenario.matrix,
            scenario.steps,
            None,
            &scenario.profile,
            &mut rng,
        );

        for cell in &scenario.must_reach {
            assert!(
                move_path.reachable.contains(cell),
                "{}: expected ({},{}) to be reachable, got {:?}",
                name,
                cell.x,
                cell.y,
                move_path.cells
            );
        }
        for cell in &scenario.must_not_reach {
            assert!(
                !move_path.reachable.contains(cell),
                "{}: expected ({},{}) to be unreachable, got {:?}",
                name,
                cell.x,
                cell.y,
                move_path.cells
            );
        }
    }
}
