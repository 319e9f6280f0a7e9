//! V-carve of a square: the toolpath must follow the diagonals, reach the
//! half-width depth at the centre, and split into pass-depth rounds.

use opencut_cam::vpocket;
use opencut_types::{Point, Polygon};

const SIDE: i32 = 10_000;
const PASS: i32 = 1_000;

fn square() -> Polygon {
    vec![
        Point::new(0, 0),
        Point::new(SIDE, 0),
        Point::new(SIDE, SIDE),
        Point::new(0, SIDE),
    ]
}

#[test]
fn s5_vcarve_square_follows_the_diagonals() {
    let paths = vpocket(&vec![square()], 60.0, PASS, -1_000_000).unwrap();
    assert!(!paths.is_empty());

    // Depth at the centre: half the side divided by tan(30 deg).
    let expected_depth = (SIDE as f64 / 2.0) / (30.0_f64.to_radians().tan());

    let mut min_z = 0;
    for path in &paths {
        assert!(path.len() >= 2);
        // Surface-level entry and exit.
        assert_eq!(path.first().unwrap().z, 0);
        assert_eq!(path.last().unwrap().z, 0);
        for p in path {
            // Every point lies on a diagonal of the square.
            let dx = (p.x - SIDE / 2).abs();
            let dy = (p.y - SIDE / 2).abs();
            assert!(
                (dx - dy).abs() <= 3,
                "point ({}, {}) is off the diagonals",
                p.x,
                p.y
            );
            assert!(p.x >= -3 && p.x <= SIDE + 3 && p.y >= -3 && p.y <= SIDE + 3);
            assert!(p.z <= 0);
            min_z = min_z.min(p.z);
        }
    }
    assert!(
        (min_z as f64 + expected_depth).abs() <= 5.0,
        "centre depth {} vs expected {}",
        min_z,
        -expected_depth
    );

    // A span reaching the centre runs ceil(depth / pass) passes, each
    // touching the centre at its own depth.
    let expected_passes = (expected_depth / PASS as f64).ceil() as usize;
    let deepest = paths
        .iter()
        .find(|path| path.iter().any(|p| p.z == min_z))
        .unwrap();
    let mut centre_depths: Vec<i32> = deepest
        .iter()
        .filter(|p| (p.x - SIDE / 2).abs() <= 3 && (p.y - SIDE / 2).abs() <= 3)
        .map(|p| p.z)
        .collect();
    centre_depths.sort();
    centre_depths.dedup();
    assert!(
        centre_depths.len() >= expected_passes,
        "{} distinct centre depths, expected at least {}",
        centre_depths.len(),
        expected_passes
    );
}

#[test]
fn vcarve_depth_is_clamped_by_max_depth() {
    let paths = vpocket(&vec![square()], 60.0, PASS, -2_000).unwrap();
    assert!(!paths.is_empty());
    for path in &paths {
        for p in path {
            assert!(p.z >= -2_000);
        }
    }
    let min_z = paths
        .iter()
        .flat_map(|p| p.iter().map(|q| q.z))
        .min()
        .unwrap();
    assert_eq!(min_z, -2_000);
}

#[test]
fn vcarve_rejects_degenerate_input() {
    let tiny = vec![vec![Point::new(0, 0), Point::new(1, 0)]];
    assert!(vpocket(&tiny, 60.0, PASS, -1000).is_err());
}

#[test]
fn vcarve_rejects_bad_angles() {
    assert!(vpocket(&vec![square()], 0.0, PASS, -1000).is_err());
    assert!(vpocket(&vec![square()], 180.0, PASS, -1000).is_err());
    assert!(vpocket(&vec![square()], 60.0, -5, -1000).is_err());
    assert!(vpocket(&vec![square()], 60.0, PASS, 5).is_err());
}
