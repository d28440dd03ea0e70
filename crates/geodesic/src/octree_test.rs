use nalgebra::Point3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::error::GeodesicError;
use crate::grid::MeshGrid;
use crate::octree::{BoundingBox, Octree, nearest_by_scan};
use manifold::Torus;

fn random_points(rng: &mut ChaChaRng, count: usize, extent: f64) -> Vec<Point3<f64>> {
    (0..count)
        .map(|_| {
            Point3::new(
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
            )
        })
        .collect()
}

#[test]
fn test_empty_tree() {
    let points: Vec<Point3<f64>> = vec![];
    let tree = Octree::build(&points, 4).unwrap();

    assert_eq!(tree.node_count(), 0);
    assert!(tree.root().is_empty());
    assert_eq!(tree.nearest(&Point3::origin()), None);
}

#[test]
fn test_single_point() {
    let points = vec![Point3::new(1.0, 2.0, 3.0)];
    let tree = Octree::build(&points, 4).unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.nearest(&Point3::new(-50.0, 0.0, 9.0)), Some(0));
}

#[test]
fn test_zero_bucket_size_rejected() {
    let points = vec![Point3::origin()];
    assert!(matches!(
        Octree::build(&points, 0),
        Err(GeodesicError::InvalidGrid(_))
    ));
}

#[test]
fn test_every_point_in_exactly_one_leaf() {
    let mut rng = ChaChaRng::seed_from_u64(5);
    let points = random_points(&mut rng, 500, 10.0);
    let tree = Octree::build(&points, 8).unwrap();

    let mut seen = vec![0usize; points.len()];
    for leaf in tree.leaves() {
        for entry in leaf {
            seen[entry.index as usize] += 1;
            assert_eq!(entry.position, points[entry.index as usize]);
        }
    }
    assert!(seen.iter().all(|&count| count == 1));
    assert_eq!(tree.len(), points.len());
}

#[test]
fn test_leaves_respect_bucket_size() {
    let mut rng = ChaChaRng::seed_from_u64(6);
    let points = random_points(&mut rng, 300, 4.0);
    let tree = Octree::build(&points, 5).unwrap();

    assert!(tree.leaves().all(|leaf| leaf.len() <= 5));
    assert!(tree.node_count() > 1);
}

#[test]
fn test_coincident_points_share_a_leaf() {
    let points = vec![Point3::new(1.0, 1.0, 1.0); 10];
    let tree = Octree::build(&points, 2).unwrap();

    assert_eq!(tree.leaves().map(|leaf| leaf.len()).sum::<usize>(), 10);
    // Ties resolve to the lowest index
    assert_eq!(tree.nearest(&Point3::new(1.0, 1.0, 1.0)), Some(0));
}

#[test]
fn test_nearest_matches_linear_scan_random_cloud() {
    let mut rng = ChaChaRng::seed_from_u64(7);
    let points = random_points(&mut rng, 400, 5.0);
    let tree = Octree::build(&points, 6).unwrap();

    for query in random_points(&mut rng, 300, 8.0) {
        assert_eq!(tree.nearest(&query), nearest_by_scan(&points, &query));
    }
}

#[test]
fn test_nearest_matches_linear_scan_on_torus_mesh() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let grid = MeshGrid::sample(&torus, 24, 12).unwrap();
    let tree = Octree::build(grid.points(), 4).unwrap();
    let mut rng = ChaChaRng::seed_from_u64(8);

    for query in random_points(&mut rng, 300, 4.5) {
        assert_eq!(tree.nearest(&query), nearest_by_scan(grid.points(), &query));
    }
    // Querying a vertex returns that vertex
    for v in [0, 17, 100, 287] {
        assert_eq!(tree.nearest(&grid.point(v)), Some(v));
    }
}

#[test]
fn test_root_box_is_a_cube_containing_all_points() {
    let points = vec![
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(3.0, 1.0, 0.5),
        Point3::new(0.0, -2.0, 0.0),
    ];
    let bounds = BoundingBox::cube_around(&points);
    let extent = bounds.max - bounds.min;

    assert_eq!(extent.x, extent.y);
    assert_eq!(extent.y, extent.z);
    for p in &points {
        assert_eq!(bounds.distance_squared(p), 0.0);
    }
}
