use std::fs;
use std::panic;

use manifold::Torus;
use tempfile::tempdir;

use crate::adjacency::AdjacencyGraph;
use crate::cache::{FileMeshStore, MemoryMeshStore, MeshStore, NoMeshStore, load_or_compute};
use crate::error::{CacheError, GeodesicError};
use crate::grid::MeshGrid;
use crate::mesh::{GeodesicMesh, GeodesicMeshBuilder};

fn small_mesh(torus: &Torus) -> GeodesicMesh {
    GeodesicMeshBuilder::new(torus)
        .with_resolution(6, 4)
        .with_bucket_size(3)
        .build()
        .unwrap()
}

#[test]
fn file_store_round_trips_every_field() {
    let dir = tempdir().unwrap();
    let store = FileMeshStore::new(dir.path().join("nested").join("mesh.bin"));
    let torus = Torus::new(1.0, 3.0).unwrap();
    let mesh = small_mesh(&torus);

    store.save(&mesh).unwrap();
    let loaded = store.load().unwrap().unwrap();

    assert_eq!(loaded, mesh);
    assert_eq!(loaded.distances().distance(0, 13), mesh.distances().distance(0, 13));
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().unwrap();
    let store = FileMeshStore::new(dir.path().join("absent.bin"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn corrupt_file_is_a_codec_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mesh.bin");
    fs::write(&path, b"definitely not a mesh").unwrap();

    let err = FileMeshStore::new(&path).load().unwrap_err();
    assert!(matches!(err, CacheError::Codec(_)));
}

#[test]
fn corrupt_cache_falls_back_to_compute_and_repersists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mesh.bin");
    fs::write(&path, [0xFF_u8; 16]).unwrap();

    let torus = Torus::new(1.0, 3.0).unwrap();
    let builder = GeodesicMeshBuilder::new(&torus)
        .with_resolution(6, 4)
        .with_bucket_size(3);
    let store = FileMeshStore::new(&path);

    let mesh = builder.load_or_build(&store).unwrap();
    assert_eq!(store.load().unwrap(), Some(mesh));
}

#[test]
fn matching_cached_mesh_skips_compute() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let mesh = small_mesh(&torus);
    let store = MemoryMeshStore::with_mesh(mesh.clone());

    let loaded = load_or_compute(&store, mesh.key(), || {
        panic!("compute must not run when the cache matches")
    })
    .unwrap();
    assert_eq!(loaded, mesh);
}

#[test]
fn stale_cached_mesh_is_rebuilt() {
    let old = small_mesh(&Torus::new(1.0, 3.0).unwrap());
    let store = MemoryMeshStore::with_mesh(old.clone());

    let torus = Torus::new(0.5, 3.0).unwrap();
    let builder = GeodesicMeshBuilder::new(&torus)
        .with_resolution(6, 4)
        .with_bucket_size(3);
    let fresh = builder.load_or_build(&store).unwrap();

    assert_ne!(fresh.key(), old.key());
    assert_eq!(fresh.key(), &builder.key());
    assert_eq!(store.load().unwrap(), Some(fresh));
}

#[test]
fn empty_memory_store_is_populated_after_build() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let store = MemoryMeshStore::new();
    assert!(!store.is_populated());

    GeodesicMeshBuilder::new(&torus)
        .with_resolution(5, 5)
        .load_or_build(&store)
        .unwrap();
    assert!(store.is_populated());
}

#[test]
fn no_store_always_computes() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let mesh = small_mesh(&torus);
    let mut calls = 0;
    for _ in 0..2 {
        load_or_compute(&NoMeshStore, mesh.key(), || {
            calls += 1;
            Ok(mesh.clone())
        })
        .unwrap();
    }
    assert_eq!(calls, 2);
}

#[test]
fn nearest_vertex_and_geodesic_distance_use_the_table() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let mesh = small_mesh(&torus);
    let a = mesh.grid().point(0);
    let b = mesh.grid().point(13);

    assert_eq!(mesh.nearest_vertex(&a), Some(0));
    assert_eq!(mesh.geodesic_distance(&a, &b), mesh.distances().distance(0, 13));
    assert_eq!(mesh.geodesic_distance(&a, &a), 0.0);
}

#[test]
fn poisoned_memory_store_reports_errors() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let mesh = small_mesh(&torus);
    let store = MemoryMeshStore::new();

    let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let _guard = store.slot.lock().unwrap();
        panic!("writer died holding the lock");
    }));

    assert!(matches!(store.save(&mesh), Err(CacheError::Poisoned)));
    assert!(matches!(store.load(), Err(CacheError::Poisoned)));
    assert!(!store.is_populated());
}

#[test]
fn poisoned_store_still_yields_a_computed_mesh() {
    let torus = Torus::new(1.0, 3.0).unwrap();
    let store = MemoryMeshStore::new();
    let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let _guard = store.slot.lock().unwrap();
        panic!("writer died holding the lock");
    }));

    let builder = GeodesicMeshBuilder::new(&torus)
        .with_resolution(6, 4)
        .with_bucket_size(3);
    let mesh = builder.load_or_build(&store).unwrap();
    assert_eq!(mesh.key(), &builder.key());
}

#[test]
fn from_parts_keeps_an_explicit_graph() {
    let grid = MeshGrid::sample(&Torus::new(1.0, 3.0).unwrap(), 4, 4).unwrap();
    let graph = AdjacencyGraph::from_edges(16, &[(0, 1, 1.0), (8, 9, 1.0)]).unwrap();

    let mesh = GeodesicMesh::from_parts(grid, graph, [1.0, 3.0], 4).unwrap();

    assert_eq!(mesh.adjacency().edge_count(), 2);
    assert_eq!(mesh.distances().distance(0, 1), 1.0);
    assert!(mesh.distances().distance(0, 8).is_infinite());
    assert!(mesh.geodesic_distance(&mesh.grid().point(1), &mesh.grid().point(9)).is_infinite());
}

#[test]
fn from_parts_rejects_mismatched_graph() {
    let grid = MeshGrid::sample(&Torus::new(1.0, 3.0).unwrap(), 4, 4).unwrap();
    let graph = AdjacencyGraph::from_edges(3, &[(0, 1, 1.0)]).unwrap();

    let result = GeodesicMesh::from_parts(grid, graph, [1.0, 3.0], 4);
    assert!(matches!(result, Err(GeodesicError::InvalidGrid(_))));
}
