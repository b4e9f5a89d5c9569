//! Shared helpers for the partition integration tests
#![allow(dead_code)]

use conv_strat_core::{ConvStrat, GridGeometry, PartitionCategory};
use tracing_subscriber::EnvFilter;

pub const MISSING: f32 = -9999.0;

/// Install a test subscriber before any test runs; honours `RUST_LOG`
#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Flat single-level grid with 1 km spacing
pub fn flat_grid(nx: usize, ny: usize) -> GridGeometry {
    GridGeometry::new(nx, ny, 1.0, 1.0, vec![1.0]).unwrap()
}

/// Engine with `geometry` already set
pub fn engine_with_grid(geometry: GridGeometry) -> ConvStrat {
    let mut engine = ConvStrat::new();
    engine.set_grid(geometry).unwrap();
    engine
}

/// Volume filled by `f(ix, iy, iz)` in `(z, y, x)` order
pub fn volume_from(geometry: &GridGeometry, f: impl Fn(usize, usize, usize) -> f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(geometry.volume_size());
    for iz in 0..geometry.nz() {
        for iy in 0..geometry.ny() {
            for ix in 0..geometry.nx() {
                data.push(f(ix, iy, iz));
            }
        }
    }
    data
}

/// Deterministic textured volume spanning roughly 10..50 dBZ
pub fn textured_volume(geometry: &GridGeometry) -> Vec<f32> {
    volume_from(geometry, |ix, iy, iz| {
        10.0 + ((ix * 7 + iy * 13 + iz * 5) % 9) as f32 * 5.0
    })
}

pub fn count(partition: &[PartitionCategory], category: PartitionCategory) -> usize {
    partition.iter().filter(|&&c| c == category).count()
}
