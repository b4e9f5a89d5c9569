//! Reflectivity texture over a radius neighbourhood
//!
//! For each level in the valid height band and each cell, the texture is the
//! standard deviation of dBZ² over the valid samples in the texture kernel:
//!
//! ```text
//! texture = sqrt( mean(dBZ⁴) - mean(dBZ²)² )
//! ```
//!
//! A level contributes only where the valid fraction of the kernel reaches
//! `min_valid_fraction_for_texture`. Per-level textures are averaged into
//! `mean_texture`.
//!
//! Levels are independent, so each one runs as its own Rayon task writing to
//! a disjoint slice of the scratch buffers. The cross-level reduction runs
//! after all tasks have joined.

use super::derived::DerivedFields;
use super::volume::ReflectivityVolume;
use crate::grid::{Kernel, LevelRange};
use crate::params::ConvStratParams;
use rayon::prelude::*;
use tracing::debug;

/// Per-level texture scratch storage, reused between passes
#[derive(Debug, Default)]
pub struct TextureEngine {
    // Texture per (level, cell); None where the level had too few valid samples
    level_texture: Vec<Option<f32>>,
    // Valid fraction of the kernel per (level, cell)
    level_fraction: Vec<f32>,
}

impl TextureEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute `mean_texture`, `fraction_active` and `conv_from_texture`
    pub fn compute(
        &mut self,
        volume: &ReflectivityVolume<'_>,
        levels: LevelRange,
        kernel: &Kernel,
        params: &ConvStratParams,
        fields: &mut DerivedFields,
    ) {
        let nx = fields.partition.width;
        let ny = fields.partition.height;
        let level_size = nx * ny;
        let n_levels = levels.count();

        self.level_texture.clear();
        self.level_texture.resize(n_levels * level_size, None);
        self.level_fraction.clear();
        self.level_fraction.resize(n_levels * level_size, 0.0);

        debug!(
            "Texture: {} levels ({}..={}), kernel {} points",
            n_levels,
            levels.min_iz,
            levels.max_iz,
            kernel.len()
        );

        let min_valid_dbz = params.min_valid_dbz;
        let min_fraction = params.min_valid_fraction_for_texture;

        // One task per level; each owns its level slice of both buffers
        self.level_texture
            .par_chunks_mut(level_size)
            .zip(self.level_fraction.par_chunks_mut(level_size))
            .enumerate()
            .for_each(|(i, (texture_level, fraction_level))| {
                let level = volume.level(levels.min_iz + i);
                for iy in 0..ny {
                    for ix in 0..nx {
                        let cell = iy * nx + ix;
                        let (texture, fraction) = cell_texture(
                            volume,
                            level,
                            kernel,
                            ix,
                            iy,
                            min_valid_dbz,
                            min_fraction,
                        );
                        texture_level[cell] = texture;
                        fraction_level[cell] = fraction;
                    }
                }
            });

        self.reduce(n_levels, level_size, volume.missing(), params, fields);
    }

    /// Average per-level results into the 2D fields
    fn reduce(
        &self,
        n_levels: usize,
        level_size: usize,
        missing: f32,
        params: &ConvStratParams,
        fields: &mut DerivedFields,
    ) {
        let mean_texture = fields.mean_texture.as_mut_slice();
        let fraction_active = fields.fraction_active.as_mut_slice();
        let conv_from_texture = fields.conv_from_texture.as_mut_slice();

        for cell in 0..level_size {
            let mut sum_texture = 0.0_f64;
            let mut n_texture = 0_u32;
            let mut sum_fraction = 0.0_f64;

            for lev in 0..n_levels {
                let k = lev * level_size + cell;
                sum_fraction += f64::from(self.level_fraction[k]);
                if let Some(texture) = self.level_texture[k] {
                    sum_texture += f64::from(texture);
                    n_texture += 1;
                }
            }

            fraction_active[cell] = (sum_fraction / n_levels as f64) as f32;

            if n_texture > 0 {
                let mean = (sum_texture / f64::from(n_texture)) as f32;
                mean_texture[cell] = mean;
                conv_from_texture[cell] = mean >= params.min_texture_for_convection;
            } else {
                mean_texture[cell] = missing;
                conv_from_texture[cell] = false;
            }
        }
    }

    /// Release the scratch buffers
    pub fn release(&mut self) {
        self.level_texture = Vec::new();
        self.level_fraction = Vec::new();
    }
}

/// Texture and valid fraction for one cell on one level
///
/// `n_total` is the full kernel size, so kernel points falling outside the grid
/// count against the valid fraction.
#[inline]
fn cell_texture(
    volume: &ReflectivityVolume<'_>,
    level: &[f32],
    kernel: &Kernel,
    ix: usize,
    iy: usize,
    min_valid_dbz: f32,
    min_fraction: f32,
) -> (Option<f32>, f32) {
    if kernel.is_empty() {
        return (None, 0.0);
    }

    let mut n_valid = 0_u32;
    let mut sum_sq = 0.0_f64;
    let mut sum_sq_sq = 0.0_f64;
    for idx in kernel.neighbours(ix, iy) {
        if let Some(dbz) = volume.valid_dbz(level[idx], min_valid_dbz) {
            let dbz_sq = f64::from(dbz) * f64::from(dbz);
            sum_sq += dbz_sq;
            sum_sq_sq += dbz_sq * dbz_sq;
            n_valid += 1;
        }
    }

    let fraction = n_valid as f32 / kernel.len() as f32;
    if n_valid == 0 || fraction < min_fraction {
        return (None, fraction);
    }

    let n = f64::from(n_valid);
    let mean_sq = sum_sq / n;
    let variance = (sum_sq_sq / n - mean_sq * mean_sq).max(0.0);
    (Some(variance.sqrt() as f32), fraction)
}
