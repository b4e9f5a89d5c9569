//! Radius kernels: horizontal neighbour offsets within a physical distance
//!
//! A kernel lists every cell whose centre lies within `radius_km` of an origin
//! cell, as `(jx, jy)` index offsets plus the matching row-major linear offset
//! `jy * nx + jx`. The same construction serves the texture neighbourhood and
//! the convective radius of influence.

use super::geometry::GridGeometry;
use crate::error::ConvStratError;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// One neighbour offset relative to the origin cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelPoint {
    /// Column offset
    pub jx: isize,
    /// Row offset
    pub jy: isize,
    /// Linear offset into a row-major horizontal level
    pub offset: isize,
    /// Distance from the origin cell centre (km)
    pub dist_km: f32,
}

/// Neighbour offsets within a radius, for one grid geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    radius_km: f32,
    nx: usize,
    ny: usize,
    points: Vec<KernelPoint>,
}

/// Largest kernel bounding box, in cells, that `Kernel::build` will enumerate
pub const MAX_KERNEL_CELLS: usize = 1 << 20;

impl Kernel {
    /// Build the kernel for `radius_km` on `geometry`
    ///
    /// Enumerates all `(jx, jy)` with `(jx·dx)² + (jy·dy)² ≤ radius²`, where the
    /// spacing comes from [`GridGeometry::spacing_km`]. Points are ordered row by
    /// row. Returns an empty kernel when the radius or spacing is not positive.
    ///
    /// # Errors
    ///
    /// Returns `ConvStratError::KernelTooLarge` when the bounding box
    /// `(2·⌊r/dx⌋+1)·(2·⌊r/dy⌋+1)` exceeds [`MAX_KERNEL_CELLS`].
    pub fn build(geometry: &GridGeometry, radius_km: f32) -> Result<Self, ConvStratError> {
        let (dx_km, dy_km) = geometry.spacing_km();
        let nx = geometry.nx();
        let ny = geometry.ny();

        let degenerate = !(radius_km.is_finite() && radius_km > 0.0)
            || !(dx_km.is_finite() && dx_km > 0.0)
            || !(dy_km.is_finite() && dy_km > 0.0);
        if degenerate {
            return Ok(Self {
                radius_km,
                nx,
                ny,
                points: Vec::new(),
            });
        }

        let too_large = ConvStratError::KernelTooLarge {
            radius_km,
            limit: MAX_KERNEL_CELLS,
        };
        let half_x = (f64::from(radius_km) / f64::from(dx_km)).floor();
        let half_y = (f64::from(radius_km) / f64::from(dy_km)).floor();
        if (2.0 * half_x + 1.0) * (2.0 * half_y + 1.0) > MAX_KERNEL_CELLS as f64 {
            return Err(too_large);
        }
        let nx_kernel = half_x as isize;
        let ny_kernel = half_y as isize;
        let radius_sq = radius_km * radius_km;
        let row = isize::try_from(nx).map_err(|_| too_large.clone())?;

        let mut points = Vec::new();
        for jy in -ny_kernel..=ny_kernel {
            let y_km = jy as f32 * dy_km;
            for jx in -nx_kernel..=nx_kernel {
                let x_km = jx as f32 * dx_km;
                let dist_sq = x_km * x_km + y_km * y_km;
                if dist_sq <= radius_sq {
                    let offset = jy
                        .checked_mul(row)
                        .and_then(|o| o.checked_add(jx))
                        .ok_or_else(|| too_large.clone())?;
                    points.push(KernelPoint {
                        jx,
                        jy,
                        offset,
                        dist_km: dist_sq.sqrt(),
                    });
                }
            }
        }

        Ok(Self {
            radius_km,
            nx,
            ny,
            points,
        })
    }

    #[must_use]
    pub fn radius_km(&self) -> f32 {
        self.radius_km
    }

    /// Number of offsets, including the origin
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[KernelPoint] {
        &self.points
    }

    /// Horizontal indices of the kernel cells around `(ix, iy)` that fall
    /// inside the grid
    pub fn neighbours(&self, ix: usize, iy: usize) -> impl Iterator<Item = usize> + '_ {
        let nx = self.nx as isize;
        let ny = self.ny as isize;
        let (cx, cy) = (ix as isize, iy as isize);
        let centre = cy * nx + cx;
        self.points.iter().filter_map(move |p| {
            let x = cx + p.jx;
            let y = cy + p.jy;
            if x < 0 || y < 0 || x >= nx || y >= ny {
                None
            } else {
                Some((centre + p.offset) as usize)
            }
        })
    }
}

/// Kernels memoized per radius, valid for one geometry version
///
/// `ConvStrat` bumps its geometry version on every `set_grid`; the next lookup
/// with a new version drops all cached kernels.
#[derive(Debug, Default)]
pub struct KernelCache {
    version: u64,
    kernels: FxHashMap<u32, Arc<Kernel>>,
}

impl KernelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the kernel for `radius_km`, building it if absent or stale
    ///
    /// # Errors
    ///
    /// Propagates `ConvStratError::KernelTooLarge` from [`Kernel::build`];
    /// nothing is cached in that case.
    pub fn get_or_build(
        &mut self,
        geometry: &GridGeometry,
        version: u64,
        radius_km: f32,
    ) -> Result<Arc<Kernel>, ConvStratError> {
        if version != self.version {
            self.kernels.clear();
            self.version = version;
        }
        let key = radius_km.to_bits();
        if let Some(kernel) = self.kernels.get(&key) {
            return Ok(Arc::clone(kernel));
        }

        let kernel = Arc::new(Kernel::build(geometry, radius_km)?);
        debug!(
            "Built kernel: radius={:.2}km, {} points, grid {}x{}",
            radius_km,
            kernel.len(),
            geometry.nx(),
            geometry.ny()
        );
        self.kernels.insert(key, Arc::clone(&kernel));
        Ok(kernel)
    }

    /// Drop kernels whose radius is not in `radii_km`
    pub fn retain_radii(&mut self, radii_km: &[f32]) {
        self.kernels
            .retain(|key, _| radii_km.iter().any(|r| r.to_bits() == *key));
    }

    /// Whether kernels for every radius in `radii_km` are cached for `version`
    #[must_use]
    pub fn is_current(&self, version: u64, radii_km: &[f32]) -> bool {
        version == self.version
            && radii_km
                .iter()
                .all(|r| self.kernels.contains_key(&r.to_bits()))
    }

    /// Drop every cached kernel
    pub fn clear(&mut self) {
        self.kernels.clear();
    }

    /// Number of cached kernels
    #[must_use]
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(nx: usize, ny: usize, dx: f32, dy: f32) -> GridGeometry {
        GridGeometry::new(nx, ny, dx, dy, vec![1.0]).unwrap()
    }

    fn build(geometry: &GridGeometry, radius_km: f32) -> Kernel {
        Kernel::build(geometry, radius_km).unwrap()
    }

    #[test]
    fn test_unit_radius_is_plus_shape() {
        let kernel = build(&flat(5, 5, 1.0, 1.0), 1.0);
        let mut offsets: Vec<(isize, isize)> =
            kernel.points().iter().map(|p| (p.jx, p.jy)).collect();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_diagonals_within_one_and_a_half_cells() {
        // Diagonal neighbours sit at sqrt(2) ~ 1.414
        let kernel = build(&flat(5, 5, 1.0, 1.0), 1.5);
        assert_eq!(kernel.len(), 9);
        assert!(kernel
            .points()
            .iter()
            .all(|p| p.jx.abs() <= 1 && p.jy.abs() <= 1));
    }

    #[test]
    fn test_linear_offsets_are_row_major() {
        let kernel = build(&flat(7, 4, 1.0, 1.0), 1.0);
        for p in kernel.points() {
            assert_eq!(p.offset, p.jy * 7 + p.jx);
        }
    }

    #[test]
    fn test_radius_boundary_inclusive() {
        // (3, 0) lies exactly on the radius, (2, 3) is just outside it
        let kernel = build(&flat(20, 20, 1.0, 1.0), 3.0);
        assert!(kernel.points().iter().any(|p| p.jx == 3 && p.jy == 0));
        assert!(!kernel.points().iter().any(|p| p.jx == 2 && p.jy == 3));
        // Lattice points within radius 3 of the origin
        assert_eq!(kernel.len(), 29);
    }

    #[test]
    fn test_anisotropic_spacing() {
        // dy twice dx: only the centre row reaches +/-2 columns
        let kernel = build(&flat(10, 10, 1.0, 2.0), 2.0);
        let mut offsets: Vec<(isize, isize)> =
            kernel.points().iter().map(|p| (p.jx, p.jy)).collect();
        offsets.sort_unstable();
        assert_eq!(
            offsets,
            vec![(-2, 0), (-1, 0), (0, -1), (0, 0), (0, 1), (1, 0), (2, 0)]
        );
    }

    #[test]
    fn test_degenerate_radius_gives_empty_kernel() {
        let geometry = flat(5, 5, 1.0, 1.0);
        assert!(build(&geometry, 0.0).is_empty());
        assert!(build(&geometry, -2.0).is_empty());
        assert!(build(&geometry, f32::NAN).is_empty());
    }

    #[test]
    fn test_degenerate_spacing_gives_empty_kernel() {
        // Only reachable through deserialization, which skips validation
        let geometry: GridGeometry = serde_json::from_str(
            r#"{"nx":5,"ny":5,"dx":0.0,"dy":1.0,"minx":0.0,"miny":0.0,"z_km":[1.0],"proj_is_latlon":false}"#,
        )
        .unwrap();
        assert!(build(&geometry, 2.0).is_empty());
    }

    #[test]
    fn test_lat_lon_uses_km_per_degree() {
        // 0.01 deg ~ 1.11 km, so a 1.5 km radius reaches one cell each way
        let geometry = GridGeometry::lat_lon(10, 10, 0.01, 0.01, vec![1.0]).unwrap();
        let kernel = build(&geometry, 1.5);
        assert_eq!(kernel.len(), 5);
    }

    #[test]
    fn test_neighbours_clip_to_grid() {
        let kernel = build(&flat(5, 5, 1.0, 1.0), 1.0);

        let mut corner: Vec<usize> = kernel.neighbours(0, 0).collect();
        corner.sort_unstable();
        assert_eq!(corner, vec![0, 1, 5]);

        let mut centre: Vec<usize> = kernel.neighbours(2, 2).collect();
        centre.sort_unstable();
        assert_eq!(centre, vec![7, 11, 12, 13, 17]);

        // Right edge must not wrap onto the next row
        let mut edge: Vec<usize> = kernel.neighbours(4, 1).collect();
        edge.sort_unstable();
        assert_eq!(edge, vec![4, 8, 9, 14]);
    }

    #[test]
    fn test_cache_reuses_and_invalidates() {
        let geometry = flat(5, 5, 1.0, 1.0);
        let mut cache = KernelCache::new();

        let a = cache.get_or_build(&geometry, 1, 1.5).unwrap();
        let b = cache.get_or_build(&geometry, 1, 1.5).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.is_current(1, &[1.5]));
        assert!(!cache.is_current(1, &[1.5, 7.0]));

        let c = cache.get_or_build(&geometry, 2, 1.5).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_current(1, &[1.5]));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_tiny_spacing_is_rejected() {
        let geometry = flat(5, 5, 1.0e-30, 1.0);
        assert!(matches!(
            Kernel::build(&geometry, 1.0),
            Err(ConvStratError::KernelTooLarge { .. })
        ));

        // 1e-6 km spacing with a 5 km radius would need ~1e13 cells
        let geometry = flat(5, 5, 1.0e-6, 1.0e-6);
        assert!(Kernel::build(&geometry, 5.0).is_err());
    }

    #[test]
    fn test_largest_allowed_kernel_builds() {
        // 1023 x 1023 bounding box, just under the cell limit
        let kernel = build(&flat(4, 4, 1.0, 1.0), 511.0);
        assert!(!kernel.is_empty());
        assert!(Kernel::build(&flat(4, 4, 1.0, 1.0), 512.0).is_err());
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let geometry = flat(5, 5, 1.0e-30, 1.0);
        let mut cache = KernelCache::new();
        assert!(cache.get_or_build(&geometry, 1, 1.0).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_retain_radii_evicts_others() {
        let geometry = flat(5, 5, 1.0, 1.0);
        let mut cache = KernelCache::new();
        for radius_km in [1.0, 1.5, 2.0, 2.5] {
            cache.get_or_build(&geometry, 1, radius_km).unwrap();
        }
        assert_eq!(cache.len(), 4);

        cache.retain_radii(&[1.5, 2.5]);
        assert_eq!(cache.len(), 2);
        assert!(cache.is_current(1, &[1.5, 2.5]));
        assert!(!cache.is_current(1, &[1.0]));
    }
}
