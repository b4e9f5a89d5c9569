//! Convective/stratiform partition orchestrator
//!
//! `ConvStrat` owns the thresholds, the grid geometry, the cached kernels and
//! every derived field. A pass validates all input first, so a rejected call
//! never disturbs the results of the previous successful one.

use crate::error::ConvStratError;
use crate::grid::{GridGeometry, KernelCache};
use crate::params::ConvStratParams;
use crate::partition::{
    classify, compute_col_max, DerivedFields, PartitionCategory, PartitionStats,
    ReflectivityVolume, TextureEngine,
};
use tracing::{debug, info, warn};

/// Lifecycle of a [`ConvStrat`] instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvStratState {
    /// No grid geometry set
    Unconfigured,
    /// Geometry set; kernels not built for the current geometry and radii
    GridSet,
    /// Kernels built; no results held
    Ready,
    /// Results from the last successful pass are available
    Computed,
}

/// Convective/stratiform partition engine
///
/// ```
/// use conv_strat_core::{ConvStrat, GridGeometry, PartitionCategory};
///
/// let mut engine = ConvStrat::new();
/// engine.set_grid(GridGeometry::new(5, 5, 1.0, 1.0, vec![1.0]).unwrap()).unwrap();
/// engine.set_min_valid_dbz(-10.0);
/// engine.set_dbz_for_definite_convection(45.0);
/// engine.set_convective_radius_km(1.5);
///
/// let mut dbz = vec![20.0_f32; 25];
/// dbz[12] = 55.0;
/// engine.compute_partition(&dbz, -9999.0).unwrap();
///
/// let partition = engine.partition().unwrap();
/// assert_eq!(partition[12], PartitionCategory::Convective);
/// assert_eq!(partition[0], PartitionCategory::Stratiform);
/// ```
#[derive(Debug, Default)]
pub struct ConvStrat {
    params: ConvStratParams,
    geometry: Option<GridGeometry>,
    // Bumped by every set_grid; keys the kernel cache
    geometry_version: u64,
    kernels: KernelCache,
    texture: TextureEngine,
    fields: Option<DerivedFields>,
    stats: Option<PartitionStats>,
}

impl ConvStrat {
    /// Create an unconfigured engine with default thresholds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unconfigured engine with the given thresholds
    #[must_use]
    pub fn with_params(params: ConvStratParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Set the grid geometry
    ///
    /// Invalidates all cached kernels and discards previous results, since
    /// their shape may no longer match.
    ///
    /// # Errors
    ///
    /// Returns `ConvStratError::InvalidGeometry` if the geometry fails
    /// validation; the current geometry and results are then kept.
    pub fn set_grid(&mut self, geometry: GridGeometry) -> Result<(), ConvStratError> {
        if let Err(err) = geometry.validate() {
            warn!("Rejected grid geometry: {}", err);
            return Err(err);
        }

        info!(
            "Grid set: {}x{}x{}, dx={} dy={}, latlon={}",
            geometry.nx(),
            geometry.ny(),
            geometry.nz(),
            geometry.dx(),
            geometry.dy(),
            geometry.proj_is_latlon()
        );

        self.geometry = Some(geometry);
        self.geometry_version += 1;
        self.kernels.clear();
        self.fields = None;
        self.stats = None;
        Ok(())
    }

    /// Current grid geometry, if set
    #[must_use]
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.geometry.as_ref()
    }

    /// Replace all thresholds at once
    pub fn set_params(&mut self, params: ConvStratParams) {
        self.params = params;
    }

    #[must_use]
    pub fn params(&self) -> &ConvStratParams {
        &self.params
    }

    pub fn set_min_valid_height_km(&mut self, value: f32) {
        self.params.min_valid_ht_km = value;
    }

    pub fn set_max_valid_height_km(&mut self, value: f32) {
        self.params.max_valid_ht_km = value;
    }

    pub fn set_min_valid_dbz(&mut self, value: f32) {
        self.params.min_valid_dbz = value;
    }

    pub fn set_dbz_for_definite_convection(&mut self, value: f32) {
        self.params.dbz_for_definite_convection = value;
    }

    pub fn set_convective_radius_km(&mut self, value: f32) {
        self.params.convective_radius_km = value;
    }

    pub fn set_texture_radius_km(&mut self, value: f32) {
        self.params.texture_radius_km = value;
    }

    pub fn set_min_valid_fraction_for_texture(&mut self, value: f32) {
        self.params.min_valid_fraction_for_texture = value;
    }

    pub fn set_min_texture_for_convection(&mut self, value: f32) {
        self.params.min_texture_for_convection = value;
    }

    // ------------------------------------------------------------------
    // Computation
    // ------------------------------------------------------------------

    /// Partition a reflectivity volume
    ///
    /// `dbz` holds `nx * ny * nz` samples in `(z, y, x)` order; samples equal
    /// to `missing` are treated as absent, and `missing` is written to every
    /// undefined cell of the float outputs.
    ///
    /// # Errors
    ///
    /// Fails before any computation if the grid is not set, a threshold is
    /// invalid, the volume size does not match the grid, no level lies in
    /// the valid height band, or a radius spans more than
    /// [`MAX_KERNEL_CELLS`](crate::grid::MAX_KERNEL_CELLS) cells.
    /// Previous results are left untouched.
    pub fn compute_partition(&mut self, dbz: &[f32], missing: f32) -> Result<(), ConvStratError> {
        let result = self.run_partition(dbz, missing);
        if let Err(err) = &result {
            warn!("Partition rejected: {}", err);
        }
        result
    }

    fn run_partition(&mut self, dbz: &[f32], missing: f32) -> Result<(), ConvStratError> {
        let geometry = self.geometry.as_ref().ok_or(ConvStratError::GridNotSet)?;
        self.params.validate()?;
        let volume = ReflectivityVolume::new(dbz, geometry, missing)?;
        let levels = geometry
            .level_range(self.params.min_valid_ht_km, self.params.max_valid_ht_km)
            .ok_or(ConvStratError::EmptyHeightRange {
                min_ht_km: self.params.min_valid_ht_km,
                max_ht_km: self.params.max_valid_ht_km,
            })?;

        // Validated geometry and positive radii always yield at least the
        // origin point, so kernels are never empty past this point.
        let texture_kernel = self.kernels.get_or_build(
            geometry,
            self.geometry_version,
            self.params.texture_radius_km,
        )?;
        let convective_kernel = self.kernels.get_or_build(
            geometry,
            self.geometry_version,
            self.params.convective_radius_km,
        )?;
        self.kernels.retain_radii(&[
            self.params.texture_radius_km,
            self.params.convective_radius_km,
        ]);

        let (nx, ny) = (geometry.nx(), geometry.ny());
        let fields = match self.fields.take() {
            Some(mut fields) if fields.has_shape(nx, ny) => {
                fields.reset(missing);
                fields
            }
            _ => DerivedFields::new(nx, ny, missing),
        };
        let fields = self.fields.insert(fields);

        debug!(
            "Partition pass: levels {}..={} ({} to {} km)",
            levels.min_iz, levels.max_iz, self.params.min_valid_ht_km, self.params.max_valid_ht_km
        );

        compute_col_max(&volume, levels, &self.params, fields);
        self.texture
            .compute(&volume, levels, &texture_kernel, &self.params, fields);
        classify(&convective_kernel, missing, fields);

        let stats = PartitionStats::from_fields(fields);
        info!(
            "Partition computed: {} convective, {} stratiform, {} missing ({} col-max seeds, {} texture seeds)",
            stats.n_convective,
            stats.n_stratiform,
            stats.n_missing,
            stats.n_seeds_col_max,
            stats.n_seeds_texture
        );
        self.stats = Some(stats);
        Ok(())
    }

    /// Build the texture and convective kernels ahead of the first pass
    ///
    /// # Errors
    ///
    /// Returns `ConvStratError::GridNotSet` without a grid, the validation
    /// error of the current thresholds, or `ConvStratError::KernelTooLarge`
    /// when a radius spans too many cells.
    pub fn prepare_kernels(&mut self) -> Result<(), ConvStratError> {
        let geometry = self.geometry.as_ref().ok_or(ConvStratError::GridNotSet)?;
        self.params.validate()?;
        let radii_km = [
            self.params.texture_radius_km,
            self.params.convective_radius_km,
        ];
        for radius_km in radii_km {
            self.kernels
                .get_or_build(geometry, self.geometry_version, radius_km)?;
        }
        self.kernels.retain_radii(&radii_km);
        Ok(())
    }

    /// Release all derived fields, scratch buffers and kernels
    ///
    /// The next `compute_partition` rebuilds everything.
    pub fn free_arrays(&mut self) {
        debug!("Freeing partition arrays and kernels");
        self.fields = None;
        self.stats = None;
        self.texture.release();
        self.kernels.clear();
    }

    // ------------------------------------------------------------------
    // State and results
    // ------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> ConvStratState {
        if self.geometry.is_none() {
            ConvStratState::Unconfigured
        } else if self.fields.is_some() {
            ConvStratState::Computed
        } else if self.kernels.is_current(
            self.geometry_version,
            &[
                self.params.texture_radius_km,
                self.params.convective_radius_km,
            ],
        ) {
            ConvStratState::Ready
        } else {
            ConvStratState::GridSet
        }
    }

    /// All derived fields from the last successful pass
    #[must_use]
    pub fn fields(&self) -> Option<&DerivedFields> {
        self.fields.as_ref()
    }

    /// Summary counts from the last successful pass
    #[must_use]
    pub fn stats(&self) -> Option<&PartitionStats> {
        self.stats.as_ref()
    }

    /// Category per cell
    #[must_use]
    pub fn partition(&self) -> Option<&[PartitionCategory]> {
        self.fields.as_ref().map(|f| f.partition.as_slice())
    }

    /// Column maximum where convective, missing elsewhere
    #[must_use]
    pub fn convective_dbz(&self) -> Option<&[f32]> {
        self.fields.as_ref().map(|f| f.conv_dbz.as_slice())
    }

    /// Column maximum where stratiform, missing elsewhere
    #[must_use]
    pub fn stratiform_dbz(&self) -> Option<&[f32]> {
        self.fields.as_ref().map(|f| f.strat_dbz.as_slice())
    }

    #[must_use]
    pub fn mean_texture(&self) -> Option<&[f32]> {
        self.fields.as_ref().map(|f| f.mean_texture.as_slice())
    }

    #[must_use]
    pub fn fraction_active(&self) -> Option<&[f32]> {
        self.fields.as_ref().map(|f| f.fraction_active.as_slice())
    }

    #[must_use]
    pub fn col_max_dbz(&self) -> Option<&[f32]> {
        self.fields.as_ref().map(|f| f.col_max_dbz.as_slice())
    }

    #[must_use]
    pub fn conv_from_col_max(&self) -> Option<&[bool]> {
        self.fields.as_ref().map(|f| f.conv_from_col_max.as_slice())
    }

    #[must_use]
    pub fn conv_from_texture(&self) -> Option<&[bool]> {
        self.fields.as_ref().map(|f| f.conv_from_texture.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: f32 = -9999.0;

    fn single_level(nx: usize, ny: usize) -> GridGeometry {
        GridGeometry::new(nx, ny, 1.0, 1.0, vec![1.0]).unwrap()
    }

    #[test]
    fn test_state_machine() {
        let mut engine = ConvStrat::new();
        assert_eq!(engine.state(), ConvStratState::Unconfigured);
        assert_eq!(
            engine.compute_partition(&[0.0; 4], MISSING),
            Err(ConvStratError::GridNotSet)
        );

        engine.set_grid(single_level(2, 2)).unwrap();
        assert_eq!(engine.state(), ConvStratState::GridSet);

        engine.compute_partition(&[10.0; 4], MISSING).unwrap();
        assert_eq!(engine.state(), ConvStratState::Computed);

        engine.free_arrays();
        assert_eq!(engine.state(), ConvStratState::GridSet);
        assert!(engine.partition().is_none());

        engine.compute_partition(&[10.0; 4], MISSING).unwrap();
        assert_eq!(engine.state(), ConvStratState::Computed);

        engine.set_grid(single_level(3, 3)).unwrap();
        assert_eq!(engine.state(), ConvStratState::GridSet);
        assert!(engine.partition().is_none());
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut engine = ConvStrat::new();
        engine.set_grid(single_level(3, 3)).unwrap();
        let mut dbz = vec![20.0; 9];
        dbz[4] = 60.0;
        engine.compute_partition(&dbz, MISSING).unwrap();
        let before = engine.fields().unwrap().clone();

        // Wrong volume size
        assert!(matches!(
            engine.compute_partition(&[20.0; 8], MISSING),
            Err(ConvStratError::VolumeSizeMismatch { .. })
        ));
        assert_eq!(engine.fields().unwrap(), &before);

        // Empty height band
        engine.set_min_valid_height_km(5.0);
        engine.set_max_valid_height_km(6.0);
        assert!(matches!(
            engine.compute_partition(&dbz, MISSING),
            Err(ConvStratError::EmptyHeightRange { .. })
        ));
        assert_eq!(engine.fields().unwrap(), &before);

        // Non-positive radius
        engine.set_min_valid_height_km(0.0);
        engine.set_convective_radius_km(0.0);
        assert!(matches!(
            engine.compute_partition(&dbz, MISSING),
            Err(ConvStratError::InvalidParameter { .. })
        ));
        assert_eq!(engine.fields().unwrap(), &before);
        assert_eq!(engine.state(), ConvStratState::Computed);
    }

    #[test]
    fn test_rejected_grid_keeps_configuration() {
        let mut engine = ConvStrat::new();
        engine.set_grid(single_level(2, 2)).unwrap();
        engine.compute_partition(&[10.0; 4], MISSING).unwrap();

        let bad: GridGeometry = serde_json::from_str(
            r#"{"nx":0,"ny":2,"dx":1.0,"dy":1.0,"minx":0.0,"miny":0.0,"z_km":[1.0],"proj_is_latlon":false}"#,
        )
        .unwrap();
        assert!(matches!(
            engine.set_grid(bad),
            Err(ConvStratError::InvalidGeometry(_))
        ));
        assert_eq!(engine.geometry().unwrap().nx(), 2);
        assert!(engine.partition().is_some());
    }

    #[test]
    fn test_ready_after_kernels_built() {
        let mut engine = ConvStrat::new();
        assert_eq!(engine.prepare_kernels(), Err(ConvStratError::GridNotSet));

        engine.set_grid(single_level(2, 2)).unwrap();
        engine.prepare_kernels().unwrap();
        assert_eq!(engine.state(), ConvStratState::Ready);

        // A changed radius needs a new kernel
        engine.set_texture_radius_km(3.0);
        assert_eq!(engine.state(), ConvStratState::GridSet);
    }

    #[test]
    fn test_setters_update_params() {
        let mut engine = ConvStrat::new();
        engine.set_min_valid_height_km(0.5);
        engine.set_max_valid_height_km(12.0);
        engine.set_min_valid_dbz(5.0);
        engine.set_dbz_for_definite_convection(50.0);
        engine.set_convective_radius_km(4.0);
        engine.set_texture_radius_km(6.0);
        engine.set_min_valid_fraction_for_texture(0.4);
        engine.set_min_texture_for_convection(300.0);

        let expected = ConvStratParams {
            min_valid_ht_km: 0.5,
            max_valid_ht_km: 12.0,
            min_valid_dbz: 5.0,
            dbz_for_definite_convection: 50.0,
            convective_radius_km: 4.0,
            texture_radius_km: 6.0,
            min_valid_fraction_for_texture: 0.4,
            min_texture_for_convection: 300.0,
        };
        assert_eq!(engine.params(), &expected);

        let engine = ConvStrat::with_params(expected.clone());
        assert_eq!(engine.params(), &expected);
    }

    #[test]
    fn test_stats_recorded() {
        let mut engine = ConvStrat::new();
        engine.set_grid(single_level(3, 1)).unwrap();
        engine.set_convective_radius_km(0.5);
        engine
            .compute_partition(&[60.0, 20.0, MISSING], MISSING)
            .unwrap();

        let stats = engine.stats().unwrap();
        assert_eq!(stats.n_convective, 1);
        assert_eq!(stats.n_stratiform, 1);
        assert_eq!(stats.n_missing, 1);
        assert_eq!(stats.n_seeds_col_max, 1);
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let mut engine = ConvStrat::new();
        let huge: GridGeometry = serde_json::from_str(
            r#"{"nx":8589934592,"ny":8589934592,"dx":1.0,"dy":1.0,"minx":0.0,"miny":0.0,"z_km":[1.0],"proj_is_latlon":false}"#,
        )
        .unwrap();
        assert!(matches!(
            engine.set_grid(huge),
            Err(ConvStratError::InvalidGeometry(_))
        ));
        assert_eq!(engine.state(), ConvStratState::Unconfigured);
        assert_eq!(
            engine.compute_partition(&[], MISSING),
            Err(ConvStratError::GridNotSet)
        );
    }

    #[test]
    fn test_oversized_radius_keeps_previous_results() {
        let mut engine = ConvStrat::new();
        engine.set_grid(single_level(3, 3)).unwrap();
        let mut dbz = vec![20.0; 9];
        dbz[4] = 60.0;
        engine.compute_partition(&dbz, MISSING).unwrap();
        let before = engine.fields().unwrap().clone();

        engine.set_convective_radius_km(1.0e6);
        assert!(matches!(
            engine.compute_partition(&dbz, MISSING),
            Err(ConvStratError::KernelTooLarge { .. })
        ));
        assert!(matches!(
            engine.prepare_kernels(),
            Err(ConvStratError::KernelTooLarge { .. })
        ));
        assert_eq!(engine.fields().unwrap(), &before);
    }

    #[test]
    fn test_radius_sweep_keeps_only_current_kernels() {
        let mut engine = ConvStrat::new();
        engine.set_grid(single_level(5, 5)).unwrap();
        let dbz = vec![20.0; 25];
        for radius_km in [0.5, 1.0, 1.5, 2.0, 2.5] {
            engine.set_convective_radius_km(radius_km);
            engine.compute_partition(&dbz, MISSING).unwrap();
            assert_eq!(engine.kernels.len(), 2);
        }
        assert!(engine.kernels.is_current(engine.geometry_version, &[7.0, 2.5]));
    }
}
