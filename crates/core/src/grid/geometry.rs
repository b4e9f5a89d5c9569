//! Horizontal and vertical layout of a reflectivity grid

use crate::error::ConvStratError;
use serde::{Deserialize, Serialize};

/// Kilometres per degree of arc at the equator
pub const KM_PER_DEG_AT_EQ: f32 = 111.198_49;

/// Inclusive range of vertical level indices inside the valid height band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    /// Lowest level index
    pub min_iz: usize,
    /// Highest level index (inclusive)
    pub max_iz: usize,
}

impl LevelRange {
    /// Number of levels in the range (always at least one)
    #[must_use]
    pub fn count(&self) -> usize {
        self.max_iz - self.min_iz + 1
    }

    /// Level indices, lowest first
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.min_iz..=self.max_iz
    }
}

/// Grid geometry for a reflectivity volume
///
/// Cells are stored row-major: horizontal index `iy * nx + ix`, volume index
/// `iz * nx * ny + iy * nx + ix`. For lat/lon grids `dx`, `dy`, `minx` and
/// `miny` are in degrees, otherwise in kilometres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    nx: usize,
    ny: usize,
    dx: f32,
    dy: f32,
    minx: f32,
    miny: f32,
    z_km: Vec<f32>,
    proj_is_latlon: bool,
}

impl GridGeometry {
    /// Create a flat (Cartesian) grid with spacing in km and origin at zero
    ///
    /// # Errors
    ///
    /// Returns `ConvStratError::InvalidGeometry` if a dimension is zero, the
    /// spacing is not positive, or `z_km` is empty or not strictly increasing.
    pub fn new(
        nx: usize,
        ny: usize,
        dx: f32,
        dy: f32,
        z_km: Vec<f32>,
    ) -> Result<Self, ConvStratError> {
        let geometry = Self {
            nx,
            ny,
            dx,
            dy,
            minx: 0.0,
            miny: 0.0,
            z_km,
            proj_is_latlon: false,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Create a lat/lon grid with spacing in degrees
    ///
    /// # Errors
    ///
    /// Same conditions as [`GridGeometry::new`].
    pub fn lat_lon(
        nx: usize,
        ny: usize,
        dlon: f32,
        dlat: f32,
        z_km: Vec<f32>,
    ) -> Result<Self, ConvStratError> {
        let geometry = Self {
            nx,
            ny,
            dx: dlon,
            dy: dlat,
            minx: 0.0,
            miny: 0.0,
            z_km,
            proj_is_latlon: true,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Set the centre coordinates of the first cell
    #[must_use]
    pub fn with_origin(mut self, minx: f32, miny: f32) -> Self {
        self.minx = minx;
        self.miny = miny;
        self
    }

    /// Check the geometry invariants
    ///
    /// Deserialized geometries bypass the constructors, so `ConvStrat::set_grid`
    /// runs this again.
    ///
    /// # Errors
    ///
    /// Returns `ConvStratError::InvalidGeometry` describing the first violation.
    pub fn validate(&self) -> Result<(), ConvStratError> {
        if self.nx == 0 || self.ny == 0 {
            return Err(ConvStratError::InvalidGeometry(format!(
                "grid dimensions must be positive, got {}x{}",
                self.nx, self.ny
            )));
        }
        if !(self.dx.is_finite() && self.dy.is_finite() && self.dx > 0.0 && self.dy > 0.0) {
            return Err(ConvStratError::InvalidGeometry(format!(
                "grid spacing must be finite and positive, got dx={} dy={}",
                self.dx, self.dy
            )));
        }
        let (dx_km, dy_km) = self.spacing_km();
        if !(dx_km.is_finite() && dy_km.is_finite()) {
            return Err(ConvStratError::InvalidGeometry(format!(
                "grid spacing overflows in km, got dx={} dy={}",
                self.dx, self.dy
            )));
        }
        if !(self.minx.is_finite() && self.miny.is_finite()) {
            return Err(ConvStratError::InvalidGeometry(
                "grid origin must be finite".to_string(),
            ));
        }
        if self.z_km.is_empty() {
            return Err(ConvStratError::InvalidGeometry(
                "at least one vertical level is required".to_string(),
            ));
        }
        if self.z_km.iter().any(|z| !z.is_finite()) {
            return Err(ConvStratError::InvalidGeometry(
                "vertical levels must be finite".to_string(),
            ));
        }
        // Volume indices and kernel offsets are signed
        let n_samples = self
            .nx
            .checked_mul(self.ny)
            .and_then(|n| n.checked_mul(self.z_km.len()))
            .filter(|&n| isize::try_from(n).is_ok());
        if n_samples.is_none() {
            return Err(ConvStratError::InvalidGeometry(format!(
                "grid of {}x{}x{} cells is too large",
                self.nx,
                self.ny,
                self.z_km.len()
            )));
        }
        if let Some(pair) = self.z_km.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ConvStratError::InvalidGeometry(format!(
                "vertical levels must be strictly increasing, got {} km then {} km",
                pair[0], pair[1]
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[must_use]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of vertical levels
    #[must_use]
    pub fn nz(&self) -> usize {
        self.z_km.len()
    }

    #[must_use]
    pub fn dx(&self) -> f32 {
        self.dx
    }

    #[must_use]
    pub fn dy(&self) -> f32 {
        self.dy
    }

    #[must_use]
    pub fn minx(&self) -> f32 {
        self.minx
    }

    #[must_use]
    pub fn miny(&self) -> f32 {
        self.miny
    }

    /// Level heights in km, strictly increasing
    #[must_use]
    pub fn z_km(&self) -> &[f32] {
        &self.z_km
    }

    #[must_use]
    pub fn proj_is_latlon(&self) -> bool {
        self.proj_is_latlon
    }

    /// Cells per horizontal level (`nx * ny`)
    #[must_use]
    pub fn horizontal_size(&self) -> usize {
        self.nx * self.ny
    }

    /// Samples in the full volume (`nx * ny * nz`)
    #[must_use]
    pub fn volume_size(&self) -> usize {
        self.horizontal_size() * self.nz()
    }

    /// Cell spacing in km as `(dx_km, dy_km)`
    ///
    /// Lat/lon spacing is scaled by [`KM_PER_DEG_AT_EQ`] only. No cosine of
    /// latitude is applied, so east-west distances are overestimated away from
    /// the equator.
    #[must_use]
    pub fn spacing_km(&self) -> (f32, f32) {
        if self.proj_is_latlon {
            (self.dx * KM_PER_DEG_AT_EQ, self.dy * KM_PER_DEG_AT_EQ)
        } else {
            (self.dx, self.dy)
        }
    }

    /// X coordinate of the centre of column `ix` in grid units
    #[must_use]
    pub fn x_coord(&self, ix: usize) -> f32 {
        self.minx + ix as f32 * self.dx
    }

    /// Y coordinate of the centre of row `iy` in grid units
    #[must_use]
    pub fn y_coord(&self, iy: usize) -> f32 {
        self.miny + iy as f32 * self.dy
    }

    /// Levels whose height lies within `[min_ht_km, max_ht_km]`
    ///
    /// Returns `None` when no level falls inside the band.
    #[must_use]
    pub fn level_range(&self, min_ht_km: f32, max_ht_km: f32) -> Option<LevelRange> {
        let min_iz = self
            .z_km
            .iter()
            .position(|&z| z >= min_ht_km && z <= max_ht_km)?;
        let max_iz = self
            .z_km
            .iter()
            .rposition(|&z| z >= min_ht_km && z <= max_ht_km)?;
        Some(LevelRange { min_iz, max_iz })
    }
}
