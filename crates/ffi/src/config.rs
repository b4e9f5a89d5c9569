use conv_strat_core::{ConvStratParams, ConvStratState, GridGeometry};
use std::slice;

use crate::error::{ConvStratErrorCode, DefaultConvStratError};
use crate::helpers::{to_code, track_error, with_engine, with_engine_mut};
use crate::instance::ConvStratInstance;

/// Grid geometry as passed from C.
///
/// `dx`, `dy`, `minx`, `miny` are degrees when `proj_is_latlon` is set,
/// kilometres otherwise. `z_km` points to `nz` strictly increasing heights.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ConvStratGrid {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub dx: f32,
    pub dy: f32,
    pub minx: f32,
    pub miny: f32,
    pub z_km: *const f32,
    pub proj_is_latlon: bool,
}

impl ConvStratGrid {
    /// Copy into an owned, validated geometry.
    ///
    /// # Safety
    /// `z_km` must be null or valid for reads of `nz` values.
    unsafe fn to_geometry(self) -> Result<GridGeometry, DefaultConvStratError> {
        if self.z_km.is_null() {
            return Err(DefaultConvStratError::null_pointer("z_km"));
        }
        // SAFETY: caller guarantees z_km holds nz values; null checked above
        let z_km = unsafe { slice::from_raw_parts(self.z_km, self.nz) }.to_vec();
        let geometry = if self.proj_is_latlon {
            GridGeometry::lat_lon(self.nx, self.ny, self.dx, self.dy, z_km)
        } else {
            GridGeometry::new(self.nx, self.ny, self.dx, self.dy, z_km)
        }?;
        Ok(geometry.with_origin(self.minx, self.miny))
    }
}

/// Partition thresholds; field meanings match `ConvStratParams`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvStratThresholds {
    pub min_valid_ht_km: f32,
    pub max_valid_ht_km: f32,
    pub min_valid_dbz: f32,
    pub dbz_for_definite_convection: f32,
    pub convective_radius_km: f32,
    pub texture_radius_km: f32,
    pub min_valid_fraction_for_texture: f32,
    pub min_texture_for_convection: f32,
}

impl From<&ConvStratParams> for ConvStratThresholds {
    fn from(params: &ConvStratParams) -> Self {
        Self {
            min_valid_ht_km: params.min_valid_ht_km,
            max_valid_ht_km: params.max_valid_ht_km,
            min_valid_dbz: params.min_valid_dbz,
            dbz_for_definite_convection: params.dbz_for_definite_convection,
            convective_radius_km: params.convective_radius_km,
            texture_radius_km: params.texture_radius_km,
            min_valid_fraction_for_texture: params.min_valid_fraction_for_texture,
            min_texture_for_convection: params.min_texture_for_convection,
        }
    }
}

impl From<ConvStratThresholds> for ConvStratParams {
    fn from(t: ConvStratThresholds) -> Self {
        Self {
            min_valid_ht_km: t.min_valid_ht_km,
            max_valid_ht_km: t.max_valid_ht_km,
            min_valid_dbz: t.min_valid_dbz,
            dbz_for_definite_convection: t.dbz_for_definite_convection,
            convective_radius_km: t.convective_radius_km,
            texture_radius_km: t.texture_radius_km,
            min_valid_fraction_for_texture: t.min_valid_fraction_for_texture,
            min_texture_for_convection: t.min_texture_for_convection,
        }
    }
}

/// Engine lifecycle as seen from C.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvStratLifecycle {
    Unconfigured = 0,
    GridSet = 1,
    Ready = 2,
    Computed = 3,
}

impl From<ConvStratState> for ConvStratLifecycle {
    fn from(state: ConvStratState) -> Self {
        match state {
            ConvStratState::Unconfigured => Self::Unconfigured,
            ConvStratState::GridSet => Self::GridSet,
            ConvStratState::Ready => Self::Ready,
            ConvStratState::Computed => Self::Computed,
        }
    }
}

/// Default thresholds, for callers that only want to override a few.
#[no_mangle]
pub extern "C" fn conv_strat_default_thresholds() -> ConvStratThresholds {
    ConvStratThresholds::from(&ConvStratParams::default())
}

/// Set the grid geometry. The heights are copied; the caller keeps ownership.
///
/// Discards cached kernels and any previous results.
///
/// Returns
/// - `ConvStratErrorCode::Ok` on success
/// - `ConvStratErrorCode::NullPointer` if `ptr` or `grid.z_km` is null
/// - `ConvStratErrorCode::InvalidGeometry` if the geometry is rejected
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `grid.z_km` must be valid for reads of `grid.nz` values.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_set_grid(
    ptr: *mut ConvStratInstance,
    grid: ConvStratGrid,
) -> ConvStratErrorCode {
    to_code(unsafe {
        with_engine_mut(ptr, |engine| {
            let geometry = grid.to_geometry()?;
            engine.set_grid(geometry)?;
            Ok(())
        })
    })
}

/// Replace all thresholds. Values are validated on the next compute.
///
/// # Safety
/// `ptr` must be a live instance from `conv_strat_new`.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_set_thresholds(
    ptr: *mut ConvStratInstance,
    thresholds: ConvStratThresholds,
) -> ConvStratErrorCode {
    to_code(unsafe {
        with_engine_mut(ptr, |engine| {
            engine.set_params(thresholds.into());
            Ok(())
        })
    })
}

/// Read the current thresholds into `out_thresholds`.
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `out_thresholds` must be valid for one write.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_get_thresholds(
    ptr: *const ConvStratInstance,
    out_thresholds: *mut ConvStratThresholds,
) -> ConvStratErrorCode {
    if out_thresholds.is_null() {
        return track_error(&DefaultConvStratError::null_pointer("out_thresholds"));
    }
    to_code(unsafe {
        with_engine(ptr, |engine| {
            // SAFETY: null checked above
            *out_thresholds = ConvStratThresholds::from(engine.params());
            Ok(())
        })
    })
}

/// Current lifecycle state.
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `out_state` must be valid for one write.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_get_state(
    ptr: *const ConvStratInstance,
    out_state: *mut ConvStratLifecycle,
) -> ConvStratErrorCode {
    if out_state.is_null() {
        return track_error(&DefaultConvStratError::null_pointer("out_state"));
    }
    to_code(unsafe {
        with_engine(ptr, |engine| {
            *out_state = engine.state().into();
            Ok(())
        })
    })
}
