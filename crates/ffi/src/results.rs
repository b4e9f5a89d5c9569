use conv_strat_core::{ConvStrat, PartitionStats};

use crate::error::{ConvStratErrorCode, DefaultConvStratError};
use crate::helpers::{out_slice, to_code, with_engine};
use crate::instance::ConvStratInstance;

/// Float grids available after a successful partition.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvStratFloatField {
    /// Column maximum within the height band (dBZ)
    ColMaxDbz = 0,
    /// Texture averaged over levels
    MeanTexture = 1,
    /// Valid fraction of the texture kernel averaged over levels
    FractionActive = 2,
    /// Column maximum where convective (dBZ)
    ConvectiveDbz = 3,
    /// Column maximum where stratiform (dBZ)
    StratiformDbz = 4,
}

/// Seed flag grids available after a successful partition.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvStratFlagField {
    ConvFromColMax = 0,
    ConvFromTexture = 1,
}

/// Cell counts from the last partition.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvStratSummary {
    pub n_cells: usize,
    pub n_missing: usize,
    pub n_stratiform: usize,
    pub n_convective: usize,
    pub n_seeds_col_max: usize,
    pub n_seeds_texture: usize,
}

impl From<&PartitionStats> for ConvStratSummary {
    fn from(stats: &PartitionStats) -> Self {
        Self {
            n_cells: stats.n_cells,
            n_missing: stats.n_missing,
            n_stratiform: stats.n_stratiform,
            n_convective: stats.n_convective,
            n_seeds_col_max: stats.n_seeds_col_max,
            n_seeds_texture: stats.n_seeds_texture,
        }
    }
}

fn float_field(engine: &ConvStrat, field: ConvStratFloatField) -> Option<&[f32]> {
    match field {
        ConvStratFloatField::ColMaxDbz => engine.col_max_dbz(),
        ConvStratFloatField::MeanTexture => engine.mean_texture(),
        ConvStratFloatField::FractionActive => engine.fraction_active(),
        ConvStratFloatField::ConvectiveDbz => engine.convective_dbz(),
        ConvStratFloatField::StratiformDbz => engine.stratiform_dbz(),
    }
}

fn flag_field(engine: &ConvStrat, field: ConvStratFlagField) -> Option<&[bool]> {
    match field {
        ConvStratFlagField::ConvFromColMax => engine.conv_from_col_max(),
        ConvStratFlagField::ConvFromTexture => engine.conv_from_texture(),
    }
}

/// Copy the category of every cell into `out` as
/// `0 = missing, 1 = stratiform, 2 = convective`.
///
/// Returns
/// - `ConvStratErrorCode::Ok` with `nx * ny` codes written
/// - `ConvStratErrorCode::NullPointer` if `ptr` or `out` is null
/// - `ConvStratErrorCode::NotComputed` if no partition is available
/// - `ConvStratErrorCode::BufferTooSmall` if `len < nx * ny`
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `out` must be valid for writes of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_copy_partition(
    ptr: *const ConvStratInstance,
    out: *mut u8,
    len: usize,
) -> ConvStratErrorCode {
    to_code(unsafe {
        with_engine(ptr, |engine| {
            let partition = engine
                .partition()
                .ok_or_else(|| DefaultConvStratError::not_computed("partition"))?;
            let dst = out_slice(out, len, partition.len(), "out")?;
            for (d, category) in dst.iter_mut().zip(partition) {
                *d = category.code();
            }
            Ok(())
        })
    })
}

/// Copy one float grid into `out`. Undefined cells hold the missing value
/// passed to the last compute.
///
/// Same return codes as `conv_strat_copy_partition`.
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `out` must be valid for writes of `len` floats.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_copy_float_field(
    ptr: *const ConvStratInstance,
    field: ConvStratFloatField,
    out: *mut f32,
    len: usize,
) -> ConvStratErrorCode {
    to_code(unsafe {
        with_engine(ptr, |engine| {
            let src = float_field(engine, field)
                .ok_or_else(|| DefaultConvStratError::not_computed("float field"))?;
            out_slice(out, len, src.len(), "out")?.copy_from_slice(src);
            Ok(())
        })
    })
}

/// Copy one seed flag grid into `out` as `0`/`1` bytes.
///
/// Same return codes as `conv_strat_copy_partition`.
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `out` must be valid for writes of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_copy_flag_field(
    ptr: *const ConvStratInstance,
    field: ConvStratFlagField,
    out: *mut u8,
    len: usize,
) -> ConvStratErrorCode {
    to_code(unsafe {
        with_engine(ptr, |engine| {
            let src = flag_field(engine, field)
                .ok_or_else(|| DefaultConvStratError::not_computed("flag field"))?;
            let dst = out_slice(out, len, src.len(), "out")?;
            for (d, &flag) in dst.iter_mut().zip(src) {
                *d = u8::from(flag);
            }
            Ok(())
        })
    })
}

/// Read the cell counts of the last partition.
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `out_summary` must be valid for one write.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_get_summary(
    ptr: *const ConvStratInstance,
    out_summary: *mut ConvStratSummary,
) -> ConvStratErrorCode {
    to_code(unsafe {
        with_engine(ptr, |engine| {
            let stats = engine
                .stats()
                .ok_or_else(|| DefaultConvStratError::not_computed("summary"))?;
            let dst = out_slice(out_summary, 1, 1, "out_summary")?;
            dst[0] = ConvStratSummary::from(stats);
            Ok(())
        })
    })
}
