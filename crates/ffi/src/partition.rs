use std::slice;

use crate::error::{ConvStratErrorCode, DefaultConvStratError};
use crate::helpers::{to_code, track_error, with_engine_mut};
use crate::instance::ConvStratInstance;

/// Partition a reflectivity volume.
///
/// `dbz` holds `len` samples in `(z, y, x)` order; samples equal to `missing`
/// are absent. The volume is only read during the call.
///
/// Returns
/// - `ConvStratErrorCode::Ok` on success; results replace the previous ones
/// - `ConvStratErrorCode::NullPointer` if `ptr` or `dbz` is null
/// - `ConvStratErrorCode::GridNotSet` if no grid has been set
/// - `ConvStratErrorCode::InvalidParameter` if a threshold is rejected
/// - `ConvStratErrorCode::VolumeSizeMismatch` if `len != nx * ny * nz`
/// - `ConvStratErrorCode::EmptyHeightRange` if no level lies in the height band
/// - `ConvStratErrorCode::KernelTooLarge` if a radius spans too many cells
///
/// On failure the previous results stay available.
///
/// # Safety
/// - `ptr` must be a live instance from `conv_strat_new`.
/// - `dbz` must be valid for reads of `len` values.
///
/// Example (C++)
/// ```cpp
/// ConvStratErrorCode err = conv_strat_compute_partition(cs, dbz, nx * ny * nz, -9999.0f);
/// if (err == ConvStratErrorCode::Ok) {
///     conv_strat_copy_partition(cs, categories, nx * ny);
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn conv_strat_compute_partition(
    ptr: *mut ConvStratInstance,
    dbz: *const f32,
    len: usize,
    missing: f32,
) -> ConvStratErrorCode {
    if dbz.is_null() {
        return track_error(&DefaultConvStratError::null_pointer("dbz"));
    }
    // SAFETY: caller guarantees dbz holds len values; null checked above
    let volume = unsafe { slice::from_raw_parts(dbz, len) };

    to_code(unsafe {
        with_engine_mut(ptr, |engine| {
            engine.compute_partition(volume, missing)?;
            Ok(())
        })
    })
}

/// Release all derived arrays and kernels; the next compute rebuilds them.
///
/// # Safety
/// `ptr` must be a live instance from `conv_strat_new`.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_free_arrays(ptr: *mut ConvStratInstance) -> ConvStratErrorCode {
    to_code(unsafe {
        with_engine_mut(ptr, |engine| {
            engine.free_arrays();
            Ok(())
        })
    })
}
