use conv_strat_core::ConvStrat;
use std::sync::RwLock;
use tracing::debug;

use crate::error::{ConvStratErrorCode, DefaultConvStratError};
use crate::helpers::{clear_last_error, track_error};

/// Partition engine handle.
///
/// # Thread Safety
/// The engine sits behind an `RwLock`: result copies take a shared lock,
/// configuration and `conv_strat_compute_partition` take the exclusive one.
/// A handle may be shared between threads.
pub struct ConvStratInstance {
    pub(crate) engine: RwLock<ConvStrat>,
}

impl ConvStratInstance {
    pub(crate) fn new() -> Box<Self> {
        Box::new(Self {
            engine: RwLock::new(ConvStrat::new()),
        })
    }
}

/// Create a partition engine with default thresholds and no grid.
///
/// Returns
/// - `ConvStratErrorCode::Ok` with a valid instance in `out_instance`
/// - `ConvStratErrorCode::NullPointer` if `out_instance` is null
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the instance and MUST call `conv_strat_destroy` exactly once.
///
/// Example (C++)
/// ```cpp
/// ConvStratInstance* cs = nullptr;
/// if (conv_strat_new(&cs) != ConvStratErrorCode::Ok) {
///     return;
/// }
/// // ... set grid, compute, copy results ...
/// conv_strat_destroy(cs);
/// ```
#[no_mangle]
pub unsafe extern "C" fn conv_strat_new(
    out_instance: *mut *mut ConvStratInstance,
) -> ConvStratErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultConvStratError::null_pointer("out_instance"));
    }

    debug!("Creating partition engine instance");
    unsafe {
        *out_instance = Box::into_raw(ConvStratInstance::new());
    }
    clear_last_error();
    ConvStratErrorCode::Ok
}

/// Destroy an instance created by `conv_strat_new`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `conv_strat_new` and not freed already.
/// - The caller must not use the pointer afterwards.
#[no_mangle]
pub unsafe extern "C" fn conv_strat_destroy(ptr: *mut ConvStratInstance) {
    if ptr.is_null() {
        return;
    }

    debug!("Destroying partition engine instance");
    // SAFETY: created by Box::into_raw in conv_strat_new and not yet freed
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
