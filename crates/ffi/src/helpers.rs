use crate::error::{with_last_error_mut, ConvStratErrorCode, DefaultConvStratError, FfiError};
use crate::instance::ConvStratInstance;
use conv_strat_core::ConvStrat;
use std::ffi::CString;
use tracing::warn;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record `error` in thread-local storage and return its code.
#[inline]
pub(crate) fn track_error(error: &impl FfiError) -> ConvStratErrorCode {
    warn!("FFI call failed: {}", error.msg());
    set_last_error(error);
    error.code()
}

/// Record the outcome of a fallible call: clears the last error on success,
/// stores it on failure.
pub(crate) fn track_result<T>(
    result: Result<T, DefaultConvStratError>,
) -> Result<T, ConvStratErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Collapse a unit result into the code returned across the boundary.
pub(crate) fn to_code(result: Result<(), DefaultConvStratError>) -> ConvStratErrorCode {
    match track_result(result) {
        Ok(()) => ConvStratErrorCode::Ok,
        Err(code) => code,
    }
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = ConvStratErrorCode::Ok;
    });
}

/// Borrow the instance behind `ptr`.
///
/// # Safety
/// `ptr` must be null or a live pointer from `conv_strat_new`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const ConvStratInstance,
) -> Result<&'a ConvStratInstance, DefaultConvStratError> {
    // SAFETY: non-null pointers come from Box::into_raw in conv_strat_new
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultConvStratError::null_pointer("ptr"))
}

/// Run `func` with shared access to the engine.
///
/// # Safety
/// Same contract as [`instance_from_ptr`].
pub(crate) unsafe fn with_engine<F, T>(
    ptr: *const ConvStratInstance,
    func: F,
) -> Result<T, DefaultConvStratError>
where
    F: FnOnce(&ConvStrat) -> Result<T, DefaultConvStratError>,
{
    let instance = unsafe { instance_from_ptr(ptr) }?;
    let engine = instance
        .engine
        .read()
        .map_err(|_| DefaultConvStratError::lock_poisoned("RwLock"))?;
    func(&engine)
}

/// Run `func` with exclusive access to the engine.
///
/// # Safety
/// Same contract as [`instance_from_ptr`].
pub(crate) unsafe fn with_engine_mut<F, T>(
    ptr: *const ConvStratInstance,
    func: F,
) -> Result<T, DefaultConvStratError>
where
    F: FnOnce(&mut ConvStrat) -> Result<T, DefaultConvStratError>,
{
    let instance = unsafe { instance_from_ptr(ptr) }?;
    let mut engine = instance
        .engine
        .write()
        .map_err(|_| DefaultConvStratError::lock_poisoned("RwLock"))?;
    func(&mut engine)
}

/// View a caller buffer of `len` values as a mutable slice, checking it can
/// hold `required` values.
///
/// # Safety
/// `out` must be null or valid for writes of `len` values.
pub(crate) unsafe fn out_slice<'a, T>(
    out: *mut T,
    len: usize,
    required: usize,
    param_name: &str,
) -> Result<&'a mut [T], DefaultConvStratError> {
    if out.is_null() {
        return Err(DefaultConvStratError::null_pointer(param_name));
    }
    if len < required {
        return Err(DefaultConvStratError::buffer_too_small(
            param_name, required, len,
        ));
    }
    // SAFETY: caller guarantees `out` is valid for `len` writes; null checked above
    Ok(unsafe { std::slice::from_raw_parts_mut(out, required) })
}
