use conv_strat_core::ConvStratError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors crossing the FFI boundary.
///
/// - `code()` - the error code returned to the caller
/// - `msg()` - the diagnostic message stored for `conv_strat_get_last_error`
pub(crate) trait FfiError {
    fn code(&self) -> ConvStratErrorCode;

    fn msg(&self) -> &str;
}

/// Error code plus message, built either directly for boundary failures
/// (null pointers, short buffers) or from a core `ConvStratError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultConvStratError {
    code: ConvStratErrorCode,
    msg: String,
}

impl DefaultConvStratError {
    /// Null pointer passed where non-null required.
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: ConvStratErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Internal lock poisoned by a panic on another thread.
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: ConvStratErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Result accessor called before a successful `conv_strat_compute_partition`.
    pub fn not_computed(what: &str) -> Self {
        Self {
            code: ConvStratErrorCode::NotComputed,
            msg: format!("No {what} available: compute a partition first"),
        }
    }

    /// Caller buffer shorter than the grid it must receive.
    pub fn buffer_too_small(param_name: &str, required: usize, actual: usize) -> Self {
        Self {
            code: ConvStratErrorCode::BufferTooSmall,
            msg: format!("Buffer '{param_name}' holds {actual} values, {required} required"),
        }
    }
}

impl From<&ConvStratError> for DefaultConvStratError {
    fn from(error: &ConvStratError) -> Self {
        let code = match error {
            ConvStratError::GridNotSet => ConvStratErrorCode::GridNotSet,
            ConvStratError::InvalidGeometry(_) => ConvStratErrorCode::InvalidGeometry,
            ConvStratError::InvalidParameter { .. } => ConvStratErrorCode::InvalidParameter,
            ConvStratError::EmptyHeightRange { .. } => ConvStratErrorCode::EmptyHeightRange,
            ConvStratError::KernelTooLarge { .. } => ConvStratErrorCode::KernelTooLarge,
            ConvStratError::VolumeSizeMismatch { .. } => ConvStratErrorCode::VolumeSizeMismatch,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl From<ConvStratError> for DefaultConvStratError {
    fn from(error: ConvStratError) -> Self {
        Self::from(&error)
    }
}

impl FfiError for DefaultConvStratError {
    fn code(&self) -> ConvStratErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by partition functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvStratErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Null pointer passed where non-null required.
    NullPointer = 1,

    /// Internal lock was poisoned by a panic.
    LockPoisoned = 2,

    /// Grid geometry rejected: zero dimensions, a cell count that overflows,
    /// non-positive spacing, or heights not strictly increasing.
    InvalidGeometry = 3,

    /// Threshold rejected: non-finite value, non-positive radius, inverted
    /// height band, or valid fraction outside [0, 1].
    InvalidParameter = 4,

    /// No vertical level lies within the valid height band.
    EmptyHeightRange = 5,

    /// Reflectivity volume length differs from nx * ny * nz.
    VolumeSizeMismatch = 6,

    /// `conv_strat_compute_partition` called before `conv_strat_set_grid`.
    GridNotSet = 7,

    /// Results requested before a successful partition.
    NotComputed = 8,

    /// Output buffer shorter than nx * ny.
    BufferTooSmall = 9,

    /// A radius covers too many grid cells for the current spacing.
    KernelTooLarge = 10,
}

impl From<DefaultConvStratError> for ConvStratErrorCode {
    fn from(error: DefaultConvStratError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    static LAST_ERROR: RefCell<(Option<CString>, ConvStratErrorCode)> = const { RefCell::new((None, ConvStratErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, ConvStratErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, ConvStratErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns null if the last call on this thread succeeded.
///
/// # Lifetime
/// The pointer stays valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// ConvStratErrorCode err = conv_strat_compute_partition(cs, dbz, n, -9999.0f);
/// if (err != ConvStratErrorCode::Ok) {
///     fprintf(stderr, "Partition failed: %s\n", conv_strat_get_last_error());
/// }
/// ```
#[no_mangle]
pub extern "C" fn conv_strat_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code (`Ok` if the last call succeeded).
#[no_mangle]
pub extern "C" fn conv_strat_get_last_error_code() -> ConvStratErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
