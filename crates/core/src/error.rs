//! Error types for partition computation.

use thiserror::Error;

/// Configuration errors detected before any partition work starts.
///
/// Data-quality problems (sparse texture neighbourhoods, empty columns) are not
/// errors; they surface as missing cells in the derived fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvStratError {
    /// `compute_partition` was called before `set_grid`.
    #[error("grid geometry has not been set")]
    GridNotSet,

    /// The grid geometry violates one of its invariants.
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),

    /// A threshold or radius is outside its allowed range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in `ConvStratParams`
        name: &'static str,
        /// What is wrong with the value
        reason: String,
    },

    /// No vertical level falls inside the valid height band.
    #[error("no vertical levels between {min_ht_km} km and {max_ht_km} km")]
    EmptyHeightRange {
        /// Lower bound of the band (km)
        min_ht_km: f32,
        /// Upper bound of the band (km)
        max_ht_km: f32,
    },

    /// A radius spans more grid cells than a kernel may hold.
    #[error("radius {radius_km} km spans more than {limit} grid cells")]
    KernelTooLarge {
        /// Requested radius (km)
        radius_km: f32,
        /// Maximum number of cells in the kernel bounding box
        limit: usize,
    },

    /// The reflectivity volume does not match `nx * ny * nz`.
    #[error("reflectivity volume has {actual} samples, grid expects {expected}")]
    VolumeSizeMismatch {
        /// Sample count implied by the grid
        expected: usize,
        /// Sample count supplied by the caller
        actual: usize,
    },
}

impl ConvStratError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
