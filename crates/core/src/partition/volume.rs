//! Borrowed view of a reflectivity volume with its missing-value sentinel

use crate::error::ConvStratError;
use crate::grid::GridGeometry;

/// True when `value` equals the sentinel. A NaN sentinel matches NaN samples.
#[inline]
pub(crate) fn is_missing(value: f32, missing: f32) -> bool {
    value == missing || (missing.is_nan() && value.is_nan())
}

/// Reflectivity samples in `(z, y, x)` order, borrowed for one partition call
#[derive(Debug, Clone, Copy)]
pub struct ReflectivityVolume<'a> {
    data: &'a [f32],
    missing: f32,
    level_size: usize,
}

impl<'a> ReflectivityVolume<'a> {
    /// Wrap `data` after checking it holds exactly `nx * ny * nz` samples
    ///
    /// # Errors
    ///
    /// Returns `ConvStratError::VolumeSizeMismatch` if the length is wrong.
    pub fn new(
        data: &'a [f32],
        geometry: &GridGeometry,
        missing: f32,
    ) -> Result<Self, ConvStratError> {
        let expected = geometry.volume_size();
        if data.len() != expected {
            return Err(ConvStratError::VolumeSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            missing,
            level_size: geometry.horizontal_size(),
        })
    }

    /// Caller-supplied missing-value sentinel
    #[must_use]
    pub fn missing(&self) -> f32 {
        self.missing
    }

    /// Samples of one vertical level
    #[must_use]
    pub fn level(&self, iz: usize) -> &'a [f32] {
        &self.data[iz * self.level_size..(iz + 1) * self.level_size]
    }

    /// The sample as dBZ if it is present, finite and at least `min_valid_dbz`
    #[inline]
    #[must_use]
    pub fn valid_dbz(&self, value: f32, min_valid_dbz: f32) -> Option<f32> {
        if is_missing(value, self.missing) || !value.is_finite() || value < min_valid_dbz {
            None
        } else {
            Some(value)
        }
    }
}
