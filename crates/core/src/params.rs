//! Threshold configuration for the convective/stratiform partition
//!
//! All thresholds are plain values; they take effect on the next call to
//! `ConvStrat::compute_partition`. Heights and radii are in kilometres,
//! reflectivities in dBZ.

use crate::error::ConvStratError;
use serde::{Deserialize, Serialize};

/// Thresholds controlling column-max extraction, texture and dilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvStratParams {
    /// Lowest height included in the analysis (km)
    pub min_valid_ht_km: f32,

    /// Highest height included in the analysis (km)
    pub max_valid_ht_km: f32,

    /// Samples below this reflectivity are ignored (dBZ)
    pub min_valid_dbz: f32,

    /// Column maximum at or above this is convective regardless of texture (dBZ)
    pub dbz_for_definite_convection: f32,

    /// Radius of influence around each convective seed (km)
    pub convective_radius_km: f32,

    /// Radius of the neighbourhood used for texture (km)
    pub texture_radius_km: f32,

    /// Minimum fraction of the texture kernel that must hold valid samples
    /// before a level contributes a texture value (0.0 to 1.0)
    pub min_valid_fraction_for_texture: f32,

    /// Mean texture at or above this marks a convective seed.
    /// Texture is the standard deviation of dBZ², so the value is in dBZ².
    pub min_texture_for_convection: f32,
}

impl Default for ConvStratParams {
    fn default() -> Self {
        Self {
            min_valid_ht_km: 0.0,
            max_valid_ht_km: 25.0,
            min_valid_dbz: 0.0,
            dbz_for_definite_convection: 53.0,
            convective_radius_km: 5.0,
            texture_radius_km: 7.0,
            min_valid_fraction_for_texture: 0.33,
            min_texture_for_convection: 225.0, // 15 dBZ on a sqrt(sdev) scale
        }
    }
}

impl ConvStratParams {
    /// Check every threshold for values the algorithm cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ConvStratError::InvalidParameter` naming the first offending
    /// field: non-finite values, non-positive radii, an inverted height band,
    /// or a valid fraction outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConvStratError> {
        let finite = [
            ("min_valid_ht_km", self.min_valid_ht_km),
            ("max_valid_ht_km", self.max_valid_ht_km),
            ("min_valid_dbz", self.min_valid_dbz),
            ("dbz_for_definite_convection", self.dbz_for_definite_convection),
            ("convective_radius_km", self.convective_radius_km),
            ("texture_radius_km", self.texture_radius_km),
            (
                "min_valid_fraction_for_texture",
                self.min_valid_fraction_for_texture,
            ),
            ("min_texture_for_convection", self.min_texture_for_convection),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConvStratError::invalid_parameter(
                    name,
                    format!("must be finite, got {value}"),
                ));
            }
        }

        if self.convective_radius_km <= 0.0 {
            return Err(ConvStratError::invalid_parameter(
                "convective_radius_km",
                format!("must be positive, got {}", self.convective_radius_km),
            ));
        }
        if self.texture_radius_km <= 0.0 {
            return Err(ConvStratError::invalid_parameter(
                "texture_radius_km",
                format!("must be positive, got {}", self.texture_radius_km),
            ));
        }
        if self.min_valid_ht_km > self.max_valid_ht_km {
            return Err(ConvStratError::invalid_parameter(
                "min_valid_ht_km",
                format!(
                    "{} km is above max_valid_ht_km {} km",
                    self.min_valid_ht_km, self.max_valid_ht_km
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_valid_fraction_for_texture) {
            return Err(ConvStratError::invalid_parameter(
                "min_valid_fraction_for_texture",
                format!(
                    "must be within [0, 1], got {}",
                    self.min_valid_fraction_for_texture
                ),
            ));
        }
        Ok(())
    }
}
