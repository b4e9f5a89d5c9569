//! Derived `nx * ny` grids produced by one partition pass

use super::category::PartitionCategory;
use crate::grid::FieldData;

/// All per-cell outputs of a partition pass
///
/// Float fields hold the caller's missing sentinel where undefined. The
/// storage is reused between calls when the grid shape is unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    /// Column-maximum reflectivity within the valid height band (dBZ)
    pub col_max_dbz: FieldData<f32>,
    /// Column maximum reached the definite-convection threshold
    pub conv_from_col_max: FieldData<bool>,
    /// Texture averaged over the levels that produced one
    pub mean_texture: FieldData<f32>,
    /// Valid fraction of the texture kernel, averaged over all levels
    pub fraction_active: FieldData<f32>,
    /// Mean texture reached the texture threshold
    pub conv_from_texture: FieldData<bool>,
    /// Final category per cell
    pub partition: FieldData<PartitionCategory>,
    /// Column maximum where convective, missing elsewhere
    pub conv_dbz: FieldData<f32>,
    /// Column maximum where stratiform, missing elsewhere
    pub strat_dbz: FieldData<f32>,
}

impl DerivedFields {
    #[must_use]
    pub fn new(nx: usize, ny: usize, missing: f32) -> Self {
        Self {
            col_max_dbz: FieldData::with_value(nx, ny, missing),
            conv_from_col_max: FieldData::with_value(nx, ny, false),
            mean_texture: FieldData::with_value(nx, ny, missing),
            fraction_active: FieldData::with_value(nx, ny, 0.0),
            conv_from_texture: FieldData::with_value(nx, ny, false),
            partition: FieldData::with_value(nx, ny, PartitionCategory::Missing),
            conv_dbz: FieldData::with_value(nx, ny, missing),
            strat_dbz: FieldData::with_value(nx, ny, missing),
        }
    }

    /// Reset every field to its empty state for a new pass
    pub fn reset(&mut self, missing: f32) {
        self.col_max_dbz.fill(missing);
        self.conv_from_col_max.fill(false);
        self.mean_texture.fill(missing);
        self.fraction_active.fill(0.0);
        self.conv_from_texture.fill(false);
        self.partition.fill(PartitionCategory::Missing);
        self.conv_dbz.fill(missing);
        self.strat_dbz.fill(missing);
    }

    #[must_use]
    pub fn has_shape(&self, nx: usize, ny: usize) -> bool {
        self.partition.has_shape(nx, ny)
    }
}
