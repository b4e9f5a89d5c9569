//! Summary counts for a completed partition

use super::category::PartitionCategory;
use super::derived::DerivedFields;
use serde::Serialize;

/// Cell counts from one partition pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PartitionStats {
    /// Cells in the horizontal grid
    pub n_cells: usize,
    pub n_missing: usize,
    pub n_stratiform: usize,
    pub n_convective: usize,
    /// Seeds flagged by the column maximum
    pub n_seeds_col_max: usize,
    /// Seeds flagged by texture
    pub n_seeds_texture: usize,
}

impl PartitionStats {
    #[must_use]
    pub fn from_fields(fields: &DerivedFields) -> Self {
        let mut stats = Self {
            n_cells: fields.partition.len(),
            ..Default::default()
        };
        for category in fields.partition.as_slice() {
            match category {
                PartitionCategory::Missing => stats.n_missing += 1,
                PartitionCategory::Stratiform => stats.n_stratiform += 1,
                PartitionCategory::Convective => stats.n_convective += 1,
            }
        }
        stats.n_seeds_col_max = fields
            .conv_from_col_max
            .as_slice()
            .iter()
            .filter(|&&flag| flag)
            .count();
        stats.n_seeds_texture = fields
            .conv_from_texture
            .as_slice()
            .iter()
            .filter(|&&flag| flag)
            .count();
        stats
    }

    /// Convective share of the non-missing cells (0.0 when none are valid)
    #[must_use]
    pub fn convective_fraction(&self) -> f32 {
        let n_valid = self.n_convective + self.n_stratiform;
        if n_valid == 0 {
            0.0
        } else {
            self.n_convective as f32 / n_valid as f32
        }
    }
}
