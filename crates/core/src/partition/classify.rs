//! Convective seeding, dilation and final categories

use super::category::PartitionCategory;
use super::derived::DerivedFields;
use super::volume::is_missing;
use crate::grid::Kernel;

/// Build `partition`, `conv_dbz` and `strat_dbz` from the column-max and
/// texture evidence already in `fields`
///
/// Seeds are cells flagged by either `conv_from_col_max` or
/// `conv_from_texture`. Every cell within the convective kernel of a seed is
/// convective, including cells whose own column is missing. Remaining cells
/// with a valid column maximum are stratiform; the rest stay missing.
pub fn classify(kernel: &Kernel, missing: f32, fields: &mut DerivedFields) {
    let nx = fields.partition.width;
    let ny = fields.partition.height;

    let partition = fields.partition.as_mut_slice();
    partition.fill(PartitionCategory::Missing);

    // Dilation is a set union, so seed order does not matter
    for iy in 0..ny {
        for ix in 0..nx {
            let cell = iy * nx + ix;
            let is_seed =
                fields.conv_from_col_max.data[cell] || fields.conv_from_texture.data[cell];
            if !is_seed {
                continue;
            }
            for target in kernel.neighbours(ix, iy) {
                partition[target] = PartitionCategory::Convective;
            }
        }
    }

    let col_max = fields.col_max_dbz.as_slice();
    let conv_dbz = fields.conv_dbz.as_mut_slice();
    let strat_dbz = fields.strat_dbz.as_mut_slice();

    for (cell, category) in partition.iter_mut().enumerate() {
        let dbz = col_max[cell];
        if *category != PartitionCategory::Convective && !is_missing(dbz, missing) {
            *category = PartitionCategory::Stratiform;
        }

        match *category {
            PartitionCategory::Convective => {
                conv_dbz[cell] = dbz;
                strat_dbz[cell] = missing;
            }
            PartitionCategory::Stratiform => {
                conv_dbz[cell] = missing;
                strat_dbz[cell] = dbz;
            }
            PartitionCategory::Missing => {
                conv_dbz[cell] = missing;
                strat_dbz[cell] = missing;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridGeometry;

    const MISSING: f32 = -999.0;

    fn setup(nx: usize, ny: usize, radius_km: f32) -> (Kernel, DerivedFields) {
        let geometry = GridGeometry::new(nx, ny, 1.0, 1.0, vec![1.0]).unwrap();
        (
            Kernel::build(&geometry, radius_km).unwrap(),
            DerivedFields::new(nx, ny, MISSING),
        )
    }

    #[test]
    fn test_no_seeds_valid_cells_are_stratiform() {
        let (kernel, mut fields) = setup(3, 1, 1.5);
        fields.col_max_dbz.data = vec![20.0, MISSING, 30.0];

        classify(&kernel, MISSING, &mut fields);

        assert_eq!(
            fields.partition.as_slice(),
            &[
                PartitionCategory::Stratiform,
                PartitionCategory::Missing,
                PartitionCategory::Stratiform
            ]
        );
        assert_eq!(fields.strat_dbz.as_slice(), &[20.0, MISSING, 30.0]);
        assert!(fields.conv_dbz.as_slice().iter().all(|&v| v == MISSING));
    }

    #[test]
    fn test_dilation_reaches_missing_columns() {
        let (kernel, mut fields) = setup(5, 1, 1.5);
        fields.col_max_dbz.data = vec![MISSING, MISSING, 55.0, 20.0, 20.0];
        fields.conv_from_col_max.data[2] = true;

        classify(&kernel, MISSING, &mut fields);

        assert_eq!(
            fields.partition.as_slice(),
            &[
                PartitionCategory::Missing,
                PartitionCategory::Convective,
                PartitionCategory::Convective,
                PartitionCategory::Convective,
                PartitionCategory::Stratiform
            ]
        );
        // Dilated onto a missing column: convective, but no dBZ to copy
        assert_eq!(fields.conv_dbz.as_slice(), &[MISSING, MISSING, 55.0, 20.0, MISSING]);
        assert_eq!(fields.strat_dbz.as_slice(), &[MISSING, MISSING, MISSING, MISSING, 20.0]);
    }

    #[test]
    fn test_texture_seed_dilates() {
        let (kernel, mut fields) = setup(3, 3, 1.0);
        fields.col_max_dbz.fill(30.0);
        fields.conv_from_texture.set(0, 0, true);

        classify(&kernel, MISSING, &mut fields);

        assert_eq!(fields.partition.get(0, 0), PartitionCategory::Convective);
        assert_eq!(fields.partition.get(1, 0), PartitionCategory::Convective);
        assert_eq!(fields.partition.get(0, 1), PartitionCategory::Convective);
        assert_eq!(fields.partition.get(1, 1), PartitionCategory::Stratiform);
        assert_eq!(fields.partition.get(2, 2), PartitionCategory::Stratiform);
    }

    #[test]
    fn test_overlapping_seeds_union() {
        let (kernel, mut fields) = setup(7, 1, 1.0);
        fields.col_max_dbz.fill(20.0);
        fields.conv_from_col_max.data[2] = true;
        fields.conv_from_texture.data[3] = true;

        classify(&kernel, MISSING, &mut fields);

        let convective: Vec<usize> = fields
            .partition
            .as_slice()
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == PartitionCategory::Convective)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(convective, vec![1, 2, 3, 4]);
    }
}
