//! Column-maximum reflectivity within the valid height band

use super::derived::DerivedFields;
use super::volume::ReflectivityVolume;
use crate::grid::LevelRange;
use crate::params::ConvStratParams;

/// Reduce the volume to its column maximum over `levels`
///
/// Samples that are missing or below `min_valid_dbz` are ignored. Columns with
/// no valid sample get the missing sentinel. Sets `conv_from_col_max` where the
/// maximum reaches `dbz_for_definite_convection`.
pub fn compute_col_max(
    volume: &ReflectivityVolume<'_>,
    levels: LevelRange,
    params: &ConvStratParams,
    fields: &mut DerivedFields,
) {
    let missing = volume.missing();
    let col_max = fields.col_max_dbz.as_mut_slice();
    let conv_flags = fields.conv_from_col_max.as_mut_slice();

    for (cell, (max_out, conv_out)) in col_max.iter_mut().zip(conv_flags.iter_mut()).enumerate() {
        let column_max = levels
            .indices()
            .filter_map(|iz| volume.valid_dbz(volume.level(iz)[cell], params.min_valid_dbz))
            .reduce(f32::max);

        match column_max {
            Some(dbz) => {
                *max_out = dbz;
                *conv_out = dbz >= params.dbz_for_definite_convection;
            }
            None => {
                *max_out = missing;
                *conv_out = false;
            }
        }
    }
}
