//! C ABI for the convective/stratiform partition engine
//!
//! Typical call sequence from C/C++:
//! 1. `conv_strat_new` to create an instance
//! 2. `conv_strat_set_grid` and optionally `conv_strat_set_thresholds`
//! 3. `conv_strat_compute_partition` per reflectivity volume
//! 4. `conv_strat_copy_partition` / `conv_strat_copy_float_field` /
//!    `conv_strat_copy_flag_field` into caller buffers of `nx * ny`
//! 5. `conv_strat_destroy`
//!
//! Every fallible call returns a `ConvStratErrorCode`; the message for the
//! last failure on the calling thread is available from
//! `conv_strat_get_last_error`.

mod config;
mod error;
mod helpers;
mod instance;
mod partition;
mod results;

pub use config::{
    conv_strat_default_thresholds, conv_strat_get_state, conv_strat_get_thresholds,
    conv_strat_set_grid, conv_strat_set_thresholds, ConvStratGrid, ConvStratLifecycle,
    ConvStratThresholds,
};
pub use error::{conv_strat_get_last_error, conv_strat_get_last_error_code, ConvStratErrorCode};
pub use instance::{conv_strat_destroy, conv_strat_new, ConvStratInstance};
pub use partition::{conv_strat_compute_partition, conv_strat_free_arrays};
pub use results::{
    conv_strat_copy_flag_field, conv_strat_copy_float_field, conv_strat_copy_partition,
    conv_strat_get_summary, ConvStratFlagField, ConvStratFloatField, ConvStratSummary,
};
