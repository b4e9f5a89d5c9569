//! Partition pipeline stages
//!
//! The stages run in order on a shared [`DerivedFields`]:
//! 1. [`compute_col_max`] - column maximum and definite-convection seeds
//! 2. [`TextureEngine`] - per-level texture (parallel) and texture seeds
//! 3. [`classify`] - dilation of seeds and final categories

mod category;
mod classify;
mod column_max;
mod derived;
mod stats;
mod texture;
mod volume;

pub use category::PartitionCategory;
pub use classify::classify;
pub use column_max::compute_col_max;
pub use derived::DerivedFields;
pub use stats::PartitionStats;
pub use texture::TextureEngine;
pub use volume::ReflectivityVolume;
