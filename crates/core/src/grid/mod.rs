//! Grid geometry, radius kernels and 2D field storage

pub mod fields;
pub mod geometry;
pub mod kernel;

// Re-export main types
pub use fields::FieldData;
pub use geometry::{GridGeometry, LevelRange, KM_PER_DEG_AT_EQ};
pub use kernel::{Kernel, KernelCache, KernelPoint, MAX_KERNEL_CELLS};
