//! Convective/Stratiform Partition Core Library
//!
//! Partitions a 3D radar reflectivity volume into convective and stratiform
//! regions. Each column is classified from two lines of evidence:
//! - the column-maximum reflectivity within a valid height band
//! - the horizontal texture of reflectivity, computed per level in parallel
//!
//! Convective seeds are then dilated by a radius kernel to produce the final
//! partition.
//!
//! ## Pipeline
//!
//! ```text
//! volume ──► column max ──┐
//!        └─► texture ─────┴─► seeds ──► dilation ──► partition
//! ```

// Configuration and errors
pub mod error;
pub mod params;

// Grid geometry, kernels and field storage
pub mod grid;

// Partition pipeline stages
pub mod partition;

// Orchestrator
pub mod conv_strat;

pub use conv_strat::{ConvStrat, ConvStratState};
pub use error::ConvStratError;
pub use params::ConvStratParams;

pub use grid::{
    FieldData, GridGeometry, Kernel, KernelCache, LevelRange, KM_PER_DEG_AT_EQ, MAX_KERNEL_CELLS,
};
pub use partition::{DerivedFields, PartitionCategory, PartitionStats};
