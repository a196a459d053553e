//! voxel_skeleton - Curve skeletons of binary volumes, annotated with thickness
//!
//! This crate thins a binary voxel object down to a one-voxel-wide skeleton
//! without changing its topology, measures the local thickness of the object
//! everywhere, and merges the two into a single field: the thickness on
//! skeleton voxels and [`NOT_ON_SKELETON`] (-1) elsewhere.
//!
//! # Features
//!
//! - **Topology-preserving thinning**: directional border erosion with an
//!   exact (26, 6) simple-point test, preserving components, tunnels and
//!   cavities
//! - **Exact Euclidean distance transform**: separable, anisotropic spacing
//! - **Local thickness**: diameter of the largest inscribed ball covering
//!   each voxel
//! - **MetaImage I/O**: `.mhd` headers with `.raw` or local payloads
//!
//! # Example
//!
//! ```ignore
//! use voxel_skeleton::{metaimage, pipeline, PipelineConfig};
//!
//! let (mask, header) = metaimage::read_mask(Path::new("scan/coral.mhd"))?;
//! let out = pipeline::run(&mask, &PipelineConfig::default())?;
//! metaimage::write_field(Path::new("scan/coral_skel.mhd"), &out.masked, Some(&header))?;
//!
//! println!("{} skeleton voxels", out.stats.skeleton_voxels);
//! ```

pub mod error;
pub mod grid;
pub use error::{Result, SkeletonError};
pub use grid::{Dims, Field, Mask, Spacing, VoxelGrid};

// 3×3×3 neighborhood tables and the simple-point test
pub mod neighborhood;

// Thinning
pub mod thinning;
pub use thinning::{skeletonize, thin, ThinningConfig, ThinningOutput, ThinningStats};

// Distance transform and local thickness
pub mod distance;
pub mod thickness;
pub use distance::{distance_transform, squared_edt};
pub use thickness::{local_thickness, ThicknessConfig};

pub mod merge;
pub use merge::{merge, NOT_ON_SKELETON};

pub mod topology;
pub use topology::TopologySummary;

// Whole pipeline with per-stage timing
pub mod pipeline;
pub use pipeline::{PipelineConfig, PipelineOutput, PipelineStats};

// Volume file format
pub mod metaimage;
pub use metaimage::{DataFile, ElementType, MetaHeader};

#[cfg(test)]
pub mod test_utils;
