//! Error taxonomy for grid access and MetaImage I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the skeleton pipeline.
///
/// `Format` and `Io` only originate at the load/save boundary. `OutOfRange`
/// and `ShapeMismatch` indicate a defect in the caller; the algorithms
/// themselves never trigger them on well-formed grids.
#[derive(Debug, Error)]
pub enum SkeletonError {
  /// Malformed header, unsupported element type or payload size mismatch.
  #[error("invalid volume format: {0}")]
  Format(String),

  /// File missing, unreadable or unwritable.
  #[error("I/O error on {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Coordinate outside `[0, dim)` on some axis.
  #[error("coordinate {coord:?} outside grid of dimensions {dims:?}")]
  OutOfRange { coord: [i64; 3], dims: [usize; 3] },

  /// Two grids (or a grid and a buffer) that must agree in shape do not.
  #[error("shape mismatch: expected {expected}, found {found}")]
  ShapeMismatch { expected: String, found: String },

  /// Spacing components must be finite and strictly positive.
  #[error("invalid voxel spacing {0:?}")]
  InvalidSpacing([f64; 3]),
}

impl SkeletonError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn format(msg: impl Into<String>) -> Self {
    Self::Format(msg.into())
  }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SkeletonError>;
