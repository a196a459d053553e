//! Full skeleton pipeline: thinning and thickness in parallel, then merge.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ run(mask, config)                                               │
//! │                                                                 │
//! │            mask                                                 │
//! │        ┌─────┴──────────────┐        rayon::join                │
//! │        ▼                    ▼                                   │
//! │   thinning::thin      thickness::local_thickness                │
//! │        │              (distance → inscribed balls)              │
//! │        ▼                    ▼                                   │
//! │     skeleton            thickness                               │
//! │        └─────┬──────────────┘                                   │
//! │              ▼                                                  │
//! │        merge::merge → masked (thickness on skeleton, -1 off)    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both branches only read the input mask, so they share it by reference.

use web_time::Instant;

use crate::error::Result;
use crate::grid::{Field, Mask};
use crate::merge::merge;
use crate::thickness::{local_thickness, ThicknessConfig};
use crate::thinning::{thin, ThinningConfig, ThinningStats};

/// Configuration for both pipeline branches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineConfig {
  pub thinning: ThinningConfig,
  pub thickness: ThicknessConfig,
}

impl PipelineConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_thinning(mut self, thinning: ThinningConfig) -> Self {
    self.thinning = thinning;
    self
  }

  pub fn with_thickness(mut self, thickness: ThicknessConfig) -> Self {
    self.thickness = thickness;
    self
  }
}

/// Timing and counters from one pipeline run.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineStats {
  /// Thinning branch wall time in microseconds.
  pub thinning_us: u64,
  /// Distance + thickness branch wall time in microseconds.
  pub thickness_us: u64,
  /// Merge time in microseconds.
  pub merge_us: u64,
  /// End-to-end time in microseconds.
  pub total_us: u64,
  pub thinning: ThinningStats,
  /// Foreground voxels in the input.
  pub object_voxels: usize,
  /// Foreground voxels in the skeleton.
  pub skeleton_voxels: usize,
}

/// Every intermediate grid plus the merged output.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
  pub skeleton: Mask,
  pub thickness: Field,
  /// Thickness on the skeleton, [`NOT_ON_SKELETON`](crate::merge::NOT_ON_SKELETON) elsewhere.
  pub masked: Field,
  pub stats: PipelineStats,
}

/// Skeletonize `mask` and annotate the skeleton with local thickness.
///
/// An all-background mask is not an error: the result is an empty skeleton
/// and an output that is the sentinel everywhere.
#[tracing::instrument(skip_all, name = "pipeline::run", fields(dims = ?mask.dims()))]
pub fn run(mask: &Mask, config: &PipelineConfig) -> Result<PipelineOutput> {
  let start = Instant::now();
  let object_voxels = mask.foreground_count();
  if object_voxels == 0 {
    tracing::warn!("input mask has no foreground voxels, output will be all sentinel");
  }

  let ((thinned, thinning_us), (thickness, thickness_us)) = rayon::join(
    || {
      let start = Instant::now();
      let out = thin(mask, &config.thinning);
      (out, start.elapsed().as_micros() as u64)
    },
    || {
      let start = Instant::now();
      let field = local_thickness(mask, &config.thickness);
      (field, start.elapsed().as_micros() as u64)
    },
  );
  tracing::info!(
    cycles = thinned.stats.cycles,
    deleted = thinned.stats.deleted,
    remaining = thinned.stats.remaining,
    thinning_us,
    "thinning done"
  );
  tracing::info!(thickness_us, "thickness done");

  let merge_start = Instant::now();
  let masked = merge(&thinned.skeleton, &thickness)?;
  let merge_us = merge_start.elapsed().as_micros() as u64;

  let stats = PipelineStats {
    thinning_us,
    thickness_us,
    merge_us,
    total_us: start.elapsed().as_micros() as u64,
    thinning: thinned.stats,
    object_voxels,
    skeleton_voxels: thinned.stats.remaining,
  };
  tracing::info!(total_us = stats.total_us, skeleton_voxels = stats.skeleton_voxels, "pipeline done");

  Ok(PipelineOutput {
    skeleton: thinned.skeleton,
    thickness,
    masked,
    stats,
  })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
