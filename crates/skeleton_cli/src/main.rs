//! Voxel skeleton extractor.
//!
//! Reads a binary MetaImage volume, thins it to a topology-preserving
//! skeleton and writes a float volume holding the local thickness on
//! skeleton voxels and -1 everywhere else.
//!
//! ```text
//! skeletonize <DIR> <NAME>
//!   reads   <DIR>/<NAME>.mhd
//!   writes  <DIR>/<NAME>_skel.mhd + <DIR>/<NAME>_skel.raw
//! ```

mod paths;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use voxel_skeleton::{
	metaimage, pipeline, topology, Field, MetaHeader, PipelineConfig, PipelineStats,
};

use paths::VolumePaths;

/// Skeletonize a binary volume and annotate the skeleton with local thickness.
#[derive(Parser, Debug)]
#[command(name = "skeletonize", version)]
#[command(about = "Writes <NAME>_skel.mhd: local thickness on the skeleton, -1 elsewhere")]
struct Args {
	/// Directory holding the input volume; the output is written here too.
	dir: PathBuf,

	/// Volume name, with or without the .mhd extension.
	name: String,
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let paths = VolumePaths::resolve(&args.dir, &args.name);
	let stats = run(&paths)?;

	log::info!(
		"{} skeleton voxels out of {} in {:.2}s",
		stats.skeleton_voxels,
		stats.object_voxels,
		stats.total_us as f64 / 1e6
	);
	println!("{}", paths.output.display());
	Ok(())
}

/// Load, skeletonize and save one volume.
fn run(paths: &VolumePaths) -> Result<PipelineStats> {
	log::info!("Loading {}", paths.input.display());
	let (mask, header) = metaimage::read_mask(&paths.input)
		.with_context(|| format!("Failed to load volume: {}", paths.input.display()))?;

	let [x, y, z] = mask.dims();
	let before = topology::summarize(&mask);
	log::info!(
		"Volume {}x{}x{}, spacing {:?}: {} voxels, {} components, euler {}",
		x,
		y,
		z,
		mask.spacing().0,
		before.voxels,
		before.components,
		before.euler
	);

	let out = pipeline::run(&mask, &PipelineConfig::default()).context("Skeleton pipeline failed")?;

	let after = topology::summarize(&out.skeleton);
	log::info!(
		"Skeleton: {} voxels, {} components, euler {}",
		after.voxels,
		after.components,
		after.euler
	);
	if after.components != before.components || after.euler != before.euler {
		log::warn!("Skeleton topology differs from the input");
	}

	save(&paths.output, &out.masked, &header)?;
	Ok(out.stats)
}

fn save(path: &Path, field: &Field, header: &MetaHeader) -> Result<()> {
	log::info!("Writing {}", path.display());
	metaimage::write_field(path, field, Some(header))
		.with_context(|| format!("Failed to write volume: {}", path.display()))
}
