/// Hazed-scene dataset generator entry point
use anyhow::Context;
use clap::Parser;
use haze_scene_gen::backend::ManifestBackend;
use haze_scene_gen::constants::{DEFAULT_MAX_PLACEMENT_ATTEMPTS, DEFAULT_SEED_STRIDE};
use haze_scene_gen::pipeline::{PipelineConfig, SceneMode, ScenePipeline};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "haze-scene-gen", about = "Generate paired RGB/depth/label hazed-scene datasets")]
struct Args {
    /// Voxel density input file; densities are drawn at random when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Root output directory, one numbered subdirectory per round
    #[arg(long)]
    save_dir: PathBuf,

    /// Number of independent rounds to generate
    #[arg(long, default_value_t = 15)]
    rounds: usize,

    /// Base RNG seed; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Cameras on the ring
    #[arg(long, default_value_t = 4)]
    cameras: usize,

    /// Buildings to place per scene
    #[arg(long, default_value_t = 6)]
    buildings: usize,

    /// Scene-density-mode tag encoded in set directory names
    #[arg(long, value_enum, default_value_t = SceneMode::Moderate)]
    mode: SceneMode,

    /// Skip the mist (depth) pass
    #[arg(long)]
    no_depth: bool,

    /// Grid extents for random density mode
    #[arg(long, default_value_t = 1)]
    dim_x: usize,
    #[arg(long, default_value_t = 1)]
    dim_y: usize,
    #[arg(long, default_value_t = 1)]
    dim_z: usize,

    /// Rejection-sampling attempt budget per round
    #[arg(long, default_value_t = DEFAULT_MAX_PLACEMENT_ATTEMPTS)]
    max_placement_attempts: usize,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let base_seed = args.seed.unwrap_or_else(rand::random);
    log::info!("base seed {base_seed}");

    fs::create_dir_all(&args.save_dir)
        .with_context(|| format!("creating save directory {}", args.save_dir.display()))?;

    let config = PipelineConfig {
        save_dir: args.save_dir,
        input: args.input,
        dims: (args.dim_x, args.dim_y, args.dim_z),
        mode: args.mode,
        camera_count: args.cameras,
        building_count: args.buildings,
        depth: !args.no_depth,
        max_placement_attempts: args.max_placement_attempts,
    };

    let mut backend = ManifestBackend::new();
    let mut pipeline = ScenePipeline::new(&mut backend, config)?;

    let pb = ProgressBar::new(args.rounds as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/blue}] {pos}/{len} rounds ({percent}%) {msg}")
            .unwrap()
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Generating rounds");

    // Each round gets its own seed so a failed round can be re-run alone.
    let mut failed = 0usize;
    for round in 0..args.rounds {
        let round_seed = base_seed.wrapping_add(round as u64 * DEFAULT_SEED_STRIDE);
        let mut rng = StdRng::seed_from_u64(round_seed);
        if let Err(err) = pipeline.run_round(round, &mut rng) {
            log::error!("round {round} failed (seed {round_seed}): {err}");
            failed += 1;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Rounds complete");

    if failed > 0 {
        anyhow::bail!("{failed} of {} rounds failed", args.rounds);
    }
    Ok(())
}
