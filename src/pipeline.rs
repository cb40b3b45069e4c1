/// Round driver orchestrating parse, assembly, and rendering.
use crate::backend::{RenderSettings, SceneBackend};
use crate::camera::CameraRig;
use crate::constants::{BUILDING_REGION_SCALE, CAMERA_RING_SCALE, LOOK_AT_HEIGHT_SCALE};
use crate::error::{PipelineError, Result};
use crate::grid::DensityGrid;
use crate::placement::{PlacementConfig, sample_footprints};
use crate::scene::SceneBuilder;
use clap::ValueEnum;
use glam::Vec3;
use rand::Rng;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Scene-density-mode tag encoded into output directory names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SceneMode {
    Close,
    #[default]
    Moderate,
    Far,
    Dense,
}

impl fmt::Display for SceneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            SceneMode::Close => "close",
            SceneMode::Moderate => "moderate",
            SceneMode::Far => "far",
            SceneMode::Dense => "dense",
        };
        f.write_str(tag)
    }
}

/// Configuration for a generation run, supplied once and read-only after.
/// The save directory is explicit; there is no process-wide default.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory receiving one numbered subdirectory per round.
    pub save_dir: PathBuf,
    /// Density grid file; densities are drawn at random when absent.
    pub input: Option<PathBuf>,
    /// Grid extents used in random density mode.
    pub dims: (usize, usize, usize),
    pub mode: SceneMode,
    pub camera_count: usize,
    pub building_count: usize,
    /// Whether to produce the mist (depth) pass alongside RGB.
    pub depth: bool,
    pub max_placement_attempts: usize,
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.camera_count == 0 {
            return Err(PipelineError::Config("camera_count must be positive".into()));
        }
        if self.input.is_none() {
            let (x, y, z) = self.dims;
            if x == 0 || y == 0 || z == 0 {
                return Err(PipelineError::Config(format!(
                    "random density mode needs positive dims, got {x}x{y}x{z}"
                )));
            }
        }
        Ok(())
    }
}

/// Drives complete scene generation rounds against one backend.
///
/// The backend is stateful and non-reentrant, so every round runs strictly
/// sequentially: grid parse, camera rig, haze volumes + label, ground,
/// buildings, sun, RGB renders, then depth renders.
#[derive(Debug)]
pub struct ScenePipeline<'a, B: SceneBackend + ?Sized> {
    backend: &'a mut B,
    config: PipelineConfig,
}

impl<'a, B: SceneBackend + ?Sized> ScenePipeline<'a, B> {
    pub fn new(backend: &'a mut B, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// Run one round. The round index names the output subdirectory; a
    /// pre-existing directory fails the round rather than overwriting data.
    pub fn run_round<R: Rng>(&mut self, round: usize, rng: &mut R) -> Result<()> {
        let round_dir = self.config.save_dir.join(round.to_string());
        fs::create_dir(&round_dir)?;
        log::info!("round {round}: writing to {}", round_dir.display());

        self.backend.clear();
        self.backend.set_render_settings(RenderSettings::default());

        let density = match &self.config.input {
            Some(path) => DensityGrid::load(path)?,
            None => DensityGrid::random(self.config.dims, rng),
        };
        let (dim_x, _, dim_z) = density.dims();
        let ground_radius = dim_x as f32 / 2.0;
        let camera_height = dim_z as f32 / 3.0;

        let rig = CameraRig::build(
            self.backend,
            self.config.camera_count,
            ground_radius * CAMERA_RING_SCALE,
            camera_height,
            Vec3::new(0.0, 0.0, camera_height * LOOK_AT_HEIGHT_SCALE),
        );
        let mut camera_log = BufWriter::new(File::create(round_dir.join("camera.txt"))?);
        rig.write_log(&mut camera_log)?;
        camera_log.flush()?;

        let set_index = 0;
        let image_dir = round_dir.join(format!("image_set_{}{set_index}", self.config.mode));
        fs::create_dir_all(&image_dir)?;

        let mut label = BufWriter::new(File::create(
            image_dir.join(format!("label{set_index}.txt")),
        )?);
        let mut builder = SceneBuilder::new(self.backend);
        builder.build_haze(&density, &mut label)?;
        label.flush()?;

        builder.build_ground(ground_radius);

        let placement = PlacementConfig {
            target_count: self.config.building_count,
            bound_radius: ground_radius as f64 * BUILDING_REGION_SCALE,
            height_bound: camera_height as f64,
            max_attempts: self.config.max_placement_attempts,
        };
        let footprints = sample_footprints(&placement, rng)?;
        builder.build_buildings(&footprints, rng);
        builder.build_sun();

        self.render_pass(&rig, &image_dir, false)?;
        if self.config.depth {
            let depth_dir = round_dir.join(format!("depth_set_{}{set_index}", self.config.mode));
            fs::create_dir_all(&depth_dir)?;
            self.render_pass(&rig, &depth_dir, true)?;
        }

        log::info!("round {round} complete");
        Ok(())
    }

    /// Render every rig camera into `dir`, verifying each output exists.
    /// Renders are never retried; a missing file fails the round.
    fn render_pass(&mut self, rig: &CameraRig, dir: &std::path::Path, depth: bool) -> Result<()> {
        for cam in rig.cameras() {
            let output = dir.join(&cam.name);
            let written = if depth {
                self.backend.render_depth(cam.handle, &output)?
            } else {
                self.backend.render(cam.handle, &output)?
            };
            if !written.exists() {
                return Err(PipelineError::RenderFailure {
                    camera: cam.name.clone(),
                    path: written,
                });
            }
            log::debug!("rendered {} -> {}", cam.name, written.display());
        }
        Ok(())
    }
}
