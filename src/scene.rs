/// Scene assembly: haze voxels, ground, buildings, and lighting.
use crate::backend::SceneBackend;
use crate::constants::{
    GROUND_COLOR, GROUND_Z_OFFSET, SUN_POSITION, SUN_STRENGTH, VOXEL_HALF_EXTENT,
    VOXEL_MESH_MARGIN,
};
use crate::grid::{self, DensityGrid};
use crate::placement::Footprint;
use glam::Vec3;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::io::Write;

/// Assembles one round's scene through a [`SceneBackend`].
pub struct SceneBuilder<'a, B: SceneBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: SceneBackend + ?Sized> SceneBuilder<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Create one haze volume per voxel, writing the label file in lock-step
    /// with creation so the label is a transcript of exactly what was built.
    ///
    /// The grid is anchored so that its footprint is centred on the origin,
    /// first layer resting on the ground, one unit of spacing per cell.
    pub fn build_haze<W: Write>(
        &mut self,
        density: &DensityGrid,
        label: &mut W,
    ) -> std::io::Result<()> {
        let (dim_x, dim_y, dim_z) = density.dims();
        let origin = Vec3::new(
            (1 - dim_x as i64) as f32 * VOXEL_HALF_EXTENT,
            (1 - dim_y as i64) as f32 * VOXEL_HALF_EXTENT,
            VOXEL_HALF_EXTENT,
        );
        let spacing = 2.0 * VOXEL_HALF_EXTENT;
        let half_extent = VOXEL_HALF_EXTENT - VOXEL_MESH_MARGIN;

        let pb = ProgressBar::new((dim_x * dim_y * dim_z) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} voxels ({percent}%) {msg}")
                .unwrap()
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Creating haze volumes");

        grid::write_header(label, density.dims())?;
        for z in 0..dim_z {
            for y in 0..dim_y {
                for x in 0..dim_x {
                    let center = origin
                        + Vec3::new(x as f32, y as f32, z as f32) * spacing;
                    let value = density.get(x, y, z);
                    self.backend.create_volume(center, half_extent, value);
                    grid::write_density(label, value)?;
                    pb.inc(1);
                }
                writeln!(label)?;
            }
        }
        pb.finish_with_message("Haze volumes created");
        Ok(())
    }

    /// Add the circular ground plane under the voxel grid.
    pub fn build_ground(&mut self, radius: f32) {
        self.backend.create_plane(
            Vec3::new(0.0, 0.0, GROUND_Z_OFFSET),
            radius,
            GROUND_COLOR,
        );
    }

    /// Create one cylinder per accepted footprint, each with a random
    /// diffuse colour, standing on the ground plane.
    pub fn build_buildings<R: Rng>(&mut self, footprints: &[Footprint], rng: &mut R) {
        for fp in footprints {
            let color = [
                rng.gen_range(0.0..1.0f32),
                rng.gen_range(0.0..1.0f32),
                rng.gen_range(0.0..1.0f32),
            ];
            self.backend.create_cylinder(
                Vec3::new(fp.x as f32, fp.y as f32, fp.height as f32 / 2.0),
                fp.radius as f32,
                fp.height as f32,
                color,
            );
        }
        log::info!("created {} buildings", footprints.len());
    }

    /// Add the sun lamp.
    pub fn build_sun(&mut self) {
        self.backend
            .create_sun(Vec3::from_array(SUN_POSITION), SUN_STRENGTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ManifestBackend, SceneObject};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn haze_volumes_cover_the_grid_and_label_is_a_transcript() {
        let density = DensityGrid::parse("2\n1\n1\n0.15 0.27\n").unwrap();
        let mut backend = ManifestBackend::new();
        let mut label = Vec::new();
        SceneBuilder::new(&mut backend)
            .build_haze(&density, &mut label)
            .unwrap();

        assert_eq!(backend.objects().len(), 2);
        match backend.objects() {
            [
                SceneObject::Volume {
                    center: c0,
                    half_extent,
                    scatter_density: d0,
                },
                SceneObject::Volume {
                    center: c1,
                    scatter_density: d1,
                    ..
                },
            ] => {
                // dim 2x1x1: cells at x = -0.5 and +0.5, first layer at z = 0.5
                assert_eq!(*c0, [-0.5, 0.0, 0.5]);
                assert_eq!(*c1, [0.5, 0.0, 0.5]);
                assert!((half_extent - 0.4999).abs() < 1e-6);
                assert_eq!(*d0, 0.15);
                assert_eq!(*d1, 0.27);
            }
            other => panic!("unexpected objects: {other:?}"),
        }

        assert_eq!(
            String::from_utf8(label).unwrap(),
            "2\n1\n1\n0.150000 0.270000 \n"
        );
    }

    #[test]
    fn buildings_stand_on_the_ground() {
        let footprints = [Footprint {
            x: 1.0,
            y: -2.0,
            radius: 0.5,
            height: 3.0,
        }];
        let mut backend = ManifestBackend::new();
        let mut rng = StdRng::seed_from_u64(0);
        SceneBuilder::new(&mut backend).build_buildings(&footprints, &mut rng);

        match &backend.objects()[0] {
            SceneObject::Cylinder {
                center,
                radius,
                depth,
                color,
            } => {
                assert_eq!(*center, [1.0, -2.0, 1.5]);
                assert_eq!(*radius, 0.5);
                assert_eq!(*depth, 3.0);
                for channel in color {
                    assert!(*channel >= 0.0 && *channel < 1.0);
                }
            }
            other => panic!("expected cylinder, got {other:?}"),
        }
    }

    #[test]
    fn ground_and_sun_use_fixed_parameters() {
        let mut backend = ManifestBackend::new();
        let mut builder = SceneBuilder::new(&mut backend);
        builder.build_ground(4.0);
        builder.build_sun();

        match &backend.objects()[0] {
            SceneObject::Plane { center, radius, color } => {
                assert_eq!(*center, [0.0, 0.0, -0.001]);
                assert_eq!(*radius, 4.0);
                assert_eq!(*color, GROUND_COLOR);
            }
            other => panic!("expected plane, got {other:?}"),
        }
        match &backend.objects()[1] {
            SceneObject::Sun { position, strength } => {
                assert_eq!(*position, SUN_POSITION);
                assert_eq!(*strength, SUN_STRENGTH);
            }
            other => panic!("expected sun, got {other:?}"),
        }
    }
}
