/// Scene backend abstraction and the JSON-recording implementation.
use crate::constants::{MAX_BOUNCES, MIST_DEPTH, TRANSPARENT_MAX_BOUNCES};
use crate::error::{PipelineError, Result};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Opaque identifier for an object created in the backend scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u32);

/// Renderer parameters carried with every frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    pub max_bounces: u32,
    pub transparent_max_bounces: u32,
    /// Linear mist normalisation distance for depth passes.
    pub mist_depth: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_bounces: MAX_BOUNCES,
            transparent_max_bounces: TRANSPARENT_MAX_BOUNCES,
            mist_depth: MIST_DEPTH,
        }
    }
}

/// The rendering host boundary.
///
/// Scene construction, camera placement, and render triggering all go through
/// this trait; the generation pipeline never talks to a renderer directly.
/// Implementations own object naming and output file extensions, so `render`
/// returns the path actually written.
pub trait SceneBackend {
    /// Remove every object from the scene.
    fn clear(&mut self);

    fn set_render_settings(&mut self, settings: RenderSettings);

    /// Create a participating-media cube with the given scatter density.
    fn create_volume(&mut self, center: Vec3, half_extent: f32, scatter_density: f64)
    -> ObjectHandle;

    /// Create a solid cylinder standing on the ground plane.
    fn create_cylinder(&mut self, center: Vec3, radius: f32, depth: f32, color: [f32; 3])
    -> ObjectHandle;

    /// Create a circular ground plane.
    fn create_plane(&mut self, center: Vec3, radius: f32, color: [f32; 3]) -> ObjectHandle;

    /// Create a sun lamp.
    fn create_sun(&mut self, position: Vec3, strength: f32) -> ObjectHandle;

    fn place_camera(&mut self, name: &str, position: Vec3) -> ObjectHandle;

    fn orient_camera(&mut self, camera: ObjectHandle, rotation: Quat);

    /// Render the RGB pass for one camera; `output` carries no extension.
    fn render(&mut self, camera: ObjectHandle, output: &Path) -> Result<PathBuf>;

    /// Render the mist (depth) pass for one camera.
    fn render_depth(&mut self, camera: ObjectHandle, output: &Path) -> Result<PathBuf>;
}

/// One recorded scene object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneObject {
    Volume {
        center: [f32; 3],
        half_extent: f32,
        scatter_density: f64,
    },
    Cylinder {
        center: [f32; 3],
        radius: f32,
        depth: f32,
        color: [f32; 3],
    },
    Plane {
        center: [f32; 3],
        radius: f32,
        color: [f32; 3],
    },
    Sun {
        position: [f32; 3],
        strength: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRecord {
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

/// Per-camera frame manifest written in place of a rendered image.
#[derive(Debug, Serialize)]
struct FrameManifest<'a> {
    pass: &'a str,
    camera: &'a CameraRecord,
    settings: &'a RenderSettings,
    objects: &'a [SceneObject],
}

/// Backend that records the assembled scene instead of rasterising it.
///
/// Each render call writes a JSON frame manifest describing the camera, the
/// render settings, and every object in the scene. A real renderer can be
/// swapped in behind [`SceneBackend`] without touching the pipeline.
#[derive(Debug, Default)]
pub struct ManifestBackend {
    objects: Vec<SceneObject>,
    cameras: Vec<(ObjectHandle, CameraRecord)>,
    settings: RenderSettings,
    next_handle: u32,
}

impl ManifestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn cameras(&self) -> impl Iterator<Item = &CameraRecord> {
        self.cameras.iter().map(|(_, record)| record)
    }

    fn allocate(&mut self) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn camera(&self, handle: ObjectHandle) -> Option<&CameraRecord> {
        self.cameras
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, record)| record)
    }

    fn write_frame(&self, handle: ObjectHandle, pass: &str, output: &Path) -> Result<PathBuf> {
        let camera = self.camera(handle).ok_or_else(|| PipelineError::RenderFailure {
            camera: format!("handle {}", handle.0),
            path: output.to_path_buf(),
        })?;
        let manifest = FrameManifest {
            pass,
            camera,
            settings: &self.settings,
            objects: &self.objects,
        };
        let path = output.with_extension("json");
        let json = serde_json::to_string_pretty(&manifest).map_err(std::io::Error::other)?;
        fs::write(&path, json)?;
        log::debug!("wrote {pass} frame for '{}' to {}", camera.name, path.display());
        Ok(path)
    }
}

impl SceneBackend for ManifestBackend {
    fn clear(&mut self) {
        self.objects.clear();
        self.cameras.clear();
    }

    fn set_render_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
    }

    fn create_volume(
        &mut self,
        center: Vec3,
        half_extent: f32,
        scatter_density: f64,
    ) -> ObjectHandle {
        self.objects.push(SceneObject::Volume {
            center: center.to_array(),
            half_extent,
            scatter_density,
        });
        self.allocate()
    }

    fn create_cylinder(
        &mut self,
        center: Vec3,
        radius: f32,
        depth: f32,
        color: [f32; 3],
    ) -> ObjectHandle {
        self.objects.push(SceneObject::Cylinder {
            center: center.to_array(),
            radius,
            depth,
            color,
        });
        self.allocate()
    }

    fn create_plane(&mut self, center: Vec3, radius: f32, color: [f32; 3]) -> ObjectHandle {
        self.objects.push(SceneObject::Plane {
            center: center.to_array(),
            radius,
            color,
        });
        self.allocate()
    }

    fn create_sun(&mut self, position: Vec3, strength: f32) -> ObjectHandle {
        self.objects.push(SceneObject::Sun {
            position: position.to_array(),
            strength,
        });
        self.allocate()
    }

    fn place_camera(&mut self, name: &str, position: Vec3) -> ObjectHandle {
        let handle = self.allocate();
        self.cameras.push((
            handle,
            CameraRecord {
                name: name.to_string(),
                position: position.to_array(),
                rotation: Quat::IDENTITY.to_array(),
            },
        ));
        handle
    }

    fn orient_camera(&mut self, camera: ObjectHandle, rotation: Quat) {
        if let Some((_, record)) = self.cameras.iter_mut().find(|(h, _)| *h == camera) {
            record.rotation = rotation.to_array();
        }
    }

    fn render(&mut self, camera: ObjectHandle, output: &Path) -> Result<PathBuf> {
        self.write_frame(camera, "combined", output)
    }

    fn render_depth(&mut self, camera: ObjectHandle, output: &Path) -> Result<PathBuf> {
        self.write_frame(camera, "mist", output)
    }
}
