/// Camera ring placement, orientation, and the camera log.
use crate::backend::{ObjectHandle, SceneBackend};
use crate::constants::CAMERA_RING_START_DEG;
use glam::{Mat3, Quat, Vec3};
use std::io::Write;

/// One placed camera: rig-assigned name plus backend handle.
#[derive(Debug, Clone)]
pub struct RigCamera {
    pub name: String,
    pub position: Vec3,
    pub handle: ObjectHandle,
}

/// A ring of cameras sharing one look-at target.
#[derive(Debug)]
pub struct CameraRig {
    cameras: Vec<RigCamera>,
    look_at: Vec3,
}

impl CameraRig {
    /// Place `count` cameras evenly on a circle of `radius` at height `z`,
    /// each oriented towards `look_at`. The first camera sits at 45° and the
    /// rest follow at steps of `360°/count`.
    pub fn build<B: SceneBackend + ?Sized>(
        backend: &mut B,
        count: usize,
        radius: f32,
        z: f32,
        look_at: Vec3,
    ) -> Self {
        let step = 360.0 / count as f32;
        let mut cameras = Vec::with_capacity(count);
        for i in 0..count {
            let angle = (CAMERA_RING_START_DEG + i as f32 * step).to_radians();
            let position = Vec3::new(radius * angle.sin(), radius * angle.cos(), z);
            let name = format!("camera_{i}");
            let handle = backend.place_camera(&name, position);
            backend.orient_camera(handle, look_at_rotation(position, look_at));
            cameras.push(RigCamera {
                name,
                position,
                handle,
            });
        }
        log::info!("placed {count} cameras on ring radius {radius:.3} at z {z:.3}");
        Self { cameras, look_at }
    }

    pub fn cameras(&self) -> &[RigCamera] {
        &self.cameras
    }

    /// Write the camera log: the shared look-at point once, then the name and
    /// location of every camera, in placement order.
    pub fn write_log<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "Camera look at\n {:.6} {:.6} {:.6}",
            self.look_at.x, self.look_at.y, self.look_at.z
        )?;
        for cam in &self.cameras {
            writeln!(writer, "Camera name: {}", cam.name)?;
            writeln!(
                writer,
                "Camera locate at\n {:.6} {:.6} {:.6}",
                cam.position.x, cam.position.y, cam.position.z
            )?;
        }
        Ok(())
    }
}

/// Rotation that points a camera at `target` from `eye`.
///
/// Camera convention: −Z forward, Y up, scene Z-up. Falls back to world Y as
/// the reference axis when the view direction is vertical.
pub fn look_at_rotation(eye: Vec3, target: Vec3) -> Quat {
    let forward = (target - eye).normalize_or(Vec3::NEG_Z);
    let reference = if forward.dot(Vec3::Z).abs() > 0.999 {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let right = forward.cross(reference).normalize();
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward))
}
