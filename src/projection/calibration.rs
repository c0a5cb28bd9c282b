// src/projection/calibration.rs
//
// Derives the car-space → screen transform from the camera intrinsics and the
// live device-to-road calibration. The video is zoomed and shifted so the
// road's vanishing point sits near the middle of the viewport (a little lower
// on the wide camera); the same shift is baked into the overlay transform so
// polygons line up with the video pixels.

use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};

use crate::types::{CalibrationSample, CameraConfig, StreamType, Viewport};

/// Forward distance (m) of the point used to locate the vanishing point.
const VANISHING_POINT_DISTANCE: f32 = 1000.0;
/// Keeps the zoomed video from exposing its border.
const EDGE_GUARD_PX: f32 = 5.0;

/// Device frame (x forward, y right, z down) → camera view frame.
pub fn view_from_device() -> Matrix3<f32> {
    Matrix3::new(
        0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0, //
        1.0, 0.0, 0.0,
    )
}

pub fn intrinsic_matrix(focal: f32, center_x: f32, center_y: f32) -> Matrix3<f32> {
    Matrix3::new(
        focal, 0.0, center_x, //
        0.0, focal, center_y, //
        0.0, 0.0, 1.0,
    )
}

/// Roll/pitch/yaw to rotation, applied as yaw · pitch · roll.
pub fn euler_to_rot(rpy: [f32; 3]) -> Matrix3<f32> {
    Rotation3::from_euler_angles(rpy[0], rpy[1], rpy[2]).into_inner()
}

/// Per-frame camera transform. Owned by the render pass and rebuilt on every
/// paint.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTransform {
    /// Homogeneous vehicle-space ray → homogeneous screen point
    pub car_space: Matrix3<f32>,
    /// Video texture placement matching `car_space`
    pub frame_matrix: Matrix4<f32>,
    pub stream: StreamType,
}

impl CalibrationTransform {
    pub fn derive(
        calibration: &CalibrationSample,
        stream: StreamType,
        camera: &CameraConfig,
        viewport: Viewport,
    ) -> Self {
        let wide = stream == StreamType::WideRoad;
        let focal = if wide {
            camera.wide_focal
        } else {
            camera.narrow_focal
        };
        let intrinsics = intrinsic_matrix(focal, camera.center_x, camera.center_y);

        let device_from_calib = euler_to_rot(calibration.rpy_calib);
        let view_from_calib = if wide {
            view_from_device() * euler_to_rot(calibration.wide_from_device_euler) * device_from_calib
        } else {
            view_from_device() * device_from_calib
        };
        let calib_transform = intrinsics * view_from_calib;

        let zoom = if wide {
            camera.wide_zoom
        } else {
            camera.narrow_zoom
        };
        let vp = calib_transform * Vector3::new(VANISHING_POINT_DISTANCE, 0.0, 0.0);

        let (w, h) = (viewport.width, viewport.height);
        let (cx, cy) = (camera.center_x, camera.center_y);

        // May go negative on very large viewports; then the offset pins to 0.
        let max_x_offset = (cx * zoom - w / 2.0 - EDGE_GUARD_PX).max(0.0);
        let max_y_offset = (cy * zoom - h / 2.0 - EDGE_GUARD_PX).max(0.0);
        let (vp_x, vp_y) = if vp.z.abs() > f32::EPSILON {
            (vp.x / vp.z, vp.y / vp.z)
        } else {
            (cx, cy)
        };
        let x_offset = ((vp_x - cx) * zoom).clamp(-max_x_offset, max_x_offset);
        let y_offset = ((vp_y - cy) * zoom).clamp(-max_y_offset, max_y_offset);

        let video_transform = Matrix3::new(
            zoom, 0.0, (w / 2.0 - x_offset) - cx * zoom, //
            0.0, zoom, (h / 2.0 - y_offset) - cy * zoom, //
            0.0, 0.0, 1.0,
        );

        let zx = zoom * 2.0 * cx / w;
        let zy = zoom * 2.0 * cy / h;
        let frame_matrix = Matrix4::new(
            zx, 0.0, 0.0, -x_offset / w * 2.0, //
            0.0, zy, 0.0, y_offset / h * 2.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );

        Self {
            car_space: video_transform * calib_transform,
            frame_matrix,
            stream,
        }
    }
}
