//! Camera controls and orbit navigation
//!
//! Y is up. The camera orbits `target` at `distance`, with `azimuth`
//! measured from +X toward +Z and `elevation` above the XZ plane.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::types::{OverlayViewport, SceneSettings};

/// Orbit controller state. Input moves the `target_*` fields; [`CameraSettings::step`]
/// eases the current values toward them.
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub azimuth: f32,
    pub target_azimuth: f32,
    pub elevation: f32,
    pub target_elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let mut settings = Self {
            distance: 10.0,
            target_distance: 10.0,
            min_distance: 10.0,
            max_distance: 11.2,
            azimuth: 0.0,
            target_azimuth: 0.0,
            elevation: 0.0,
            target_elevation: 0.0,
            target: Vec3::new(0.0, 2.0, 0.0),
            target_focus: Vec3::new(0.0, 2.0, 0.0),
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.05,
        };
        settings.look_from(Vec3::new(0.0, 2.0, 0.0) + Vec3::ONE.normalize() * 10.0);
        settings
    }
}

impl CameraSettings {
    /// Current camera position
    pub fn position(&self) -> Vec3 {
        self.target + orbit_offset(self.azimuth, self.elevation, self.distance)
    }

    /// Re-aim the orbit so the camera sits at `position`, keeping `target`.
    /// Jumps without easing. Zoom limits are reset around the new distance.
    pub fn look_from(&mut self, position: Vec3) {
        let (azimuth, elevation, distance) = orbit_angles(position - self.target);
        self.azimuth = azimuth;
        self.target_azimuth = azimuth;
        self.elevation = elevation;
        self.target_elevation = elevation;
        self.distance = distance;
        self.target_distance = distance;
        self.target_focus = self.target;
        let range = self.max_distance - self.min_distance;
        self.min_distance = distance;
        self.max_distance = distance + range;
    }

    pub fn set_zoom_range(&mut self, range: f32) {
        self.max_distance = self.min_distance + range.max(0.0);
        self.target_distance = self.target_distance.clamp(self.min_distance, self.max_distance);
    }

    /// Fraction of the remaining distance covered in a frame of `dt` seconds.
    /// A damping of zero disables easing.
    pub fn ease_factor(&self, dt: f32) -> f32 {
        if self.smooth_factor <= 0.0 {
            return 1.0;
        }
        1.0 - (-self.smooth_factor * 60.0 * dt).exp()
    }

    /// Advance the eased orbit by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let t = self.ease_factor(dt);
        self.distance += (self.target_distance - self.distance) * t;
        self.azimuth += (self.target_azimuth - self.azimuth) * t;
        self.elevation += (self.target_elevation - self.elevation) * t;
        self.target = self.target + (self.target_focus - self.target) * t;
    }

    /// Orbit by a pointer delta in pixels
    pub fn orbit_by(&mut self, delta: Vec2) {
        self.target_azimuth += delta.x * self.sensitivity;
        self.target_elevation = (self.target_elevation + delta.y * self.sensitivity).clamp(-1.5, 1.5);
    }

    /// Slide the orbit target in the view plane by a pointer delta in pixels
    pub fn pan_by(&mut self, delta: Vec2) {
        // Horizontal camera right for the current azimuth; Y stays up
        let right = Vec3::new(self.azimuth.sin(), 0.0, -self.azimuth.cos());
        let pan_speed = self.distance * 0.002;
        self.target_focus += right * delta.x * pan_speed;
        self.target_focus += Vec3::Y * delta.y * pan_speed;
    }
}

/// Offset from the orbit target for the given angles
pub fn orbit_offset(azimuth: f32, elevation: f32, distance: f32) -> Vec3 {
    Vec3::new(
        distance * elevation.cos() * azimuth.cos(),
        distance * elevation.sin(),
        distance * elevation.cos() * azimuth.sin(),
    )
}

/// Inverse of [`orbit_offset`]: (azimuth, elevation, distance)
pub fn orbit_angles(offset: Vec3) -> (f32, f32, f32) {
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
    let azimuth = offset.z.atan2(offset.x);
    (azimuth, elevation, distance)
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .init_resource::<OverlayViewport>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (
                    apply_camera_config.run_if(resource_changed::<SceneSettings>),
                    update_camera,
                    handle_window_resize,
                )
                    .chain(),
            );
    }
}

fn spawn_camera(mut commands: Commands, settings: Res<CameraSettings>, scene: Res<SceneSettings>) {
    let camera = &scene.0.camera;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(settings.position()).looking_at(settings.target, Vec3::Y),
        MainCamera,
    ));
}

/// Push projection and orbit limits from the scene configuration
fn apply_camera_config(
    scene: Res<SceneSettings>,
    mut settings: ResMut<CameraSettings>,
    mut projection_query: Query<&mut Projection, With<MainCamera>>,
) {
    let camera = &scene.0.camera;
    settings.smooth_factor = camera.damping;
    settings.set_zoom_range(camera.zoom_range);

    if let Ok(mut projection) = projection_query.single_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = camera.fov_degrees.to_radians();
            perspective.near = camera.near;
            perspective.far = camera.far;
        }
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    // Panels scroll under the pointer; leave those gestures to egui
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer {
        settings.orbit_by(total_motion);
    }

    // Pan with right mouse drag
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        settings.pan_by(total_motion);
    }

    if !egui_wants_pointer {
        for scroll in mouse_wheel.read() {
            let zoom_factor = 1.0 - scroll.y * settings.zoom_speed * 0.3;
            settings.target_distance =
                (settings.target_distance * zoom_factor).clamp(settings.min_distance, settings.max_distance);
        }
    } else {
        for _ in mouse_wheel.read() {}
    }

    if touch_input.iter().count() == 1 && !egui_wants_pointer {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                settings.orbit_by(delta);
            }
        }
    }

    // Pinch to zoom
    if touch_input.iter().count() == 2 {
        let touches: Vec<_> = touch_input.iter().collect();
        if let (Some(t1), Some(t2)) = (touches.first(), touches.get(1)) {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            let zoom_factor = prev_dist / curr_dist.max(1.0);
            settings.target_distance =
                (settings.target_distance * zoom_factor).clamp(settings.min_distance, settings.max_distance);
        }
    }

    settings.step(time.delta_secs());

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = settings.position();
        transform.look_at(settings.target, Vec3::Y);
    }
}

/// Keep the projection aspect and the overlay size in step with the window.
/// This is the only writer of [`OverlayViewport`]; until the first resize it is
/// seeded from the primary window.
fn handle_window_resize(
    mut resized: MessageReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<OverlayViewport>,
    mut projection_query: Query<&mut Projection, With<MainCamera>>,
) {
    let size = match resized.read().last() {
        Some(last) => (last.width, last.height),
        None if viewport.width <= 0.0 || viewport.height <= 0.0 => match windows.single() {
            Ok(window) => (window.width(), window.height()),
            Err(_) => return,
        },
        None => return,
    };
    let (width, height) = size;
    if width <= 0.0 || height <= 0.0 {
        return;
    }

    if viewport.width != width || viewport.height != height {
        viewport.width = width;
        viewport.height = height;
    }

    if let Ok(mut projection) = projection_query.single_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = width / height;
        }
    }
    tracing::debug!("Viewport resized to {}x{}", width, height);
}
