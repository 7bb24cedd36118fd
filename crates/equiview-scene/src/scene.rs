//! Scene setup - lights, background and axes helper

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;

use crate::models::SceneModels;
use crate::types::SceneSettings;

/// Background, between the two stops of the page gradient (#162447 to #0a1833)
pub const BACKGROUND: Color = Color::srgb(0.063, 0.118, 0.239);

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Marker component for the axes helper
#[derive(Component)]
pub struct WorldAxes;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .add_systems(Startup, setup_scene)
            .add_systems(Update, update_axes);
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<SceneSettings>,
) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(10.0, 10.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));

    let axes = &settings.0.axes;
    commands.spawn((
        Mesh3d(meshes.add(axes_mesh(axes.size))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        })),
        Transform::from_xyz(0.0, settings.0.camera.lift, 0.0),
        if axes.show {
            Visibility::Visible
        } else {
            Visibility::Hidden
        },
        WorldAxes,
    ));
}

/// X red, Y green, Z blue, each `size` long from the origin
pub fn axes_mesh(size: f32) -> Mesh {
    let positions = vec![
        [0.0, 0.0, 0.0],
        [size, 0.0, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, size, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, 0.0, size],
    ];
    let red = [1.0, 0.0, 0.0, 1.0];
    let green = [0.0, 1.0, 0.0, 1.0];
    let blue = [0.0, 0.0, 1.0, 1.0];
    let colors = vec![red, red, green, green, blue, blue];

    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
}

/// Move the axes to the lifted model center and follow the visibility setting
fn update_axes(
    models: Res<SceneModels>,
    settings: Res<SceneSettings>,
    mut axes: Query<(&mut Transform, &mut Visibility), With<WorldAxes>>,
) {
    if !models.is_changed() && !settings.is_changed() {
        return;
    }
    let Ok((mut transform, mut visibility)) = axes.single_mut() else {
        return;
    };

    let lift = Vec3::Y * settings.0.camera.lift;
    let center = models
        .equipment
        .status
        .bounds()
        .map(|bounds| bounds.center)
        .unwrap_or(Vec3::ZERO);
    transform.translation = center + lift;

    let wanted = if settings.0.axes.show {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    visibility.set_if_neq(wanted);
}
