//! Connectors, endpoint markers and the panel board
//!
//! Connectors and markers are spawned once, the first time the equipment
//! model has been measured. Markers turn to face the camera every frame.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;
use equiview_core::{PanelId, Rgba};

use crate::camera::MainCamera;
use crate::layout::{billboard_rotation, plan_annotations, ConnectorPath, MarkerSpec, OUTLINE_DEPTH_OFFSET};
use crate::models::{ModelStatus, SceneModels};
use crate::types::{PanelBoard, SceneSettings, ServiceData};

/// Polyline between the model and a panel
#[derive(Component, Debug)]
pub struct Connector {
    pub panel: PanelId,
}

/// Camera-facing disc at a connector endpoint
#[derive(Component, Debug)]
pub struct Marker;

/// Translucent ring drawn behind a marker
#[derive(Component, Debug)]
pub struct MarkerOutline;

/// Annotation entities created for the equipment model
#[derive(Resource, Debug, Default)]
pub struct MarkerRegistry {
    pub connectors: Vec<Entity>,
    pub markers: Vec<Entity>,
    spawned: bool,
}

impl MarkerRegistry {
    pub fn is_spawned(&self) -> bool {
        self.spawned
    }
}

/// Plugin for model annotations
pub struct AnnotationsPlugin;

impl Plugin for AnnotationsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MarkerRegistry>()
            .init_resource::<PanelBoard>()
            .add_systems(Update, (spawn_annotations, billboard_markers, refresh_panel_board).chain());
    }
}

/// Spawn connectors and markers once the equipment has been measured
pub fn spawn_annotations(
    mut commands: Commands,
    models: Res<SceneModels>,
    settings: Res<SceneSettings>,
    mut registry: ResMut<MarkerRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if registry.spawned {
        return;
    }
    match &models.equipment.status {
        ModelStatus::Ready(bounds) => {
            let anchors = bounds.anchors();
            let plan = plan_annotations(Some(&anchors), &settings.0);

            let line_material = materials.add(unlit_material(settings.0.connector_color()));
            for connector in &plan.connectors {
                let entity = commands
                    .spawn((
                        Mesh3d(meshes.add(connector_mesh(&connector.path))),
                        MeshMaterial3d(line_material.clone()),
                        Transform::default(),
                        Connector { panel: connector.panel },
                    ))
                    .id();
                registry.connectors.push(entity);
            }

            for marker in &plan.markers {
                let entity = spawn_marker(&mut commands, &mut meshes, &mut materials, marker);
                registry.markers.push(entity);
            }

            tracing::info!(
                "Spawned {} connector(s) and {} marker(s)",
                registry.connectors.len(),
                registry.markers.len()
            );
            registry.spawned = true;
        }
        ModelStatus::Failed(reason) => {
            tracing::warn!("Equipment unavailable ({}), connectors and markers skipped", reason);
            registry.spawned = true;
        }
        _ => {}
    }
}

fn spawn_marker(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    spec: &MarkerSpec,
) -> Entity {
    let mut marker = commands.spawn((
        Mesh3d(meshes.add(Circle::new(spec.radius).mesh().resolution(32))),
        MeshMaterial3d(materials.add(unlit_material(spec.color))),
        Transform::from_translation(spec.position),
        Marker,
    ));

    if let Some(outline) = spec.outline {
        let ring_mesh = meshes.add(Circle::new(outline.radius).mesh().resolution(32));
        let ring_material = materials.add(unlit_material(outline.color));
        marker.with_children(|parent| {
            parent.spawn((
                Mesh3d(ring_mesh),
                MeshMaterial3d(ring_material),
                Transform::from_xyz(0.0, 0.0, -OUTLINE_DEPTH_OFFSET),
                MarkerOutline,
            ));
        });
    }

    marker.id()
}

fn unlit_material(color: Rgba) -> StandardMaterial {
    let [r, g, b, a] = color.to_f32_array();
    StandardMaterial {
        base_color: Color::srgba(r, g, b, a),
        unlit: true,
        double_sided: true,
        cull_mode: None,
        alpha_mode: if color.a() < u8::MAX {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        ..default()
    }
}

pub fn connector_mesh(path: &ConnectorPath) -> Mesh {
    let positions: Vec<[f32; 3]> = path.points.iter().map(|p| p.to_array()).collect();
    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Turn every registered marker toward the camera. Does nothing without a camera.
pub fn billboard_markers(
    registry: Res<MarkerRegistry>,
    camera_query: Query<&GlobalTransform, With<MainCamera>>,
    mut markers: Query<&mut Transform, With<Marker>>,
) {
    let Ok(camera) = camera_query.single() else {
        return;
    };
    let camera_position = camera.translation();

    for &entity in &registry.markers {
        // Despawned elsewhere; the remaining markers still turn
        let Ok(mut transform) = markers.get_mut(entity) else {
            continue;
        };
        if let Some(rotation) = billboard_rotation(transform.translation, camera_position) {
            transform.rotation = rotation;
        }
    }
}

/// Rebuild panel content and placement when data, config or anchors change
pub fn refresh_panel_board(
    service: Res<ServiceData>,
    settings: Res<SceneSettings>,
    models: Res<SceneModels>,
    mut board: ResMut<PanelBoard>,
) {
    if !service.is_changed() && !settings.is_changed() && !models.is_changed() {
        return;
    }
    let anchors = models.equipment_anchors();
    let rebuilt = PanelBoard::build(&settings.0, &service.0, anchors.as_ref());
    board.set_if_neq(rebuilt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ModelBounds;
    use equiview_core::{InitParams, PanelRecord};

    fn annotation_app() -> App {
        let mut app = App::new();
        app.init_resource::<SceneModels>()
            .init_resource::<SceneSettings>()
            .init_resource::<ServiceData>()
            .init_resource::<MarkerRegistry>()
            .init_resource::<PanelBoard>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_systems(Update, (spawn_annotations, billboard_markers, refresh_panel_board).chain());
        app
    }

    fn set_equipment(app: &mut App, status: ModelStatus) {
        app.world_mut().resource_mut::<SceneModels>().equipment.status = status;
    }

    fn ready() -> ModelStatus {
        ModelStatus::Ready(ModelBounds::from_min_max(
            Vec3::new(-1.5, 0.0, -0.5),
            Vec3::new(1.5, 2.0, 0.5),
        ))
    }

    fn count<C: Component>(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query_filtered::<Entity, With<C>>().iter(world).count()
    }

    #[test]
    fn test_nothing_spawned_while_loading() {
        let mut app = annotation_app();
        set_equipment(&mut app, ModelStatus::Loading);
        app.update();

        assert_eq!(count::<Connector>(&mut app), 0);
        assert_eq!(count::<Marker>(&mut app), 0);
        assert!(!app.world().resource::<MarkerRegistry>().is_spawned());
    }

    #[test]
    fn test_failed_load_skips_connectors() {
        let mut app = annotation_app();
        set_equipment(&mut app, ModelStatus::Failed("404".to_string()));
        app.update();
        app.update();

        assert_eq!(count::<Connector>(&mut app), 0);
        assert_eq!(count::<Marker>(&mut app), 0);

        // Panels still exist and render their placeholders
        let board = app.world().resource::<PanelBoard>();
        assert_eq!(board.panels.len(), 2);
        assert!(board.panels.iter().all(|slot| slot.node.is_empty_state()));
    }

    #[test]
    fn test_ready_spawns_once() {
        let mut app = annotation_app();
        set_equipment(&mut app, ready());
        app.update();
        app.update();

        // Re-measuring must not duplicate annotations
        set_equipment(&mut app, ready());
        app.update();

        assert_eq!(count::<Connector>(&mut app), 2);
        assert_eq!(count::<Marker>(&mut app), 4);
        assert_eq!(count::<MarkerOutline>(&mut app), 4);

        let registry = app.world().resource::<MarkerRegistry>();
        assert_eq!(registry.connectors.len(), 2);
        assert_eq!(registry.markers.len(), 4);
    }

    #[test]
    fn test_outline_disabled() {
        let mut app = annotation_app();
        app.world_mut().resource_mut::<SceneSettings>().0.marker.outline = false;
        set_equipment(&mut app, ready());
        app.update();

        assert_eq!(count::<Marker>(&mut app), 4);
        assert_eq!(count::<MarkerOutline>(&mut app), 0);
    }

    #[test]
    fn test_billboard_without_camera() {
        let mut app = annotation_app();
        set_equipment(&mut app, ready());
        app.update();

        let world = app.world_mut();
        let rotations: Vec<Quat> = world
            .query_filtered::<&Transform, With<Marker>>()
            .iter(world)
            .map(|t| t.rotation)
            .collect();
        assert!(rotations.iter().all(|r| *r == Quat::IDENTITY));
    }

    #[test]
    fn test_billboard_faces_camera_and_is_stable() {
        let mut app = annotation_app();
        let camera_position = Vec3::new(5.0, 7.0, 5.0);
        app.world_mut()
            .spawn((GlobalTransform::from_translation(camera_position), MainCamera));
        set_equipment(&mut app, ready());
        app.update();
        app.update();

        let world = app.world_mut();
        let first: Vec<Transform> = world
            .query_filtered::<&Transform, With<Marker>>()
            .iter(world)
            .copied()
            .collect();
        assert_eq!(first.len(), 4);
        for transform in &first {
            let facing = transform.rotation * Vec3::Z;
            let expected = (camera_position - transform.translation).normalize();
            assert!(facing.abs_diff_eq(expected, 1e-4));
        }

        app.update();
        let world = app.world_mut();
        let second: Vec<Transform> = world
            .query_filtered::<&Transform, With<Marker>>()
            .iter(world)
            .copied()
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_billboard_skips_missing_marker() {
        let mut app = annotation_app();
        let camera_position = Vec3::new(-4.0, 6.0, 8.0);
        app.world_mut()
            .spawn((GlobalTransform::from_translation(camera_position), MainCamera));
        set_equipment(&mut app, ready());
        app.update();

        let removed = app.world().resource::<MarkerRegistry>().markers[1];
        app.world_mut().despawn(removed);
        app.update();

        let world = app.world_mut();
        let remaining: Vec<Transform> = world
            .query_filtered::<&Transform, With<Marker>>()
            .iter(world)
            .copied()
            .collect();
        assert_eq!(remaining.len(), 3);
        for transform in &remaining {
            let facing = transform.rotation * Vec3::Z;
            let expected = (camera_position - transform.translation).normalize();
            assert!(facing.abs_diff_eq(expected, 1e-4));
        }
        assert_eq!(app.world().resource::<MarkerRegistry>().markers.len(), 4);
    }

    #[test]
    fn test_unregistered_marker_left_alone() {
        let mut app = annotation_app();
        app.world_mut()
            .spawn((GlobalTransform::from_translation(Vec3::new(5.0, 5.0, 5.0)), MainCamera));
        let stray = app
            .world_mut()
            .spawn((Transform::from_xyz(1.0, 0.0, 0.0), Marker))
            .id();
        set_equipment(&mut app, ready());
        app.update();

        let transform = app.world().get::<Transform>(stray).unwrap();
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_board_tracks_service_data() {
        let mut app = annotation_app();
        app.update();

        app.world_mut().resource_mut::<ServiceData>().0.apply(InitParams {
            service_name: "Motor A".to_string(),
            protector: vec![PanelRecord::new("Current", 12i64, "#2FC060")],
            warm: vec![],
        });
        app.update();

        let board = app.world().resource::<PanelBoard>();
        assert_eq!(board.title.text, "Motor A");
        let protector = board.panel(PanelId::Protector).unwrap();
        assert_eq!(protector.node.rows.len(), 1);
        assert_eq!(protector.node.rows[0].label.text, "Current");
        assert!(board.panel(PanelId::Warm).unwrap().node.is_empty_state());
    }
}
