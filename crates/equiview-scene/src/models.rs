//! glTF model loading, bounds measurement and animation playback

use bevy::asset::LoadState;
use bevy::camera::primitives::Aabb;
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::camera::CameraSettings;
use crate::layout::{ModelAnchors, ModelBounds};
use crate::types::{config_settled, SceneSettings};

/// Frames to wait for a spawned scene to produce meshes before giving up on it
const MAX_MEASURE_FRAMES: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    /// Carries the anchors for connectors and panels
    Equipment,
    /// Purely decorative
    Decoration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    NotRequested,
    Loading,
    /// Scene spawned. Only the equipment is measured afterwards.
    Spawned { frames: u32 },
    Ready(ModelBounds),
    Failed(String),
}

impl ModelStatus {
    pub fn bounds(&self) -> Option<&ModelBounds> {
        match self {
            ModelStatus::Ready(bounds) => Some(bounds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSlot {
    pub path: Option<String>,
    pub handle: Option<Handle<Gltf>>,
    pub root: Option<Entity>,
    pub status: ModelStatus,
    animations: Option<(Handle<AnimationGraph>, Vec<AnimationNodeIndex>)>,
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self {
            path: None,
            handle: None,
            root: None,
            status: ModelStatus::NotRequested,
            animations: None,
        }
    }
}

/// Load state of the two scene models
#[derive(Resource, Debug, Clone, Default)]
pub struct SceneModels {
    pub equipment: ModelSlot,
    pub decoration: ModelSlot,
    requested: bool,
}

impl SceneModels {
    pub fn slot(&self, role: ModelRole) -> &ModelSlot {
        match role {
            ModelRole::Equipment => &self.equipment,
            ModelRole::Decoration => &self.decoration,
        }
    }

    pub fn slot_mut(&mut self, role: ModelRole) -> &mut ModelSlot {
        match role {
            ModelRole::Equipment => &mut self.equipment,
            ModelRole::Decoration => &mut self.decoration,
        }
    }

    /// Anchors of the equipment model once it has been measured
    pub fn equipment_anchors(&self) -> Option<ModelAnchors> {
        self.equipment.status.bounds().map(ModelBounds::anchors)
    }
}

/// Root entity of a spawned model scene
#[derive(Component)]
pub struct ModelRoot(pub ModelRole);

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneModels>().add_systems(
            Update,
            (
                request_models.run_if(config_settled),
                load_models,
                measure_equipment,
                start_animations,
                frame_equipment,
            )
                .chain(),
        );
    }
}

/// Start loading both models once the configuration is final
fn request_models(mut models: ResMut<SceneModels>, settings: Res<SceneSettings>, asset_server: Res<AssetServer>) {
    if models.requested {
        return;
    }
    models.requested = true;

    let assets = &settings.0.assets;
    let requests = [
        (ModelRole::Equipment, Some(assets.equipment.clone())),
        (ModelRole::Decoration, assets.decoration.clone()),
    ];

    for (role, path) in requests {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            continue;
        };
        tracing::info!("Starting to load {:?} model: {}", role, path);
        let slot = models.slot_mut(role);
        slot.handle = Some(asset_server.load(path.clone()));
        slot.path = Some(path);
        slot.status = ModelStatus::Loading;
    }
}

/// Extensions the glTF loader cannot decode, with the message logged for them
const UNSUPPORTED_EXTENSIONS: &[(&str, &str)] = &[(
    "KHR_draco_mesh_compression",
    "Draco-compressed meshes are not supported; re-export the model without Draco compression",
)];

/// Specific explanation for a load error caused by an unsupported glTF extension
pub fn describe_load_failure(error: &str) -> Option<&'static str> {
    UNSUPPORTED_EXTENSIONS
        .iter()
        .find(|(extension, _)| error.contains(extension))
        .map(|(_, hint)| *hint)
}

/// Check loading state and spawn scenes from loaded glTFs
fn load_models(
    mut commands: Commands,
    mut models: ResMut<SceneModels>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    for role in [ModelRole::Equipment, ModelRole::Decoration] {
        // Read-only until the status moves, so idle frames leave SceneModels unchanged
        let slot = models.slot(role);
        if slot.status != ModelStatus::Loading {
            continue;
        }
        let Some(handle) = slot.handle.clone() else {
            continue;
        };
        let path = slot.path.clone().unwrap_or_default();

        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {
                let Some(gltf) = gltf_assets.get(&handle) else {
                    continue;
                };
                let slot = models.slot_mut(role);
                let Some(scene) = gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()) else {
                    tracing::error!("Model {} contains no scene", path);
                    slot.status = ModelStatus::Failed("no scene".to_string());
                    continue;
                };

                if !gltf.animations.is_empty() {
                    let (graph, nodes) = AnimationGraph::from_clips(gltf.animations.iter().cloned());
                    tracing::info!("Model {} has {} animation clip(s)", path, nodes.len());
                    slot.animations = Some((graphs.add(graph), nodes));
                }

                tracing::info!("Model loaded: {}", path);
                let root = commands
                    .spawn((SceneRoot(scene), Transform::default(), ModelRoot(role)))
                    .id();
                slot.root = Some(root);
                slot.status = ModelStatus::Spawned { frames: 0 };
            }
            Some(LoadState::Failed(err)) => {
                let reason = err.to_string();
                match describe_load_failure(&reason) {
                    Some(hint) => tracing::error!("Failed to load model {}: {} ({})", path, hint, reason),
                    None => tracing::error!("Failed to load model {}: {}", path, reason),
                }
                models.slot_mut(role).status = ModelStatus::Failed(reason);
            }
            _ => {
                // Still loading
            }
        }
    }
}

/// Measure the equipment once its scene has been instantiated
fn measure_equipment(
    mut models: ResMut<SceneModels>,
    children_query: Query<&Children>,
    bounds_query: Query<(&Aabb, &GlobalTransform)>,
) {
    let ModelStatus::Spawned { frames } = models.equipment.status else {
        return;
    };
    let Some(root) = models.equipment.root else {
        return;
    };

    match collect_bounds(root, &children_query, &bounds_query) {
        Some((min, max)) => {
            let bounds = ModelBounds::from_min_max(min, max);
            tracing::info!(
                "Equipment bounds: center {:?}, size {:?}",
                bounds.center,
                bounds.size
            );
            models.equipment.status = ModelStatus::Ready(bounds);
        }
        None if frames >= MAX_MEASURE_FRAMES => {
            tracing::warn!("Equipment model produced no meshes, annotations will not be attached");
            models.equipment.status = ModelStatus::Failed("no meshes".to_string());
        }
        None => {
            // Waiting is not a change anyone downstream reacts to
            models.bypass_change_detection().equipment.status = ModelStatus::Spawned { frames: frames + 1 };
        }
    }
}

/// World-space min/max over every mesh below `root`
pub fn collect_bounds(
    root: Entity,
    children_query: &Query<&Children>,
    bounds_query: &Query<(&Aabb, &GlobalTransform)>,
) -> Option<(Vec3, Vec3)> {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    let mut found = false;
    let mut stack = vec![root];

    while let Some(entity) = stack.pop() {
        if let Ok((aabb, transform)) = bounds_query.get(entity) {
            let center = Vec3::from(aabb.center);
            let half = Vec3::from(aabb.half_extents);
            for corner in 0..8 {
                let sign = Vec3::new(
                    if corner & 1 == 0 { -1.0 } else { 1.0 },
                    if corner & 2 == 0 { -1.0 } else { 1.0 },
                    if corner & 4 == 0 { -1.0 } else { 1.0 },
                );
                let world = transform.transform_point(center + half * sign);
                min = min.min(world);
                max = max.max(world);
            }
            found = true;
        }
        if let Ok(children) = children_query.get(entity) {
            stack.extend(children.iter());
        }
    }

    found.then_some((min, max))
}

/// Play every clip of a model, looping, on each animation player it spawns
fn start_animations(
    mut commands: Commands,
    models: Res<SceneModels>,
    mut players: Query<(Entity, &mut AnimationPlayer), Added<AnimationPlayer>>,
    parents: Query<&ChildOf>,
    roots: Query<&ModelRoot>,
) {
    for (entity, mut player) in &mut players {
        let Some(role) = owning_model(entity, &parents, &roots) else {
            continue;
        };
        let Some((graph, nodes)) = &models.slot(role).animations else {
            continue;
        };

        commands.entity(entity).insert(AnimationGraphHandle(graph.clone()));
        for node in nodes {
            player.play(*node).repeat();
        }
        tracing::debug!("Playing {} clip(s) on {:?} model", nodes.len(), role);
    }
}

fn owning_model(entity: Entity, parents: &Query<&ChildOf>, roots: &Query<&ModelRoot>) -> Option<ModelRole> {
    let mut current = entity;
    loop {
        if let Ok(root) = roots.get(current) {
            return Some(root.0);
        }
        current = parents.get(current).ok()?.parent();
    }
}

/// Point the camera at the equipment the first time it is measured
fn frame_equipment(
    models: Res<SceneModels>,
    settings: Res<SceneSettings>,
    mut camera: ResMut<CameraSettings>,
    mut framed: Local<bool>,
) {
    if *framed {
        return;
    }
    let Some(bounds) = models.equipment.status.bounds() else {
        return;
    };
    *framed = true;

    let config = &settings.0.camera;
    let lift = Vec3::Y * config.lift;
    camera.target = bounds.center + lift;
    camera.look_from(bounds.suggested_camera_position(config.distance) + lift);
    camera.set_zoom_range(config.zoom_range);
    tracing::info!("Camera framed on equipment at {:?}", camera.target);
}
