//! Equiview Scene - 3D scene, annotations and overlay widgets
//!
//! Loads the equipment and decoration models, attaches connectors and
//! camera-facing markers to the equipment, and keeps the two data panels
//! and the title banner in sync with the latest service data. A configured
//! fallback font covers CJK text in the overlay.

pub mod annotations;
pub mod camera;
pub mod fonts;
pub mod layout;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

/// Plugin that sets up the 3D scene and its annotations
pub struct EquiviewScenePlugin;

impl Plugin for EquiviewScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneSettings>()
            .init_resource::<ConfigStatus>()
            .init_resource::<ServiceData>()
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(annotations::AnnotationsPlugin)
            .add_plugins(fonts::FontsPlugin);
    }
}

// Re-export commonly used types
pub use types::*;
pub use annotations::MarkerRegistry;
pub use camera::{CameraSettings, MainCamera};
pub use fonts::UiFont;
pub use models::{ModelStatus, SceneModels};
