//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use equiview_scene::EquiviewScenePlugin;

use crate::bridge::BridgePlugin;
use crate::config_loader::{self, ConfigLoaderPlugin};
use crate::ui::OverlayPlugin;

pub fn run() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Equiview - Equipment Monitor".to_string(),
                        canvas: Some("#equiview-canvas".to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    // Models are served next to the page
                    file_path: "".to_string(),
                    // Don't look for .meta files - server doesn't have them
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        // Must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        // Decided before any system runs so model loading can wait for a remote config
        .insert_resource(config_loader::initial_status())
        .add_plugins(EquiviewScenePlugin)
        .add_plugins(ConfigLoaderPlugin)
        .add_plugins(BridgePlugin)
        .add_plugins(OverlayPlugin)
        .run();
}
