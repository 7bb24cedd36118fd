//! Fallback UI font for glyphs missing from egui's bundled fonts
//!
//! Host data is often Chinese, which the bundled fonts cannot draw. The
//! configured font file is loaded through the asset server like the models
//! and appended to every egui font family.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::sync::Arc;

use crate::types::{config_settled, SceneSettings};

const FALLBACK_FONT_NAME: &str = "equiview-fallback";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FontStatus {
    #[default]
    NotRequested,
    /// No font configured
    Disabled,
    Loading,
    /// Bytes available, waiting for an egui context
    Loaded,
    Installed,
    Failed(String),
}

#[derive(Resource, Debug, Default)]
pub struct UiFont {
    pub path: Option<String>,
    pub handle: Option<Handle<Font>>,
    pub status: FontStatus,
}

pub struct FontsPlugin;

impl Plugin for FontsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiFont>().add_systems(
            Update,
            (
                request_ui_font.run_if(config_settled),
                poll_ui_font,
                install_ui_font.run_if(font_loaded),
            )
                .chain(),
        );
    }
}

fn font_loaded(font: Res<UiFont>) -> bool {
    font.status == FontStatus::Loaded
}

fn request_ui_font(mut font: ResMut<UiFont>, settings: Res<SceneSettings>, asset_server: Res<AssetServer>) {
    if font.status != FontStatus::NotRequested {
        return;
    }

    match settings.0.assets.font.clone().filter(|p| !p.is_empty()) {
        Some(path) => {
            tracing::info!("Starting to load UI font: {}", path);
            font.handle = Some(asset_server.load(path.clone()));
            font.path = Some(path);
            font.status = FontStatus::Loading;
        }
        None => {
            tracing::info!("No UI font configured, using bundled fonts only");
            font.status = FontStatus::Disabled;
        }
    }
}

fn poll_ui_font(mut font: ResMut<UiFont>, asset_server: Res<AssetServer>) {
    if font.status != FontStatus::Loading {
        return;
    }
    let Some(handle) = font.handle.as_ref() else {
        return;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            font.status = FontStatus::Loaded;
        }
        Some(LoadState::Failed(err)) => {
            tracing::warn!(
                "UI font {} unavailable, non-Latin text may not render: {}",
                font.path.as_deref().unwrap_or_default(),
                err
            );
            font.status = FontStatus::Failed(err.to_string());
        }
        _ => {}
    }
}

fn install_ui_font(mut font: ResMut<UiFont>, fonts: Res<Assets<Font>>, mut contexts: EguiContexts) {
    let Some(data) = font.handle.as_ref().and_then(|handle| fonts.get(handle)) else {
        return;
    };
    // The primary context appears a frame after startup
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    ctx.set_fonts(font_definitions(FALLBACK_FONT_NAME, data.data.to_vec()));
    tracing::info!("UI font installed: {}", font.path.as_deref().unwrap_or_default());
    font.status = FontStatus::Installed;
}

/// Bundled egui fonts with `bytes` appended as the last fallback of each family
pub fn font_definitions(name: &str, bytes: Vec<u8>) -> egui::FontDefinitions {
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(name.to_string(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push(name.to_string());
    }
    fonts
}
