//! Screen-space overlay: service title and the two anchored data panels

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use equiview_scene::ui::{panel_frame, pivot_align, render_panel_node, render_title_node};
use equiview_scene::{MainCamera, OverlayViewport, PanelBoard};

/// Distance of the title from the top edge, in logical pixels
const TITLE_TOP_OFFSET: f32 = 32.0;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, render_overlay);
    }
}

fn render_overlay(
    mut contexts: EguiContexts,
    board: Res<PanelBoard>,
    viewport: Res<OverlayViewport>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("service_title"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, TITLE_TOP_OFFSET))
        .interactable(false)
        .show(ctx, |ui| {
            if viewport.width > 0.0 {
                ui.set_max_width(viewport.width);
            }
            render_title_node(ui, &board.title);
        });

    // Panels need a camera to be projected; skip them for this frame otherwise
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    for slot in &board.panels {
        // Behind the camera or outside the frustum depth range
        let Ok(screen) = camera.world_to_viewport(camera_transform, slot.placement.position) else {
            continue;
        };

        egui::Area::new(egui::Id::new(("panel", slot.id.key())))
            .fixed_pos(egui::pos2(screen.x, screen.y))
            .pivot(pivot_align(slot.placement.pivot))
            .order(egui::Order::Middle)
            .show(ctx, |ui| {
                panel_frame().show(ui, |ui| {
                    render_panel_node(ui, &slot.node);
                });
            });
    }
}
