//! Shared resources for scene settings, service data and panel content

use bevy::prelude::*;
use equiview_core::{render_panel, render_title, PanelId, PanelNode, SceneConfig, ServiceState, TitleNode};

use crate::layout::{plan_panel, ModelAnchors, PanelPlacement};

/// Active scene configuration
#[derive(Resource, Debug, Clone, Default)]
pub struct SceneSettings(pub SceneConfig);

/// Whether the scene configuration is final.
///
/// Model loading waits for `Settled` so a remote configuration can still
/// change asset paths.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigStatus {
    Pending,
    #[default]
    Settled,
}

pub fn config_settled(status: Res<ConfigStatus>) -> bool {
    *status == ConfigStatus::Settled
}

/// Latest service data pushed by the host page
#[derive(Resource, Debug, Clone, Default)]
pub struct ServiceData(pub ServiceState);

/// One data panel, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSlot {
    pub id: PanelId,
    pub node: PanelNode,
    pub placement: PanelPlacement,
}

/// Everything the overlay draws: the title banner and both panels
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PanelBoard {
    pub title: TitleNode,
    pub panels: Vec<PanelSlot>,
}

impl PanelBoard {
    pub fn build(config: &SceneConfig, state: &ServiceState, anchors: Option<&ModelAnchors>) -> Self {
        let text = config.panel_text();
        let panels = PanelId::ALL
            .iter()
            .map(|&id| PanelSlot {
                id,
                node: render_panel(&config.panel(id).title, state.records(id), &text),
                placement: plan_panel(id, anchors, config),
            })
            .collect();

        Self {
            title: render_title(&state.service_name, &config.title.placeholder),
            panels,
        }
    }

    pub fn panel(&self, id: PanelId) -> Option<&PanelSlot> {
        self.panels.iter().find(|slot| slot.id == id)
    }
}

impl Default for PanelBoard {
    fn default() -> Self {
        Self::build(&SceneConfig::default(), &ServiceState::default(), None)
    }
}

/// Logical size of the area the scene is drawn into
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayViewport {
    pub width: f32,
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use equiview_core::PanelRecord;

    #[test]
    fn test_default_board() {
        let board = PanelBoard::default();
        assert_eq!(board.title.text, "Motor P0410");
        assert_eq!(board.panels.len(), 2);
        assert!(board.panels.iter().all(|slot| slot.node.is_empty_state()));
        assert_eq!(
            board.panel(PanelId::Warm).map(|slot| slot.node.title_bar.title.as_str()),
            Some("Vibration & Temperature Terminal Data")
        );
    }

    #[test]
    fn test_board_follows_state() {
        let mut state = ServiceState::default();
        state.service_name = "Pump 7".to_string();
        state.protector = vec![
            PanelRecord::new("Current", 12.5, "#2FC060"),
            PanelRecord::new("Voltage", 380i64, "#2FC060"),
        ];

        let board = PanelBoard::build(&SceneConfig::default(), &state, None);
        assert_eq!(board.title.text, "Pump 7");

        let protector = board.panel(PanelId::Protector).unwrap();
        assert_eq!(protector.node.rows.len(), 2);
        assert_eq!(protector.node.rows[1].value.text, "380");
        assert!(board.panel(PanelId::Warm).unwrap().node.is_empty_state());
    }
}
