//! Host bridge: `message` events posted by the embedding page
//!
//! The JS callback only queues the raw payload; commands are applied on the
//! frame loop, in arrival order.

use bevy::prelude::*;
use equiview_core::HostCommand;
use equiview_scene::ServiceData;
use std::sync::{Arc, Mutex};

pub struct BridgePlugin;

impl Plugin for BridgePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingHostMessages>()
            .add_systems(Startup, install_message_listener)
            .add_systems(Update, process_host_messages);
    }
}

/// Message payloads as JSON text, oldest first
#[derive(Resource, Default, Clone)]
pub struct PendingHostMessages(pub Arc<Mutex<Vec<String>>>);

impl PendingHostMessages {
    pub fn push(&self, text: String) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(text);
        }
    }

    fn drain(&self) -> Vec<String> {
        if let Ok(mut queue) = self.0.lock() {
            std::mem::take(&mut *queue)
        } else {
            Vec::new()
        }
    }
}

fn install_message_listener(pending: Res<PendingHostMessages>) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::prelude::*;
        use web_sys::MessageEvent;

        let Some(window) = web_sys::window() else {
            tracing::error!("No window, host messages disabled");
            return;
        };

        let pending_clone = pending.clone();
        let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
            let data = e.data();
            // Hosts post either structured objects or JSON strings
            let text = match data.as_string() {
                Some(text) => Some(text),
                None => js_sys::JSON::stringify(&data).ok().and_then(|s| s.as_string()),
            };
            if let Some(text) = text {
                pending_clone.push(text);
            }
        }) as Box<dyn FnMut(MessageEvent)>);

        if let Err(e) = window.add_event_listener_with_callback("message", onmessage.as_ref().unchecked_ref()) {
            tracing::error!("Failed to listen for host messages: {:?}", e);
        }
        onmessage.forget();
        tracing::info!("Listening for host messages");
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = &pending;
        tracing::info!("Host messages not available in native mode");
    }
}

/// Apply queued host commands. Each `init` replaces the service data wholesale.
pub fn process_host_messages(pending: Res<PendingHostMessages>, mut service: ResMut<ServiceData>) {
    for text in pending.drain() {
        match HostCommand::from_json(&text) {
            Ok(Some(HostCommand::Init(params))) => {
                tracing::info!(
                    "init: service '{}', {} protector / {} warm record(s)",
                    params.service_name,
                    params.protector.len(),
                    params.warm.len()
                );
                service.0.apply(params);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Ignoring host message: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equiview_core::PanelId;
    use equiview_scene::annotations::refresh_panel_board;
    use equiview_scene::{PanelBoard, SceneModels, SceneSettings};

    fn bridge_app() -> App {
        let mut app = App::new();
        app.init_resource::<PendingHostMessages>()
            .init_resource::<ServiceData>()
            .init_resource::<SceneSettings>()
            .init_resource::<SceneModels>()
            .init_resource::<PanelBoard>()
            .add_systems(Update, (process_host_messages, refresh_panel_board).chain());
        app
    }

    fn post(app: &App, text: &str) {
        app.world().resource::<PendingHostMessages>().push(text.to_string());
    }

    #[test]
    fn test_init_renders_panels_and_title() {
        let mut app = bridge_app();
        post(
            &app,
            r##"{"cmd":"init","params":{"serviceName":"","protector":[],"warm":[{"label":"X","value":5,"color":"#fff"}]}}"##,
        );
        app.update();

        let board = app.world().resource::<PanelBoard>();
        assert_eq!(board.title.text, "Motor P0410");

        let protector = board.panel(PanelId::Protector).unwrap();
        assert!(protector.node.is_empty_state());

        let warm = board.panel(PanelId::Warm).unwrap();
        assert_eq!(warm.node.rows.len(), 1);
        assert_eq!(warm.node.rows[0].label.text, "X");
        assert_eq!(warm.node.rows[0].value.text, "5");
    }

    #[test]
    fn test_second_init_wins() {
        let mut app = bridge_app();
        post(
            &app,
            r##"{"cmd":"init","params":{"serviceName":"First","protector":[{"label":"A","value":1,"color":"#fff"},{"label":"B","value":2,"color":"#fff"}],"warm":[{"label":"W","value":3,"color":"#fff"}]}}"##,
        );
        post(
            &app,
            r##"{"cmd":"init","params":{"serviceName":"Second","protector":[{"label":"C","value":9,"color":"#0f0"}]}}"##,
        );
        app.update();

        let state = &app.world().resource::<ServiceData>().0;
        assert_eq!(state.service_name, "Second");
        assert_eq!(state.protector.len(), 1);
        assert_eq!(state.protector[0].display_label(), "C");
        assert!(state.warm.is_empty());

        let board = app.world().resource::<PanelBoard>();
        assert_eq!(board.title.text, "Second");
        assert!(board.panel(PanelId::Warm).unwrap().node.is_empty_state());
    }

    #[test]
    fn test_ignored_messages_keep_state() {
        let mut app = bridge_app();
        post(&app, r##"{"cmd":"init","params":{"serviceName":"Kept"}}"##);
        app.update();

        post(&app, "not json");
        post(&app, r##"{"cmd":"refresh","params":{"serviceName":"Other"}}"##);
        post(&app, r##"{"cmd":"init"}"##);
        post(&app, r##"["init"]"##);
        app.update();

        assert_eq!(app.world().resource::<ServiceData>().0.service_name, "Kept");
        assert!(app.world().resource::<PendingHostMessages>().drain().is_empty());
    }

    #[test]
    fn test_data_before_model_keeps_default_placement() {
        let mut app = bridge_app();
        post(
            &app,
            r##"{"cmd":"init","params":{"serviceName":"M","protector":[{"name":"Current","value":"12 A","color":"#2FC060"}]}}"##,
        );
        app.update();

        let board = app.world().resource::<PanelBoard>();
        let protector = board.panel(PanelId::Protector).unwrap();
        assert_eq!(protector.placement.position, Vec3::new(-3.2, 2.8, 1.0));
        assert_eq!(protector.node.rows[0].label.text, "Current");
        assert_eq!(protector.node.rows[0].value.text, "12 A");
    }
}
