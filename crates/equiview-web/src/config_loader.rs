//! Scene configuration from the `?config=` URL parameter

use bevy::prelude::*;
use equiview_core::SceneConfig;
use equiview_scene::{ConfigStatus, SceneSettings};
use std::sync::{Arc, Mutex};

/// Plugin for remote configuration loading
pub struct ConfigLoaderPlugin;

impl Plugin for ConfigLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingConfig>()
            .add_systems(Startup, fetch_remote_config)
            .add_systems(Update, apply_remote_config.run_if(config_pending));
    }
}

/// Fetch outcome: TOML text, or why it could not be fetched
#[derive(Resource, Default, Clone)]
pub struct PendingConfig(pub Arc<Mutex<Option<Result<String, String>>>>);

fn config_pending(status: Res<ConfigStatus>) -> bool {
    *status == ConfigStatus::Pending
}

/// `Pending` when a remote configuration will be fetched
pub fn initial_status() -> ConfigStatus {
    if config_url().is_some() {
        ConfigStatus::Pending
    } else {
        ConfigStatus::Settled
    }
}

#[cfg(target_arch = "wasm32")]
fn config_url() -> Option<String> {
    let href = web_sys::window()?.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    url.search_params().get("config").filter(|u| !u.is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
fn config_url() -> Option<String> {
    None
}

fn fetch_remote_config(pending: Res<PendingConfig>) {
    let Some(url) = config_url() else {
        return;
    };
    tracing::info!("Loading scene config from URL parameter: {}", url);

    #[cfg(target_arch = "wasm32")]
    {
        let result = pending.0.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = fetch_text(&url).await;
            if let Ok(mut slot) = result.lock() {
                *slot = Some(outcome);
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = &pending;
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> Result<String, String> {
    let response = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("Fetch failed: {}", e))?;
    if !response.ok() {
        return Err(format!("HTTP {}: {}", response.status(), response.status_text()));
    }
    response.text().await.map_err(|e| format!("Text extraction failed: {}", e))
}

/// Install a fetched configuration, or keep the defaults, then let loading start
fn apply_remote_config(
    pending: Res<PendingConfig>,
    mut settings: ResMut<SceneSettings>,
    mut status: ResMut<ConfigStatus>,
) {
    let outcome = match pending.0.try_lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };
    let Some(outcome) = outcome else {
        return;
    };

    match outcome.map(|text| SceneConfig::from_toml(&text)) {
        Ok(Ok(config)) => {
            tracing::info!("Scene config loaded");
            settings.0 = config;
        }
        Ok(Err(e)) => {
            tracing::warn!("Invalid scene config, using defaults: {}", e);
        }
        Err(e) => {
            tracing::warn!("Could not fetch scene config, using defaults: {}", e);
        }
    }
    *status = ConfigStatus::Settled;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_app() -> App {
        let mut app = App::new();
        app.init_resource::<PendingConfig>()
            .init_resource::<SceneSettings>()
            .insert_resource(ConfigStatus::Pending)
            .add_systems(Update, apply_remote_config.run_if(config_pending));
        app
    }

    fn deliver(app: &App, outcome: Result<String, String>) {
        let pending = app.world().resource::<PendingConfig>();
        *pending.0.lock().unwrap() = Some(outcome);
    }

    #[test]
    fn test_waits_for_fetch() {
        let mut app = loader_app();
        app.update();
        assert_eq!(*app.world().resource::<ConfigStatus>(), ConfigStatus::Pending);
    }

    #[test]
    fn test_fetched_config_applied() {
        let mut app = loader_app();
        deliver(
            &app,
            Ok(r#"
[assets]
equipment = "models/pump.glb"

[axes]
show = false
"#
            .to_string()),
        );
        app.update();

        let settings = &app.world().resource::<SceneSettings>().0;
        assert_eq!(settings.assets.equipment, "models/pump.glb");
        assert!(!settings.axes.show);
        assert_eq!(*app.world().resource::<ConfigStatus>(), ConfigStatus::Settled);
    }

    #[test]
    fn test_failures_keep_defaults() {
        for outcome in [Err("HTTP 404: Not Found".to_string()), Ok("[marker]\nradius = -1.0".to_string())] {
            let mut app = loader_app();
            deliver(&app, outcome);
            app.update();

            assert_eq!(app.world().resource::<SceneSettings>().0, SceneConfig::default());
            assert_eq!(*app.world().resource::<ConfigStatus>(), ConfigStatus::Settled);
        }
    }
}
