//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{DefaultPickingPlugins, prelude::MeshPickingPlugin};
use vignette_core::SceneConfig;
use vignette_scene::VignettePlugin;

use crate::page::{self, PagePlugin};

/// Canvas element the scene renders into
const CANVAS_SELECTOR: &str = "#vignette-canvas";

/// Scene configuration read next to the binary on native builds
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_FILE: &str = "vignette.toml";

pub fn run() {
    let config = load_config();

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Vignette".to_string(),
                    canvas: Some(CANVAS_SELECTOR.to_string()),
                    fit_canvas_to_parent: true,
                    // Keep wheel and touch gestures from scrolling the page
                    prevent_default_event_handling: true,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Models are served next to the page
                file_path: "".to_string(),
                // Don't look for .meta files - static hosting doesn't have them
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Picking plugins go before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(VignettePlugin { config })
        .add_plugins(PagePlugin)
        .run();
}

/// Defaults on the web (plus URL overrides), `vignette.toml` on native
fn load_config() -> SceneConfig {
    #[cfg(not(target_arch = "wasm32"))]
    let mut config = match SceneConfig::from_file(std::path::Path::new(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load {}: {}, using defaults", CONFIG_FILE, e);
            SceneConfig::default()
        }
    };
    #[cfg(target_arch = "wasm32")]
    let mut config = SceneConfig::default();

    if let Some(model) = page::model_override() {
        tracing::info!("Model overridden by URL parameter: {}", model);
        config.model.path = model;
    }
    config
}
