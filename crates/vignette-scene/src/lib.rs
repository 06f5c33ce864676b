//! Vignette Scene - Bevy plugins for the interactive model scene
//!
//! Wires the engine-independent controller from `vignette-core` into Bevy:
//! camera and lights, glTF loading and region tagging, pointer/wheel input
//! with mesh ray casting, and the egui tooltip and loading overlays.

pub mod camera;
pub mod interaction;
pub mod models;
pub mod types;
pub mod ui;

use bevy::prelude::*;
use vignette_core::{RoleTable, SceneConfig};

/// Plugin that sets up the whole scene from a configuration
pub struct VignettePlugin {
    pub config: SceneConfig,
}

impl Plugin for VignettePlugin {
    fn build(&self, app: &mut App) {
        let [r, g, b] = self.config.camera.background;

        app.insert_resource(ClearColor(Color::srgb(r, g, b)))
            .insert_resource(SceneSettings(self.config.clone()))
            .insert_resource(SceneInteraction(InteractionController::from_config(&self.config)))
            .insert_resource(RegionRoles(RoleTable::new(self.config.regions.clone())))
            .add_message::<NavigateTo>()
            .add_plugins(camera::CameraPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use types::*;
pub use vignette_core::InteractionController;
