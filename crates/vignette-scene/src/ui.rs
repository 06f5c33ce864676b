//! Tooltip and loading overlays using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use crate::types::{ModelLoad, SceneInteraction};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, (region_tooltip, load_status_overlay));
    }
}

fn region_tooltip(mut contexts: EguiContexts, interaction: Res<SceneInteraction>) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    // No tooltip while rotating the model
    if interaction.is_dragging() {
        return;
    }
    let Some(hover) = interaction.hover() else { return };

    ctx.set_cursor_icon(egui::CursorIcon::PointingHand);

    egui::Area::new(egui::Id::new("region_tooltip"))
        .order(egui::Order::Tooltip)
        .fixed_pos(egui::pos2(hover.anchor.x, hover.anchor.y))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 204))
                .corner_radius(5)
                .inner_margin(egui::Margin::same(10))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(&hover.tooltip)
                            .color(egui::Color32::WHITE)
                            .size(14.0),
                    );
                });
        });
}

/// "Loading N%" while the model streams in, an error line if it fails
fn load_status_overlay(mut contexts: EguiContexts, load: Option<Res<ModelLoad>>) {
    let Some(text) = load.and_then(|l| l.tracker.status_text()) else { return };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::Area::new(egui::Id::new("load_status"))
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(text)
                    .color(egui::Color32::WHITE)
                    .size(18.0),
            );
        });
}
