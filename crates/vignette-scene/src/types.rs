//! Shared resources, components and messages for the scene plugins

use bevy::prelude::*;
use std::time::Duration;
use vignette_core::{InteractionController, LoadTracker, RegionId, RoleTable, SceneConfig};

/// Scene configuration, read-only after startup
#[derive(Debug, Clone, Resource, Deref)]
pub struct SceneSettings(pub SceneConfig);

/// The interaction controller driving camera, model rotation and picking
#[derive(Debug, Clone, Resource, Deref, DerefMut)]
pub struct SceneInteraction(pub InteractionController);

/// Region rules used to tag meshes of the loaded model
#[derive(Debug, Clone, Resource, Deref)]
pub struct RegionRoles(pub RoleTable);

/// The pending (or finished) model load
#[derive(Resource)]
pub struct ModelLoad {
    pub handle: Handle<bevy::gltf::Gltf>,
    pub tracker: LoadTracker,
    /// `Time::elapsed` when the load started
    pub started: Duration,
}

/// Message asking the host page to open a region's target
#[derive(Message, Debug, Clone, PartialEq)]
pub struct NavigateTo {
    pub region: RegionId,
    pub target: String,
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Marker for the directional light that follows the camera
#[derive(Component)]
pub struct KeyLight;

/// Entity carrying the model rotation; the scene root is its child
#[derive(Component)]
pub struct ModelPivot;

/// Root of the spawned glTF scene
#[derive(Component, Default)]
pub struct ModelRoot {
    /// Set once the model has been fitted and its regions tagged
    pub prepared: bool,
}

/// Mesh entity belonging to a pickable region
#[derive(Component, Debug, Clone)]
pub struct RegionMesh {
    pub region: RegionId,
}
