//! glTF model loading, fitting and region tagging

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::scene::{SceneInstance, SceneSpawner};
use std::collections::HashSet;
use std::time::Duration;
use vignette_core::{Bounds, FitTransform, LoadTracker, PickableRegion, RegionId, RoleTable};

use crate::types::{
    ModelLoad, ModelPivot, ModelRoot, RegionMesh, RegionRoles, SceneInteraction, SceneSettings,
};

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, start_model_load)
            .add_systems(Update, (
                track_model_load,
                prepare_model,
                update_region_highlighting,
            ).chain());
    }
}

fn start_model_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<SceneSettings>,
    time: Res<Time>,
) {
    let path = settings.model.path.clone();
    tracing::info!("Loading model: {}", path);

    let handle: Handle<Gltf> = asset_server.load(path.clone());
    commands.insert_resource(ModelLoad {
        handle,
        tracker: LoadTracker::new(path, Duration::from_secs(settings.model.load_timeout_secs)),
        started: time.elapsed(),
    });
}

/// Follow the asset server's load state and spawn the scene once everything is in
fn track_model_load(
    mut commands: Commands,
    load: Option<ResMut<ModelLoad>>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    time: Res<Time>,
) {
    let Some(mut load) = load else { return };
    if !load.tracker.is_loading() {
        return;
    }

    let id = load.handle.id();
    match asset_server.get_load_state(id) {
        Some(LoadState::Loaded) => {
            // Document parsed; textures and buffers may still be in flight
            load.tracker.progress(1, 2);

            match asset_server.get_recursive_dependency_load_state(id) {
                Some(RecursiveDependencyLoadState::Loaded) => {
                    let scene = gltf_assets.get(&load.handle).and_then(|gltf| {
                        gltf.default_scene
                            .clone()
                            .or_else(|| gltf.scenes.first().cloned())
                    });

                    match scene {
                        Some(scene) => {
                            load.tracker.progress(2, 2);
                            load.tracker.succeed();
                            spawn_model(&mut commands, scene);
                        }
                        None => load.tracker.fail("model contains no scenes"),
                    }
                }
                Some(RecursiveDependencyLoadState::Failed(err)) => {
                    load.tracker.fail(err.to_string());
                }
                _ => {
                    // Dependencies still loading
                }
            }
        }
        Some(LoadState::Failed(err)) => {
            load.tracker.fail(err.to_string());
        }
        _ => {
            // Still loading
        }
    }

    let elapsed = time.elapsed().saturating_sub(load.started);
    load.tracker.check_timeout(elapsed);
}

fn spawn_model(commands: &mut Commands, scene: Handle<Scene>) {
    commands
        .spawn((
            ModelPivot,
            Transform::default(),
            Visibility::default(),
            Name::new("model-pivot"),
        ))
        .with_children(|parent| {
            // Hidden until fitted so the unscaled model never flashes on screen
            parent.spawn((
                SceneRoot(scene),
                Transform::default(),
                Visibility::Hidden,
                ModelRoot::default(),
                Name::new("model-root"),
            ));
        });
}

/// A mesh entity found while walking the model
struct ModelMesh {
    entity: Entity,
    region: Option<RegionId>,
    material: Option<Handle<StandardMaterial>>,
}

type ModelNodeQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static Transform,
        Option<&'static Name>,
        Option<&'static Mesh3d>,
        Option<&'static MeshMaterial3d<StandardMaterial>>,
    ),
    Without<ModelRoot>,
>;

/// Once the scene instance is spawned: fit it to the view, tag region meshes,
/// tune materials and register the regions with the controller
fn prepare_model(
    mut commands: Commands,
    mut roots: Query<(&mut ModelRoot, &mut Transform, &mut Visibility, &SceneInstance, &Children)>,
    scene_spawner: Res<SceneSpawner>,
    children_query: Query<&Children>,
    nodes: ModelNodeQuery,
    meshes: Res<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    roles: Res<RegionRoles>,
    settings: Res<SceneSettings>,
    mut interaction: ResMut<SceneInteraction>,
) {
    for (mut root, mut transform, mut visibility, instance, top_level) in roots.iter_mut() {
        if root.prepared || !scene_spawner.instance_is_ready(**instance) {
            continue;
        }

        let mut bounds = Bounds::empty();
        let mut model_meshes = Vec::new();
        for child in top_level.iter() {
            collect_model_meshes(
                child,
                Transform::IDENTITY,
                None,
                &children_query,
                &nodes,
                &meshes,
                &roles,
                &mut bounds,
                &mut model_meshes,
            );
        }

        let fit = FitTransform::for_bounds(&bounds, settings.model.fit_size);
        transform.scale = Vec3::splat(fit.scale);
        transform.translation = Vec3::from_array(fit.translation);
        *visibility = Visibility::Inherited;
        root.prepared = true;

        tracing::info!(
            "Model fitted: {} meshes, size {:?}, scale {:.4}",
            model_meshes.len(),
            bounds.size(),
            fit.scale
        );

        let material_settings = &settings.materials;
        let idle_emissive = emissive_color(material_settings.idle_emissive);
        let mut tuned = HashSet::new();
        let mut found_regions = HashSet::new();

        for mesh in model_meshes {
            match (&mesh.region, &mesh.material) {
                (Some(region), material) => {
                    commands.entity(mesh.entity).insert(RegionMesh {
                        region: region.clone(),
                    });
                    found_regions.insert(region.clone());

                    // Own material copy so highlighting never bleeds into other meshes
                    let cloned = material.as_ref().and_then(|m| materials.get(m).cloned());
                    if let Some(mut own) = cloned {
                        own.perceptual_roughness = material_settings.roughness;
                        own.metallic = material_settings.metalness;
                        own.emissive = idle_emissive;
                        let handle = materials.add(own);
                        commands.entity(mesh.entity).insert(MeshMaterial3d(handle));
                    }
                }
                (None, Some(material)) => {
                    if tuned.insert(material.id()) {
                        if let Some(shared) = materials.get_mut(material) {
                            shared.perceptual_roughness = material_settings.roughness;
                            shared.metallic = material_settings.metalness;
                        }
                    }
                }
                (None, None) => {}
            }
        }

        // Register in table order so hit testing follows rule priority
        for rule in roles.rules() {
            if found_regions.contains(&rule.role) {
                interaction.register_region(PickableRegion::from(rule));
            } else {
                tracing::warn!("No meshes matched region '{}'", rule.role);
            }
        }
    }
}

/// Walk the hierarchy below a scene root, accumulating transforms relative to it
#[allow(clippy::too_many_arguments)]
fn collect_model_meshes(
    entity: Entity,
    parent_transform: Transform,
    inherited: Option<&RegionId>,
    children_query: &Query<&Children>,
    nodes: &ModelNodeQuery,
    meshes: &Assets<Mesh>,
    roles: &RoleTable,
    bounds: &mut Bounds,
    out: &mut Vec<ModelMesh>,
) {
    let Ok((local, name, mesh3d, material)) = nodes.get(entity) else {
        return;
    };

    let transform = parent_transform.mul_transform(*local);
    let region = node_region(name, inherited, roles);

    if let Some(mesh3d) = mesh3d {
        let positions = meshes
            .get(&mesh3d.0)
            .and_then(|mesh| mesh.attribute(Mesh::ATTRIBUTE_POSITION))
            .and_then(|values| values.as_float3());
        if let Some(positions) = positions {
            for p in positions {
                bounds.include_point(transform.transform_point(Vec3::from_array(*p)).to_array());
            }
        }

        out.push(ModelMesh {
            entity,
            region: region.cloned(),
            material: material.map(|m| m.0.clone()),
        });
    }

    if let Ok(children) = children_query.get(entity) {
        for child in children.iter() {
            collect_model_meshes(
                child,
                transform,
                region,
                children_query,
                nodes,
                meshes,
                roles,
                bounds,
                out,
            );
        }
    }
}

/// A node's own name decides its region; unmatched nodes inherit their parent's
fn node_region<'a>(
    name: Option<&Name>,
    inherited: Option<&'a RegionId>,
    roles: &'a RoleTable,
) -> Option<&'a RegionId> {
    name.and_then(|n| roles.classify(n.as_str()))
        .map(|rule| &rule.role)
        .or(inherited)
}

/// Set emissive on region meshes when the hovered region changes
fn update_region_highlighting(
    interaction: Res<SceneInteraction>,
    settings: Res<SceneSettings>,
    region_meshes: Query<(&RegionMesh, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut last_hovered: Local<Option<RegionId>>,
) {
    let hovered = interaction.hover().map(|h| h.region.clone());
    if hovered == *last_hovered {
        return;
    }

    let idle = emissive_color(settings.materials.idle_emissive);
    let highlight = emissive_color(settings.materials.hover_emissive);

    for (region_mesh, material) in region_meshes.iter() {
        if let Some(material) = materials.get_mut(&material.0) {
            material.emissive = if hovered.as_ref() == Some(&region_mesh.region) {
                highlight
            } else {
                idle
            };
        }
    }

    *last_hovered = hovered;
}

fn emissive_color(srgb: [f32; 3]) -> LinearRgba {
    Color::srgb(srgb[0], srgb[1], srgb[2]).to_linear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::{InteractionController, Ndc, PointerPosition, SceneConfig};

    fn highlight_app(config: &SceneConfig) -> App {
        let mut interaction = InteractionController::from_config(config);
        interaction.set_viewport(800.0, 600.0);
        for rule in RoleTable::new(config.regions.clone()).rules() {
            interaction.register_region(PickableRegion::from(rule));
        }

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(SceneSettings(config.clone()))
            .insert_resource(SceneInteraction(interaction))
            .insert_resource(Assets::<StandardMaterial>::default())
            .add_systems(Update, update_region_highlighting);
        app
    }

    fn spawn_region_mesh(app: &mut App, role: &str, emissive: LinearRgba) -> Handle<StandardMaterial> {
        let handle = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                emissive,
                ..default()
            });
        app.world_mut().spawn((
            RegionMesh {
                region: RegionId::new(role),
            },
            MeshMaterial3d(handle.clone()),
        ));
        handle
    }

    fn hover(app: &mut App, role: &'static str) {
        let mut under_pointer = |_: Ndc, r: &PickableRegion| r.id.as_str() == role;
        app.world_mut()
            .resource_mut::<SceneInteraction>()
            .on_pointer_move(PointerPosition::new(10.0, 10.0), &mut under_pointer);
    }

    fn emissive(app: &App, handle: &Handle<StandardMaterial>) -> LinearRgba {
        app.world()
            .resource::<Assets<StandardMaterial>>()
            .get(handle)
            .map(|m| m.emissive)
            .unwrap()
    }

    #[test]
    fn test_hover_highlights_only_hovered_region() {
        let config = SceneConfig::default();
        let idle = emissive_color(config.materials.idle_emissive);
        let highlight = emissive_color(config.materials.hover_emissive);

        let mut app = highlight_app(&config);
        let laptop = spawn_region_mesh(&mut app, "technology", idle);
        let screen = spawn_region_mesh(&mut app, "technology", idle);
        let grass = spawn_region_mesh(&mut app, "nature", idle);

        hover(&mut app, "technology");
        app.update();
        assert_eq!(emissive(&app, &laptop), highlight);
        assert_eq!(emissive(&app, &screen), highlight);
        assert_eq!(emissive(&app, &grass), idle);

        // Moving to another region resets the previous one
        hover(&mut app, "nature");
        app.update();
        assert_eq!(emissive(&app, &laptop), idle);
        assert_eq!(emissive(&app, &screen), idle);
        assert_eq!(emissive(&app, &grass), highlight);
    }

    #[test]
    fn test_drag_clears_highlight() {
        let config = SceneConfig::default();
        let idle = emissive_color(config.materials.idle_emissive);

        let mut app = highlight_app(&config);
        let grass = spawn_region_mesh(&mut app, "nature", idle);

        hover(&mut app, "nature");
        app.update();
        assert_ne!(emissive(&app, &grass), idle);

        app.world_mut()
            .resource_mut::<SceneInteraction>()
            .on_pointer_down(PointerPosition::new(10.0, 10.0));
        app.update();
        assert_eq!(emissive(&app, &grass), idle);
    }

    #[test]
    fn test_node_region_own_name_wins() {
        let roles = RoleTable::new(SceneConfig::default().regions);
        let nature = RegionId::new("nature");

        let name = Name::new("LaptopScreen_01");
        let region = node_region(Some(&name), Some(&nature), &roles);
        assert_eq!(region.map(|r| r.as_str()), Some("technology"));
    }

    #[test]
    fn test_node_region_inherits() {
        let roles = RoleTable::new(SceneConfig::default().regions);
        let nature = RegionId::new("nature");

        // Primitive entities under a matched node
        let name = Name::new("Mesh.0");
        assert_eq!(node_region(Some(&name), Some(&nature), &roles), Some(&nature));
        assert_eq!(node_region(None, Some(&nature), &roles), Some(&nature));
        assert_eq!(node_region(None, None, &roles), None);
    }

    #[test]
    fn test_emissive_colors() {
        let idle = emissive_color([0.0, 0.0, 0.0]);
        assert_eq!(idle, LinearRgba::new(0.0, 0.0, 0.0, 1.0));

        let settings = SceneConfig::default().materials;
        let a = emissive_color(settings.idle_emissive);
        let b = emissive_color(settings.hover_emissive);
        assert!(b.red > a.red);
    }
}
