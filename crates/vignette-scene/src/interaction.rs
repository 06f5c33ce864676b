//! Pointer, touch and wheel input feeding the interaction controller

use bevy::input::mouse::{AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use bevy_picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use std::collections::HashMap;
use vignette_core::{
    InteractionController, NavigationRequest, Ndc, PickableRegion, PointerPosition,
    RegionHitTest, RegionId,
};

use crate::types::{MainCamera, NavigateTo, RegionMesh, SceneInteraction};

/// Pixels per wheel "line", matching what browsers report in pixel mode
const LINE_HEIGHT_PX: f32 = 100.0;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClickTracker>().add_systems(
            Update,
            (sync_viewport, handle_pointer_input, handle_wheel, tick_controller).chain(),
        );
    }
}

/// Tracks where the current press started, to tell clicks from drags
#[derive(Resource, Default)]
struct ClickTracker {
    press: Option<Vec2>,
    last: Option<Vec2>,
}

/// Touch state for one frame, read out of `Touches`
#[derive(Debug, Clone, Default)]
struct TouchSnapshot {
    active: Vec<Vec2>,
    just_pressed: bool,
    released: Option<Vec2>,
}

impl TouchSnapshot {
    fn from_touches(touches: &Touches) -> Self {
        Self {
            active: touches.iter().map(|t| t.position()).collect(),
            just_pressed: touches.any_just_pressed(),
            released: touches.iter_just_released().next().map(|t| t.position()),
        }
    }

    /// A finger is down or was lifted this frame
    fn in_progress(&self) -> bool {
        !self.active.is_empty() || self.released.is_some()
    }
}

/// Pointer input for one frame, from either the mouse or a single touch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PointerFrame {
    pressed: bool,
    released: bool,
    /// Where the pointer is now; `None` when no single pointer is tracked
    position: Option<Vec2>,
    release_position: Option<Vec2>,
    /// Two or more fingers down
    multi_touch: bool,
    /// egui owns the pointer
    blocked: bool,
}

impl PointerFrame {
    fn from_input(
        mouse_button: &ButtonInput<MouseButton>,
        cursor: Option<Vec2>,
        touch: &TouchSnapshot,
        blocked: bool,
    ) -> Self {
        if touch.in_progress() {
            // Touch gestures never fall back to the (possibly stale) cursor
            let single = match touch.active.as_slice() {
                [p] => Some(*p),
                _ => None,
            };
            Self {
                pressed: touch.just_pressed && single.is_some(),
                released: touch.released.is_some(),
                position: single,
                release_position: touch.released,
                multi_touch: touch.active.len() > 1,
                blocked,
            }
        } else {
            Self {
                pressed: mouse_button.just_pressed(MouseButton::Left),
                released: mouse_button.just_released(MouseButton::Left),
                position: cursor,
                release_position: cursor,
                multi_touch: false,
                blocked,
            }
        }
    }
}

fn sync_viewport(
    mut interaction: ResMut<SceneInteraction>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if let Ok(window) = windows.single() {
        interaction.set_viewport(window.width(), window.height());
    }
}

pub(crate) fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false)
}

/// Mouse (left button) and single-finger touch drive drag, hover and click
#[allow(clippy::too_many_arguments)]
fn handle_pointer_input(
    mut interaction: ResMut<SceneInteraction>,
    mut clicks: ResMut<ClickTracker>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    region_meshes: Query<(Entity, &RegionMesh)>,
    mut ray_cast: MeshRayCast,
    mut contexts: EguiContexts,
    mut navigate: MessageWriter<NavigateTo>,
) {
    let cursor = windows.single().ok().and_then(|w| w.cursor_position());
    let frame = PointerFrame::from_input(
        &mouse_button,
        cursor,
        &TouchSnapshot::from_touches(&touches),
        egui_wants_pointer(&mut contexts),
    );

    let region_of: HashMap<Entity, RegionId> = region_meshes
        .iter()
        .map(|(entity, mesh)| (entity, mesh.region.clone()))
        .collect();
    let mut hit_test = MeshHitTest {
        ray_cast: &mut ray_cast,
        camera: cameras.single().ok(),
        region_of: &region_of,
    };

    if let Some(request) = apply_pointer_frame(&frame, &mut interaction.0, &mut clicks, &mut hit_test) {
        navigate.write(NavigateTo {
            region: request.region,
            target: request.target,
        });
    }
}

/// Feed one frame of pointer input to the controller; returns a navigation on click
fn apply_pointer_frame(
    frame: &PointerFrame,
    interaction: &mut InteractionController,
    clicks: &mut ClickTracker,
    hit_test: &mut impl RegionHitTest,
) -> Option<NavigationRequest> {
    if frame.multi_touch {
        // A second finger cancels the gesture instead of jumping between fingers
        if interaction.is_dragging() {
            interaction.on_pointer_up();
        }
        clicks.press = None;
        clicks.last = None;
        return None;
    }

    if frame.pressed && !frame.blocked {
        if let Some(pos) = frame.position {
            interaction.on_pointer_down(to_pointer(pos));
            clicks.press = Some(pos);
            clicks.last = Some(pos);
        }
    }

    if let Some(pos) = frame.position {
        if clicks.last != Some(pos) {
            clicks.last = Some(pos);
            // An active drag keeps going even when it passes over a panel
            if !frame.blocked || interaction.is_dragging() {
                interaction.on_pointer_move(to_pointer(pos), hit_test);
            }
        }
    }

    if !frame.released {
        return None;
    }
    interaction.on_pointer_up();

    let (start, end) = (clicks.press.take()?, frame.release_position?);
    if is_click(start, end, interaction.settings().click_slop) {
        interaction.on_click(to_pointer(end), hit_test)
    } else {
        None
    }
}

fn handle_wheel(
    mut interaction: ResMut<SceneInteraction>,
    scroll: Res<AccumulatedMouseScroll>,
    mut contexts: EguiContexts,
) {
    if scroll.delta.y == 0.0 || egui_wants_pointer(&mut contexts) {
        return;
    }
    interaction.on_wheel(browser_wheel_delta(scroll.unit, scroll.delta.y));
}

pub(crate) fn tick_controller(mut interaction: ResMut<SceneInteraction>) {
    interaction.tick();
}

/// Bevy reports scroll-up as positive; browsers report it as negative deltaY
fn browser_wheel_delta(unit: MouseScrollUnit, y: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => -y * LINE_HEIGHT_PX,
        MouseScrollUnit::Pixel => -y,
    }
}

fn is_click(start: Vec2, end: Vec2, slop: f32) -> bool {
    to_pointer(start).distance(to_pointer(end)) <= slop
}

fn to_pointer(pos: Vec2) -> PointerPosition {
    PointerPosition::new(pos.x, pos.y)
}

/// Casts the camera ray against the meshes tagged with a region
struct MeshHitTest<'a, 'w, 's> {
    ray_cast: &'a mut MeshRayCast<'w, 's>,
    camera: Option<(&'a Camera, &'a GlobalTransform)>,
    region_of: &'a HashMap<Entity, RegionId>,
}

impl MeshHitTest<'_, '_, '_> {
    fn ray(&self, ndc: Ndc) -> Option<Ray3d> {
        let (camera, transform) = self.camera?;
        let ndc = Vec2::new(ndc.x, ndc.y);
        // Reverse-Z: the near plane sits at depth 1
        let near = camera.ndc_to_world(transform, ndc.extend(1.0))?;
        let far = camera.ndc_to_world(transform, ndc.extend(f32::EPSILON))?;
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d::new(near, direction))
    }
}

impl RegionHitTest for MeshHitTest<'_, '_, '_> {
    fn intersects(&mut self, ndc: Ndc, region: &PickableRegion) -> bool {
        let Some(ray) = self.ray(ndc) else {
            return false;
        };

        let region_of = self.region_of;
        let filter = |entity: Entity| region_of.get(&entity) == Some(&region.id);
        let settings = MeshRayCastSettings::default().with_filter(&filter);
        !self.ray_cast.cast_ray(ray, &settings).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::{RoleTable, SceneConfig};

    fn controller() -> InteractionController {
        let config = SceneConfig::default();
        let mut c = InteractionController::from_config(&config);
        c.set_viewport(800.0, 600.0);
        for rule in RoleTable::new(config.regions).rules() {
            c.register_region(PickableRegion::from(rule));
        }
        c
    }

    /// Only the laptop is under the pointer
    fn laptop(_: Ndc, region: &PickableRegion) -> bool {
        region.id.as_str() == "technology"
    }

    fn press(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            pressed: true,
            position: Some(Vec2::new(x, y)),
            ..default()
        }
    }

    fn moved(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            position: Some(Vec2::new(x, y)),
            ..default()
        }
    }

    fn release(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            released: true,
            position: Some(Vec2::new(x, y)),
            release_position: Some(Vec2::new(x, y)),
            ..default()
        }
    }

    fn run(frames: &[PointerFrame], c: &mut InteractionController) -> Vec<NavigationRequest> {
        let mut clicks = ClickTracker::default();
        let mut hit_test = laptop;
        frames
            .iter()
            .filter_map(|frame| apply_pointer_frame(frame, c, &mut clicks, &mut hit_test))
            .collect()
    }

    #[test]
    fn test_click_within_slop_navigates_once() {
        let mut c = controller();
        let navigations = run(
            &[press(100.0, 100.0), moved(104.0, 103.0), release(104.0, 103.0), moved(120.0, 120.0)],
            &mut c,
        );

        assert_eq!(navigations.len(), 1);
        assert_eq!(navigations[0].target, "laptop.html");
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_drag_does_not_navigate() {
        let mut c = controller();
        let navigations = run(
            &[press(100.0, 100.0), moved(200.0, 150.0), release(200.0, 150.0)],
            &mut c,
        );

        assert!(navigations.is_empty());
        assert!(c.rotation().velocity.yaw > 0.0);
    }

    #[test]
    fn test_blocked_press_is_ignored() {
        let mut c = controller();
        let mut blocked = press(100.0, 100.0);
        blocked.blocked = true;

        let navigations = run(&[blocked, release(100.0, 100.0)], &mut c);
        assert!(navigations.is_empty());
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_second_finger_cancels_drag() {
        let mut c = controller();
        let two_fingers = PointerFrame {
            multi_touch: true,
            ..default()
        };

        let navigations = run(
            &[
                press(100.0, 100.0),
                moved(110.0, 100.0),
                two_fingers,
                // Remaining finger far away: no jump into the rotation
                moved(400.0, 300.0),
                release(400.0, 300.0),
            ],
            &mut c,
        );

        assert!(navigations.is_empty());
        assert!(!c.is_dragging());
        assert!((c.rotation().velocity.yaw - 10.0 * 0.005).abs() < 1e-6);
        assert_eq!(c.rotation().velocity.pitch, 0.0);
    }

    #[test]
    fn test_touch_frames_ignore_cursor() {
        let mouse = ButtonInput::<MouseButton>::default();
        let stale_cursor = Some(Vec2::new(700.0, 500.0));

        let lifted = TouchSnapshot {
            released: Some(Vec2::new(100.0, 100.0)),
            ..default()
        };
        let frame = PointerFrame::from_input(&mouse, stale_cursor, &lifted, false);
        assert!(frame.released);
        assert_eq!(frame.position, None);
        assert_eq!(frame.release_position, Some(Vec2::new(100.0, 100.0)));

        let two = TouchSnapshot {
            active: vec![Vec2::new(100.0, 100.0), Vec2::new(400.0, 300.0)],
            just_pressed: true,
            ..default()
        };
        let frame = PointerFrame::from_input(&mouse, stale_cursor, &two, false);
        assert!(frame.multi_touch);
        assert!(!frame.pressed);
        assert_eq!(frame.position, None);
    }

    #[test]
    fn test_mouse_frame() {
        let mut mouse = ButtonInput::<MouseButton>::default();
        mouse.press(MouseButton::Left);
        let cursor = Some(Vec2::new(10.0, 20.0));

        let frame = PointerFrame::from_input(&mouse, cursor, &TouchSnapshot::default(), true);
        assert!(frame.pressed);
        assert!(frame.blocked);
        assert_eq!(frame.position, cursor);
    }

    #[test]
    fn test_wheel_delta_follows_browser_sign() {
        // Scrolling down one notch zooms out
        assert_eq!(browser_wheel_delta(MouseScrollUnit::Line, -1.0), 100.0);
        assert_eq!(browser_wheel_delta(MouseScrollUnit::Pixel, 53.0), -53.0);
    }

    #[test]
    fn test_click_slop() {
        let start = Vec2::new(100.0, 100.0);
        assert!(is_click(start, start, 10.0));
        assert!(is_click(start, Vec2::new(106.0, 108.0), 10.0));
        assert!(!is_click(start, Vec2::new(111.0, 100.0), 10.0));
    }
}
