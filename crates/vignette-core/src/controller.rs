//! Interaction controller: drag rotation with inertia, eased zoom and region picking
//!
//! The controller owns all pointer, rotation and zoom state. Input handlers
//! call the `on_*` methods; the render loop calls [`InteractionController::tick`]
//! once per frame and reads back the model rotation, camera pose and light
//! position. Hit testing is delegated to the engine through [`RegionHitTest`].

use tracing::{debug, info};

use crate::config::{ControlSettings, SceneConfig};
use crate::region::{PickableRegion, RegionId};

/// Pointer position in window pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: PointerPosition) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Normalized device coordinates, both axes in [-1, 1], +y up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ndc {
    pub x: f32,
    pub y: f32,
}

/// Drag state; `last_position` is only meaningful while dragging
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub is_dragging: bool,
    pub last_position: PointerPosition,
}

/// Pitch (about X) and yaw (about Y) in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Angles {
    pub pitch: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RotationState {
    pub angle: Angles,
    pub velocity: Angles,
}

#[derive(Debug, Clone, Copy)]
pub struct ZoomState {
    pub current: f32,
    pub target: f32,
}

/// The hovered region and where its tooltip goes
#[derive(Debug, Clone, PartialEq)]
pub struct HoverState {
    pub region: RegionId,
    pub tooltip: String,
    pub anchor: PointerPosition,
}

/// Page change requested by clicking a region
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub region: RegionId,
    pub target: String,
}

/// Camera placement derived from the zoom state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
}

/// Ray intersection against the meshes of a region
pub trait RegionHitTest {
    /// Whether the ray from the camera through `ndc` hits any mesh of `region`
    fn intersects(&mut self, ndc: Ndc, region: &PickableRegion) -> bool;
}

impl<F> RegionHitTest for F
where
    F: FnMut(Ndc, &PickableRegion) -> bool,
{
    fn intersects(&mut self, ndc: Ndc, region: &PickableRegion) -> bool {
        self(ndc, region)
    }
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    settings: ControlSettings,
    camera_height: f32,
    look_at: [f32; 3],
    light_offset: [f32; 3],
    viewport: (f32, f32),
    pointer: PointerState,
    rotation: RotationState,
    zoom: ZoomState,
    regions: Vec<PickableRegion>,
    hover: Option<HoverState>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl InteractionController {
    pub fn from_config(config: &SceneConfig) -> Self {
        let settings = config.controls.clone();
        let initial = settings
            .initial_zoom
            .clamp(settings.min_zoom, settings.max_zoom);

        Self {
            camera_height: config.camera.height,
            look_at: config.camera.look_at,
            light_offset: config.lighting.light_offset,
            viewport: (0.0, 0.0),
            pointer: PointerState::default(),
            rotation: RotationState::default(),
            zoom: ZoomState {
                current: initial,
                target: initial,
            },
            regions: Vec::new(),
            hover: None,
            settings,
        }
    }

    pub fn settings(&self) -> &ControlSettings {
        &self.settings
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn hover(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_dragging
    }

    /// Rotation to apply to the model, as (pitch, yaw)
    pub fn model_rotation(&self) -> Angles {
        self.rotation.angle
    }

    // === Viewport ===

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    /// Convert window pixels to normalized device coordinates
    pub fn to_ndc(&self, pos: PointerPosition) -> Ndc {
        let (w, h) = self.viewport;
        if w <= 0.0 || h <= 0.0 {
            return Ndc::default();
        }
        Ndc {
            x: (pos.x / w) * 2.0 - 1.0,
            y: -(pos.y / h) * 2.0 + 1.0,
        }
    }

    // === Regions ===

    /// Register a region; re-registering an id replaces it in place
    pub fn register_region(&mut self, region: PickableRegion) {
        if let Some(existing) = self.regions.iter_mut().find(|r| r.id == region.id) {
            *existing = region;
            return;
        }
        info!(region = %region.id, target = %region.target, "Registered pickable region");
        self.regions.push(region);
    }

    pub fn clear_regions(&mut self) {
        self.regions.clear();
        self.hover = None;
    }

    /// Registered regions in priority order
    pub fn regions(&self) -> &[PickableRegion] {
        &self.regions
    }

    // === Input ===

    /// Start a drag; the hovered region is dropped until the pointer moves again
    pub fn on_pointer_down(&mut self, pos: PointerPosition) {
        self.hover = None;
        self.pointer.is_dragging = true;
        self.pointer.last_position = pos;
        self.rotation.velocity = Angles::default();
    }

    /// Drag-rotate while dragging, otherwise resolve hover.
    /// Returns the hover state after the move.
    pub fn on_pointer_move(
        &mut self,
        pos: PointerPosition,
        hit_test: &mut impl RegionHitTest,
    ) -> Option<&HoverState> {
        if self.pointer.is_dragging {
            self.drag_to(pos);
        } else {
            self.update_hover(pos, hit_test);
        }
        self.hover.as_ref()
    }

    pub fn on_pointer_up(&mut self) {
        self.pointer.is_dragging = false;
    }

    /// Adjust the zoom target by a browser-style wheel delta (positive = away)
    pub fn on_wheel(&mut self, delta_y: f32) {
        let s = &self.settings;
        self.zoom.target = (self.zoom.target + delta_y * s.wheel_scale).clamp(s.min_zoom, s.max_zoom);
    }

    /// Resolve a click to the first region under the pointer
    pub fn on_click(
        &mut self,
        pos: PointerPosition,
        hit_test: &mut impl RegionHitTest,
    ) -> Option<NavigationRequest> {
        let region = self.pick(pos, hit_test)?;
        info!(region = %region.id, target = %region.target, "Region clicked");
        Some(NavigationRequest {
            region: region.id.clone(),
            target: region.target.clone(),
        })
    }

    fn drag_to(&mut self, pos: PointerPosition) {
        let speed = self.settings.rotation_speed;
        let dx = pos.x - self.pointer.last_position.x;
        let dy = pos.y - self.pointer.last_position.y;

        self.rotation.velocity = Angles {
            pitch: dy * speed,
            yaw: dx * speed,
        };
        self.rotation.angle.pitch += self.rotation.velocity.pitch;
        self.rotation.angle.yaw += self.rotation.velocity.yaw;
        self.clamp_pitch();

        self.pointer.last_position = pos;
    }

    fn update_hover(&mut self, pos: PointerPosition, hit_test: &mut impl RegionHitTest) {
        let offset = self.settings.tooltip_offset;
        let next = self.pick(pos, hit_test).map(|region| HoverState {
            region: region.id.clone(),
            tooltip: region.tooltip.clone(),
            anchor: PointerPosition::new(pos.x + offset, pos.y + offset),
        });

        let prev = self.hover.as_ref().map(|h| &h.region);
        let curr = next.as_ref().map(|h| &h.region);
        if prev != curr {
            debug!(from = ?prev, to = ?curr, "Hover changed");
        }
        self.hover = next;
    }

    fn pick(
        &self,
        pos: PointerPosition,
        hit_test: &mut impl RegionHitTest,
    ) -> Option<&PickableRegion> {
        if self.regions.is_empty() {
            return None;
        }
        let ndc = self.to_ndc(pos);
        self.regions
            .iter()
            .find(|region| hit_test.intersects(ndc, region))
    }

    fn clamp_pitch(&mut self) {
        let limit = self.settings.pitch_limit;
        self.rotation.angle.pitch = self.rotation.angle.pitch.clamp(-limit, limit);
    }

    // === Frame update ===

    /// Advance inertia and zoom easing by one frame
    pub fn tick(&mut self) {
        let s = &self.settings;

        let v = self.rotation.velocity;
        if !self.pointer.is_dragging
            && (v.pitch.abs() > s.velocity_epsilon || v.yaw.abs() > s.velocity_epsilon)
        {
            self.rotation.angle.pitch += v.pitch;
            self.rotation.angle.yaw += v.yaw;
            self.rotation.velocity.pitch *= s.damping;
            self.rotation.velocity.yaw *= s.damping;
            self.clamp_pitch();
        }

        let s = &self.settings;
        let diff = self.zoom.target - self.zoom.current;
        if diff.abs() > s.zoom_epsilon {
            self.zoom.current = (self.zoom.current + diff * s.zoom_speed).clamp(s.min_zoom, s.max_zoom);
        }
    }

    /// Camera position for the current zoom, looking at a fixed point
    pub fn camera_pose(&self) -> CameraPose {
        CameraPose {
            position: [0.0, self.camera_height, self.zoom.current],
            look_at: self.look_at,
        }
    }

    /// Key light position, a fixed offset from the camera
    pub fn light_position(&self) -> [f32; 3] {
        let p = self.camera_pose().position;
        [
            p[0] + self.light_offset[0],
            p[1] + self.light_offset[1],
            p[2] + self.light_offset[2],
        ]
    }
}
