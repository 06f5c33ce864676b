//! Scene configuration loading and validation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::region::{RegionId, RegionRule};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read scene config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize scene config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid scene config: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlSettings,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub materials: MaterialConfig,
    /// Pickable region rules, in hover/click priority order
    #[serde(default = "default_regions", rename = "region")]
    pub regions: Vec<RegionRule>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlSettings::default(),
            lighting: LightingConfig::default(),
            materials: MaterialConfig::default(),
            regions: default_regions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Asset path of the glTF/GLB model
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Largest bounding-box dimension after fitting
    #[serde(default = "default_fit_size")]
    pub fit_size: f32,
    /// Give up on the model after this many seconds
    #[serde(default = "default_load_timeout")]
    pub load_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            fit_size: default_fit_size(),
            load_timeout_secs: default_load_timeout(),
        }
    }
}

fn default_model_path() -> String {
    "room.glb".to_string()
}

fn default_fit_size() -> f32 {
    0.7
}

fn default_load_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Camera height above the model origin
    #[serde(default = "default_camera_height")]
    pub height: f32,
    /// Fixed look-at point, slightly above the model origin
    #[serde(default = "default_look_at")]
    pub look_at: [f32; 3],
    /// Background color as sRGB (0.0-1.0)
    #[serde(default = "default_background")]
    pub background: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            height: default_camera_height(),
            look_at: default_look_at(),
            background: default_background(),
        }
    }
}

fn default_fov() -> f32 {
    30.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_height() -> f32 {
    0.5
}

fn default_look_at() -> [f32; 3] {
    [0.0, 0.1, 0.0]
}

fn default_background() -> [f32; 3] {
    [0.2, 0.2, 0.2] // #333333
}

/// Tuning for drag rotation, inertia and zoom easing
///
/// Damping and zoom easing are applied once per rendered frame, so their
/// feel depends on the display refresh rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSettings {
    /// Radians per pixel of drag
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    /// Velocity multiplier applied every tick after release
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Inertia stops once both velocity components fall below this
    #[serde(default = "default_velocity_epsilon")]
    pub velocity_epsilon: f32,
    /// Pitch is clamped to [-pitch_limit, pitch_limit]
    #[serde(default = "default_pitch_limit")]
    pub pitch_limit: f32,
    /// Starting camera distance
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f32,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
    /// Fraction of the remaining zoom distance covered per tick
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    /// Zoom units per wheel delta unit (pixels)
    #[serde(default = "default_wheel_scale")]
    pub wheel_scale: f32,
    /// Zoom easing stops once current is this close to target
    #[serde(default = "default_zoom_epsilon")]
    pub zoom_epsilon: f32,
    /// Max pointer travel in pixels between press and release for a click
    #[serde(default = "default_click_slop")]
    pub click_slop: f32,
    /// Tooltip offset from the pointer in pixels
    #[serde(default = "default_tooltip_offset")]
    pub tooltip_offset: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            rotation_speed: default_rotation_speed(),
            damping: default_damping(),
            velocity_epsilon: default_velocity_epsilon(),
            pitch_limit: default_pitch_limit(),
            initial_zoom: default_initial_zoom(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_speed: default_zoom_speed(),
            wheel_scale: default_wheel_scale(),
            zoom_epsilon: default_zoom_epsilon(),
            click_slop: default_click_slop(),
            tooltip_offset: default_tooltip_offset(),
        }
    }
}

fn default_rotation_speed() -> f32 {
    0.005
}

fn default_damping() -> f32 {
    0.95
}

fn default_velocity_epsilon() -> f32 {
    1e-4
}

fn default_pitch_limit() -> f32 {
    std::f32::consts::FRAC_PI_3
}

fn default_initial_zoom() -> f32 {
    2.0
}

fn default_min_zoom() -> f32 {
    0.8
}

fn default_max_zoom() -> f32 {
    12.0
}

fn default_zoom_speed() -> f32 {
    0.12
}

fn default_wheel_scale() -> f32 {
    0.004
}

fn default_zoom_epsilon() -> f32 {
    0.01
}

fn default_click_slop() -> f32 {
    10.0
}

fn default_tooltip_offset() -> f32 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingConfig {
    /// Ambient light brightness (Bevy units)
    #[serde(default = "default_ambient_brightness")]
    pub ambient_brightness: f32,
    /// Key light illuminance in lux
    #[serde(default = "default_key_illuminance")]
    pub key_illuminance: f32,
    /// Key light position relative to the camera
    #[serde(default = "default_light_offset")]
    pub light_offset: [f32; 3],
    #[serde(default = "default_true")]
    pub shadows: bool,
    /// Fill light positions; each shines toward the origin
    #[serde(default = "default_fill_positions")]
    pub fill_positions: Vec<[f32; 3]>,
    #[serde(default = "default_fill_illuminance")]
    pub fill_illuminance: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_brightness: default_ambient_brightness(),
            key_illuminance: default_key_illuminance(),
            light_offset: default_light_offset(),
            shadows: true,
            fill_positions: default_fill_positions(),
            fill_illuminance: default_fill_illuminance(),
        }
    }
}

fn default_ambient_brightness() -> f32 {
    400.0
}

fn default_key_illuminance() -> f32 {
    8000.0
}

fn default_light_offset() -> [f32; 3] {
    [5.0, 10.0, 5.0]
}

fn default_true() -> bool {
    true
}

fn default_fill_positions() -> Vec<[f32; 3]> {
    vec![[-5.0, 5.0, 0.0], [5.0, 5.0, 0.0]]
}

fn default_fill_illuminance() -> f32 {
    2400.0
}

/// Material overrides applied to every mesh of the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialConfig {
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_metalness")]
    pub metalness: f32,
    /// Emissive sRGB color of region meshes at rest
    #[serde(default = "default_idle_emissive")]
    pub idle_emissive: [f32; 3],
    /// Emissive sRGB color of the hovered region's meshes
    #[serde(default = "default_hover_emissive")]
    pub hover_emissive: [f32; 3],
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            roughness: default_roughness(),
            metalness: default_metalness(),
            idle_emissive: default_idle_emissive(),
            hover_emissive: default_hover_emissive(),
        }
    }
}

fn default_roughness() -> f32 {
    0.8
}

fn default_metalness() -> f32 {
    0.2
}

fn default_idle_emissive() -> [f32; 3] {
    let c = 0x22 as f32 / 255.0;
    [c, c, c]
}

fn default_hover_emissive() -> [f32; 3] {
    let c = 0x44 as f32 / 255.0;
    [c, c, c]
}

fn default_regions() -> Vec<RegionRule> {
    vec![
        RegionRule {
            role: RegionId::new("technology"),
            keywords: vec!["laptop".into(), "computer".into(), "screen".into()],
            target: "laptop.html".to_string(),
            tooltip: "Click to learn about technology and workspace".to_string(),
        },
        RegionRule {
            role: RegionId::new("nature"),
            keywords: vec!["grass".into(), "ground".into(), "floor".into()],
            target: "grass.html".to_string(),
            tooltip: "Click to explore nature and environment".to_string(),
        },
    ]
}

impl SceneConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it is missing
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            info!(path = %path.display(), "Loaded scene configuration");
            Ok(config)
        } else {
            info!(
                path = %path.display(),
                "Scene configuration not found, using defaults"
            );
            Ok(Self::default())
        }
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Reject values the controller cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.controls;
        for (name, value) in [
            ("controls.rotation_speed", c.rotation_speed),
            ("controls.damping", c.damping),
            ("controls.velocity_epsilon", c.velocity_epsilon),
            ("controls.pitch_limit", c.pitch_limit),
            ("controls.initial_zoom", c.initial_zoom),
            ("controls.min_zoom", c.min_zoom),
            ("controls.max_zoom", c.max_zoom),
            ("controls.zoom_speed", c.zoom_speed),
            ("controls.wheel_scale", c.wheel_scale),
            ("controls.zoom_epsilon", c.zoom_epsilon),
            ("controls.click_slop", c.click_slop),
            ("controls.tooltip_offset", c.tooltip_offset),
            ("model.fit_size", self.model.fit_size),
            ("camera.fov_degrees", self.camera.fov_degrees),
            ("camera.near", self.camera.near),
            ("camera.far", self.camera.far),
            ("camera.height", self.camera.height),
            ("lighting.ambient_brightness", self.lighting.ambient_brightness),
            ("lighting.key_illuminance", self.lighting.key_illuminance),
            ("lighting.fill_illuminance", self.lighting.fill_illuminance),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{} must be finite, got {}", name, value)));
            }
        }
        let vectors = [
            ("camera.look_at", &self.camera.look_at),
            ("camera.background", &self.camera.background),
            ("lighting.light_offset", &self.lighting.light_offset),
        ];
        for (name, v) in vectors.into_iter().chain(
            self.lighting.fill_positions.iter().map(|p| ("lighting.fill_positions", p)),
        ) {
            if v.iter().any(|x| !x.is_finite()) {
                return Err(ConfigError::Invalid(format!("{} must be finite, got {:?}", name, v)));
            }
        }

        for (name, value) in [
            ("controls.rotation_speed", c.rotation_speed),
            ("controls.velocity_epsilon", c.velocity_epsilon),
            ("controls.wheel_scale", c.wheel_scale),
            ("controls.zoom_epsilon", c.zoom_epsilon),
            ("model.fit_size", self.model.fit_size),
            ("camera.fov_degrees", self.camera.fov_degrees),
            ("camera.near", self.camera.near),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid("camera.far must be beyond camera.near".into()));
        }
        if !(c.min_zoom > 0.0 && c.min_zoom <= c.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] is empty or non-positive",
                c.min_zoom, c.max_zoom
            )));
        }
        if !(c.damping > 0.0 && c.damping < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "damping {} must be in (0, 1)",
                c.damping
            )));
        }
        if !(c.zoom_speed > 0.0 && c.zoom_speed <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "zoom_speed {} must be in (0, 1]",
                c.zoom_speed
            )));
        }
        if c.pitch_limit < 0.0 {
            return Err(ConfigError::Invalid("pitch_limit must not be negative".into()));
        }
        if c.click_slop < 0.0 {
            return Err(ConfigError::Invalid("click_slop must not be negative".into()));
        }

        let mut roles = HashSet::new();
        for rule in &self.regions {
            if !roles.insert(rule.role.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "region role '{}' is defined twice",
                    rule.role
                )));
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "region '{}' has no keywords",
                    rule.role
                )));
            }
        }
        Ok(())
    }
}
