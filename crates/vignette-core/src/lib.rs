//! Vignette Core - Engine-independent interaction logic
//!
//! This crate provides the pieces of the Vignette scene that do not depend
//! on a renderer:
//! - Interaction controller (drag rotation with inertia, eased zoom, region picking)
//! - Region role table mapping mesh names to clickable regions
//! - Scene configuration (TOML)
//! - Model fitting and load tracking

pub mod config;
pub mod controller;
pub mod fit;
pub mod load;
pub mod region;

pub use config::{ConfigError, ControlSettings, SceneConfig};
pub use controller::{
    Angles, CameraPose, HoverState, InteractionController, NavigationRequest, Ndc,
    PointerPosition, RegionHitTest,
};
pub use fit::{Bounds, FitTransform};
pub use load::{LoadError, LoadStatus, LoadTracker};
pub use region::{PickableRegion, RegionId, RegionRule, RoleTable};
