//! Host page integration: URL parameters and navigation

use bevy::prelude::*;
use vignette_scene::NavigateTo;

pub struct PagePlugin;

impl Plugin for PagePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, navigate_browser);
    }
}

/// `?model=` from the page URL, if present and non-empty
#[cfg(target_arch = "wasm32")]
pub fn model_override() -> Option<String> {
    let href = web_sys::window()?.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    non_empty(url.search_params().get("model"))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn model_override() -> Option<String> {
    None
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn navigate_browser(mut requests: MessageReader<NavigateTo>) {
    // Only the latest request matters; the page unloads on navigation
    let Some(request) = requests.read().last() else { return };
    tracing::info!("Navigating to {} ({})", request.target, request.region);
    open_target(&request.target);
}

#[cfg(target_arch = "wasm32")]
fn open_target(target: &str) {
    let Some(window) = web_sys::window() else {
        tracing::warn!("No browser window, cannot open {}", target);
        return;
    };
    if let Err(err) = window.location().set_href(target) {
        tracing::error!("Failed to navigate to {}: {:?}", target, err);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_target(target: &str) {
    tracing::warn!("Navigation needs a browser; not opening {}", target);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(" scene.glb ".into())), Some("scene.glb".into()));
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(None), None);
    }
}
