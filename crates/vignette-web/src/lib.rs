//! Vignette Web - browser entry point
//!
//! Runs the interactive model scene in a canvas and turns region clicks
//! into page navigation.

mod app;
mod page;

pub use app::run;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    app::run();
}
