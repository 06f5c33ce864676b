//! Native entry point; reads `vignette.toml` from the working directory

fn main() {
    vignette_web::run();
}
