mod app;
mod budget;
mod canvas;
mod config;
mod constants;
mod debounce;
mod error;
mod game_loop;
mod graphics;
mod host;
mod logger;
mod particles;
mod renderer;
mod rng;
mod rockets;
mod scene;
mod scene_graph;
mod shapes;

fn main() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
    leptos::mount::mount_to_body(app::App);
}
