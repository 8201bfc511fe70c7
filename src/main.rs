mod api;
mod app;
mod components;
mod logging;
mod pages;
mod state;

use app::App;

fn main() {
    logging::init();
    leptos::mount::mount_to_body(App);
}
