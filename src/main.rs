mod analyze;
mod app;
mod commands;
mod config;
mod display;
mod logging;
mod render;
mod view;

#[tokio::main]
async fn main() {
    let code = match app::run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };

    // A pending stdin read cannot be cancelled, so leave without waiting on the runtime.
    std::process::exit(code);
}
