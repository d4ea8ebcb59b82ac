use textured_scene::config::DemoConfig;
use textured_scene::demo_error::DemoResult;
use tracing::info;

pub fn main() -> DemoResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_target(false)
        .init();

    let config = DemoConfig::from_env();
    info!(warp = config.use_warp_device, "starting {}", config.window_title());
    run(config)
}

#[cfg(windows)]
fn run(config: DemoConfig) -> DemoResult<()> {
    textured_scene::app::run(config)
}

#[cfg(not(windows))]
fn run(_config: DemoConfig) -> DemoResult<()> {
    Err(eyre::eyre!("this demo renders with Direct3D 12 and only runs on Windows").into())
}
