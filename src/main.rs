use env_logger::{Builder, Env};
use vk_bootstrap::app;
use vk_bootstrap::config::BootstrapConfig;

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = BootstrapConfig::from_env();
    log::info!(
        "Starting {} (validation {})",
        config.app_name,
        if config.enable_validation { "on" } else { "off" }
    );

    if let Err(error) = app::run(config) {
        log::error!("{}", error);
        std::process::exit(1);
    }
}
