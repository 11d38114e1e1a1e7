pub mod environment;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use environment::{Fog, Skybox};
pub use error::{RenderError, SettingsError};
pub use settings::RenderSettings;

/// Installs the `env_logger` backend once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
