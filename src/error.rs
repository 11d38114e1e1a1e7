use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the device-facing parts of the renderer.
///
/// Scene-construction mistakes (no camera, no light in lit mode, missing
/// shader program) are not represented here; those are asserted on.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("shadow map size must be non-zero (got {width}x{height})")]
    InvalidShadowMapSize { width: u32, height: u32 },

    #[error("failed to allocate {width}x{height} depth framebuffer: {reason}")]
    FramebufferAllocation {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("failed to create shader program '{name}': {reason}")]
    ProgramCreation { name: String, reason: String },
}

/// Why a settings file could not be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read render settings {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse render settings {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
