//! Error types for the bootstrap.

use ash::vk;
use thiserror::Error;

/// Which capability query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Enumerate,
    Extensions,
    SurfaceSupport,
    Capabilities,
    Formats,
    PresentModes,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QueryKind::Enumerate => "device enumeration",
            QueryKind::Extensions => "device extensions",
            QueryKind::SurfaceSupport => "surface support",
            QueryKind::Capabilities => "surface capabilities",
            QueryKind::Formats => "surface formats",
            QueryKind::PresentModes => "present modes",
        };
        f.write_str(name)
    }
}

/// A single capability query that the driver refused to answer.
///
/// Kept separate from an empty answer so the selector can tell
/// "could not ask" apart from "device has no such capability".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} query failed: {result}")]
pub struct QueryError {
    pub kind: QueryKind,
    pub result: vk::Result,
}

impl QueryError {
    pub fn new(kind: QueryKind, result: vk::Result) -> Self {
        Self { kind, result }
    }
}

/// Fatal errors; any of these ends the run.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to load Vulkan: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),

    #[error("Couldn't find a physical device")]
    NoPhysicalDevices,

    #[error("No suitable Vulkan device found among {candidates} devices")]
    NoSuitableDevice { candidates: usize },

    #[error("Unable to find validation layer {0}")]
    MissingValidationLayer(String),

    #[error("Selected device reports no surface formats")]
    NoSurfaceFormat,

    #[error("Selected device lacks a graphics or present queue family")]
    IncompleteQueueFamilies,

    #[error("Capability query failed for the selected device: {0}")]
    Query(#[from] QueryError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Window handle unavailable: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    #[error("Invalid name: {0}")]
    Name(#[from] std::ffi::NulError),
}

/// Convenience type alias for Results with [`BootstrapError`]
pub type Result<T> = std::result::Result<T, BootstrapError>;
