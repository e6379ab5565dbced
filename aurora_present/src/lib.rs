/*!
# Aurora Present

Presentation surface lifecycle for a real-time renderer.

This crate is the backend-agnostic core: it acquires displayable images from a
presentation engine, synchronizes rendering against display timing through a
single semaphore pair, and recreates the swap chain when the output surface
is resized or temporarily unusable (minimized). Backends (Vulkan, ...) plug in
through the `PresentBackend` trait.

## Architecture

- **Selection**: pure format / present mode / extent / image count choices
- **SwapChainManager**: the swap chain state machine (acquire, present, recreate)
- **FrameResources**: contract for per-image resources rebuilt on resize
- **Engine / log**: logging facade used by every crate of the workspace
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod swapchain;

// Main aurora namespace module
pub mod aurora {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only; the engine_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, LogCrateLogger};
    }

    // Presentation sub-module
    pub mod present {
        pub use crate::swapchain::*;
    }
}
