/// Backend and window traits consumed by the swap chain manager
///
/// A backend wraps one device/surface pair. All handle types are plain
/// `Copy` values: the manager never frees an image handle, it only drops the
/// whole set when the swap chain is replaced or destroyed.

use std::fmt::Debug;

use crate::error::Result;
use super::types::{
    AcquireResult, PresentMode, PresentResult, QueueFamilies, SurfaceCapabilities,
    SurfaceFormat, SwapChainDesc,
};

/// Presentation backend (Vulkan, mock, ...)
pub trait PresentBackend: Send + Sync {
    /// Swap chain handle
    type SwapChain: Copy + PartialEq + Debug;
    /// Non-owning swap chain image handle
    type Image: Copy + PartialEq + Debug;
    /// Binary semaphore handle
    type Semaphore: Copy + PartialEq + Debug;

    // ===== SURFACE QUERIES =====

    /// Current surface limits (changes across resizes)
    fn surface_capabilities(&self) -> Result<SurfaceCapabilities>;

    /// Supported format / color space pairs
    fn surface_formats(&self) -> Result<Vec<SurfaceFormat>>;

    /// Supported present modes
    fn present_modes(&self) -> Result<Vec<PresentMode>>;

    /// Graphics and present queue families
    fn queue_families(&self) -> QueueFamilies;

    // ===== SWAP CHAIN =====

    /// Create a swap chain, passing `old` as a resource-reuse hint
    ///
    /// Must not destroy `old`: the caller does that once the new swap chain
    /// is installed.
    fn create_swap_chain(
        &self,
        desc: &SwapChainDesc,
        old: Option<Self::SwapChain>,
    ) -> Result<Self::SwapChain>;

    /// Images owned by the presentation engine for `swap_chain`
    fn swap_chain_images(&self, swap_chain: Self::SwapChain) -> Result<Vec<Self::Image>>;

    fn destroy_swap_chain(&self, swap_chain: Self::SwapChain);

    /// Request the next image, blocking with no timeout, signalling `signal`
    fn acquire_next_image(
        &self,
        swap_chain: Self::SwapChain,
        signal: Self::Semaphore,
    ) -> AcquireResult;

    /// Queue `image_index` for display once `wait` is signalled
    fn queue_present(
        &self,
        swap_chain: Self::SwapChain,
        image_index: u32,
        wait: Self::Semaphore,
    ) -> PresentResult;

    // ===== SYNCHRONIZATION =====

    fn wait_device_idle(&self) -> Result<()>;

    fn wait_present_queue_idle(&self) -> Result<()>;

    fn create_semaphore(&self) -> Result<Self::Semaphore>;

    fn destroy_semaphore(&self, semaphore: Self::Semaphore);
}

/// Output window as seen by the swap chain core
pub trait OutputWindow: Send + Sync {
    /// Current client-area size in physical pixels
    ///
    /// Non-positive components mean the window cannot be presented to right now.
    fn client_size(&self) -> (i32, i32);
}

impl OutputWindow for winit::window::Window {
    fn client_size(&self) -> (i32, i32) {
        let size = self.inner_size();
        (
            i32::try_from(size.width).unwrap_or(i32::MAX),
            i32::try_from(size.height).unwrap_or(i32::MAX),
        )
    }
}
