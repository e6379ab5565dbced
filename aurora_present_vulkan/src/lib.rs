/*!
# Aurora Present - Vulkan Backend

Vulkan implementation of the aurora_present presentation backend.

Provides the `VulkanContext` (instance, surface, device, queues) and a
`VulkanPresentBackend` that plugs into `SwapChainManager`, using the Ash
library for Vulkan bindings and ash-window for surface creation.
*/

mod vulkan_context;
mod vulkan_backend;
mod vulkan_format;
#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan_context::{ContextConfig, VulkanContext};
pub use vulkan_backend::VulkanPresentBackend;
pub use vulkan_format::{extent_to_vk, format_to_vk};

// Re-export debug utilities
#[cfg(feature = "vulkan-validation")]
pub use debug::{print_validation_stats_report, validation_stats, ValidationStats};

/// Aurora Vulkan namespace
///
/// ```no_run
/// use aurora_present::aurora::present::{SwapChainConfig, SwapChainManager};
/// use aurora_present_vulkan::aurora::{ContextConfig, VulkanContext, VulkanPresentBackend};
/// # fn run(window: std::sync::Arc<winit::window::Window>) -> aurora_present::aurora::Result<()> {
/// let context = VulkanContext::new(window.as_ref(), &ContextConfig::default())?;
/// let backend = VulkanPresentBackend::new(&context);
/// let swap_chain = SwapChainManager::new(backend, window, SwapChainConfig::default())?;
/// # drop(swap_chain);
/// # Ok(())
/// # }
/// ```
pub mod aurora {
    pub use crate::vulkan_context::{ContextConfig, VulkanContext};
    pub use crate::vulkan_backend::VulkanPresentBackend;
}
