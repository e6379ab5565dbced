/// Frame resources - per-image resources derived from the swap chain images
///
/// Image views, framebuffers and the like are owned outside the swap chain
/// manager and must be torn down and rebuilt in lockstep with recreation.

use crate::error::{Error, Result};
use crate::engine_error;
use super::backend::PresentBackend;
use super::swap_chain::SwapChainManager;
use super::types::CreateOutcome;

/// Owner of resources built on top of the swap chain image set
pub trait FrameResources<B: PresentBackend> {
    /// Release everything referencing the current swap chain images
    ///
    /// Called with the device idle. Must tolerate being called when nothing
    /// is built.
    fn release(&mut self);

    /// Build resources against the swap chain's current image set
    ///
    /// The image set may be unchanged (surface minimized) or empty (no swap
    /// chain yet).
    fn rebuild(&mut self, swap_chain: &SwapChainManager<B>) -> Result<()>;
}

/// Resize protocol: idle, release, recreate, rebuild
///
/// Release and rebuild always run, even when the recreation turned out to be
/// a no-op, so frame resources always match the live image set. If the
/// recreation fails, resources are rebuilt against the previous image set and
/// the recreation error is returned.
pub fn recreate_with_frame_resources<B, F>(
    swap_chain: &mut SwapChainManager<B>,
    resources: &mut F,
) -> Result<CreateOutcome>
where
    B: PresentBackend,
    F: FrameResources<B> + ?Sized,
{
    swap_chain.backend().wait_device_idle().map_err(|e| {
        engine_error!("aurora::SwapChain", "Failed to wait for device idle before resize: {}", e);
        Error::DeviceError(format!("Failed to wait for device idle: {}", e))
    })?;

    resources.release();
    let outcome = swap_chain.recreate();
    let rebuilt = resources.rebuild(swap_chain);

    let outcome = outcome?;
    rebuilt?;
    Ok(outcome)
}

#[cfg(test)]
#[path = "frame_resources_tests.rs"]
mod tests;
