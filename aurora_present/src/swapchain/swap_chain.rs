/// Swap chain manager - presentation state machine
///
/// Owns the swap chain handle, its (borrowed) image set, the single
/// image-available / render-finished semaphore pair and the current image
/// index. States: `Uninitialized -> Ready <-> Stale -> Destroyed`.
///
/// Exactly one image is in flight at a time, guarded by one semaphore pair.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_err, engine_error, engine_info, engine_trace, engine_warn};
use super::backend::{OutputWindow, PresentBackend};
use super::selection::{
    choose_image_count, choose_present_mode, choose_surface_format, resolve_extent, validate_extent,
};
use super::types::{
    AcquireResult, CompositeAlpha, CreateOutcome, Extent2D, FrameOutcome, PresentMode,
    PresentResult, SurfaceFormat, SwapChainConfig, SwapChainDesc, SwapChainStatus,
};

const SOURCE: &str = "aurora::SwapChain";

/// Live swap chain and everything derived from its creation
struct SwapChainState<B: PresentBackend> {
    handle: B::SwapChain,
    /// Owned by the presentation engine, never released individually
    images: Vec<B::Image>,
    surface_format: SurfaceFormat,
    present_mode: PresentMode,
    extent: Extent2D,
    current_image_index: u32,
}

/// Created once in `new`, destroyed once in `drop`
struct SyncPair<S> {
    image_available: S,
    render_finished: S,
}

/// Swap chain manager
///
/// # Example
///
/// ```no_run
/// # use aurora_present::aurora::{Result, present::*};
/// # fn frame<B: PresentBackend>(swap_chain: &mut SwapChainManager<B>) -> Result<()> {
/// if swap_chain.acquire()? == FrameOutcome::Skip {
///     return Ok(());
/// }
/// // record + submit work waiting on image_available_semaphore(),
/// // signalling render_finished_semaphore()
/// swap_chain.present()?;
/// # Ok(())
/// # }
/// ```
pub struct SwapChainManager<B: PresentBackend> {
    backend: B,
    window: Arc<dyn OutputWindow>,
    config: SwapChainConfig,
    state: Option<SwapChainState<B>>,
    sync: SyncPair<B::Semaphore>,
    status: SwapChainStatus,
}

impl<B: PresentBackend> SwapChainManager<B> {
    /// Create the semaphore pair, then the first swap chain
    ///
    /// A minimized surface is not an error: the manager starts `Stale`
    /// without a swap chain and `acquire` reports `Skip` until `recreate`
    /// succeeds.
    pub fn new(backend: B, window: Arc<dyn OutputWindow>, config: SwapChainConfig) -> Result<Self> {
        let image_available = backend.create_semaphore().map_err(|e| {
            engine_error!(SOURCE, "Failed to create image-available semaphore: {}", e);
            Error::InitializationFailed(format!("Failed to create semaphore: {}", e))
        })?;

        let render_finished = match backend.create_semaphore() {
            Ok(semaphore) => semaphore,
            Err(e) => {
                backend.destroy_semaphore(image_available);
                engine_error!(SOURCE, "Failed to create render-finished semaphore: {}", e);
                return Err(Error::InitializationFailed(format!("Failed to create semaphore: {}", e)));
            }
        };

        let mut manager = Self {
            backend,
            window,
            config,
            state: None,
            sync: SyncPair { image_available, render_finished },
            status: SwapChainStatus::Uninitialized,
        };

        // On failure `manager` is dropped here, releasing the semaphores
        manager.create()?;

        Ok(manager)
    }

    /// Build a swap chain from freshly queried capabilities
    ///
    /// The current swap chain (if any) is passed as reuse hint and destroyed
    /// only after the replacement is installed. On any failure the current
    /// state is left untouched.
    fn create(&mut self) -> Result<CreateOutcome> {
        let capabilities = self.backend.surface_capabilities()?;

        if capabilities.is_minimized() {
            engine_debug!(SOURCE, "Surface minimized, keeping current swap chain");
            self.status = SwapChainStatus::Stale;
            return Ok(CreateOutcome::Skipped);
        }

        let surface_format = choose_surface_format(&self.backend.surface_formats()?);
        let present_mode = choose_present_mode(&self.backend.present_modes()?);
        let extent = resolve_extent(&capabilities, self.window.client_size());

        if let Err(e) = validate_extent(extent, &capabilities) {
            engine_error!(SOURCE, "{}", e);
            return Err(e);
        }

        let desc = SwapChainDesc {
            min_image_count: choose_image_count(&capabilities, self.config.requested_image_count),
            surface_format,
            extent,
            image_array_layers: 1,
            image_usage: self.config.image_usage,
            sharing_mode: self.backend.queue_families().sharing_mode(),
            pre_transform: capabilities.current_transform,
            composite_alpha: CompositeAlpha::OPAQUE,
            present_mode,
            clipped: true,
        };

        let old = self.state.as_ref().map(|state| state.handle);
        let handle = self.backend.create_swap_chain(&desc, old)?;

        let images = match self.backend.swap_chain_images(handle) {
            Ok(images) if !images.is_empty() => images,
            Ok(_) => {
                self.backend.destroy_swap_chain(handle);
                return Err(engine_err!(SOURCE, "Swap chain was created without images"));
            }
            Err(e) => {
                self.backend.destroy_swap_chain(handle);
                return Err(e);
            }
        };

        engine_info!(SOURCE,
            "Swap chain created: {}x{}, {} images (requested {}), {:?}, {:?}",
            extent.width, extent.height, images.len(), desc.min_image_count,
            surface_format.format, present_mode);

        self.state = Some(SwapChainState {
            handle,
            images,
            surface_format,
            present_mode,
            extent,
            current_image_index: 0,
        });
        self.status = SwapChainStatus::Ready;

        if let Some(old) = old {
            self.backend.destroy_swap_chain(old);
        }

        Ok(CreateOutcome::Created)
    }

    /// Rebuild the swap chain against the current surface
    ///
    /// The live swap chain stays usable until its replacement is installed,
    /// and is kept as is when the surface is minimized. No outstanding GPU
    /// work may reference the current images.
    pub fn recreate(&mut self) -> Result<CreateOutcome> {
        if self.status == SwapChainStatus::Destroyed {
            engine_warn!(SOURCE, "recreate() called after destroy()");
            return Err(Error::InvalidResource("Swap chain already destroyed".to_string()));
        }
        self.create()
    }

    /// Acquire the next presentable image
    ///
    /// Blocks with no timeout. `Skip` when there is no swap chain, or when the
    /// surface was out of date (the swap chain has then been recreated).
    pub fn acquire(&mut self) -> Result<FrameOutcome> {
        let handle = match &self.state {
            Some(state) => state.handle,
            None => return Ok(FrameOutcome::Skip),
        };

        if self.config.validation_sync {
            self.backend.wait_present_queue_idle().map_err(|e| {
                engine_error!(SOURCE, "Failed to wait for present queue: {}", e);
                Error::DeviceError(format!("Failed to wait for present queue: {}", e))
            })?;
        }

        let index = match self.backend.acquire_next_image(handle, self.sync.image_available) {
            AcquireResult::Success(index) => index,
            AcquireResult::Suboptimal(index) => {
                engine_trace!(SOURCE, "Acquired image {} from a suboptimal swap chain", index);
                index
            }
            AcquireResult::OutOfDate => {
                engine_debug!(SOURCE, "Swap chain out of date during acquire");
                self.rebuild_after_invalidation()?;
                return Ok(FrameOutcome::Skip);
            }
            AcquireResult::Failed(reason) => {
                engine_error!(SOURCE, "Failed to acquire swap chain image: {}", reason);
                return Err(Error::DeviceError(format!("Failed to acquire swap chain image: {}", reason)));
            }
        };

        let state = self.state.as_mut().ok_or_else(|| {
            Error::InvalidResource("Swap chain vanished during acquire".to_string())
        })?;

        if index as usize >= state.images.len() {
            engine_error!(SOURCE, "Acquired image index {} out of range (count: {})",
                index, state.images.len());
            return Err(Error::DeviceError(format!(
                "Acquired image index {} out of range (count: {})", index, state.images.len()
            )));
        }

        state.current_image_index = index;
        Ok(FrameOutcome::Proceed)
    }

    /// Present the current image once rendering has signalled `render_finished`
    ///
    /// Out-of-date and suboptimal results rebuild the swap chain and report `Skip`.
    pub fn present(&mut self) -> Result<FrameOutcome> {
        let (handle, index) = match &self.state {
            Some(state) => (state.handle, state.current_image_index),
            None => return Ok(FrameOutcome::Skip),
        };

        match self.backend.queue_present(handle, index, self.sync.render_finished) {
            PresentResult::Success => Ok(FrameOutcome::Proceed),
            PresentResult::OutOfDate | PresentResult::Suboptimal => {
                engine_debug!(SOURCE, "Swap chain out of date or suboptimal during present");
                self.rebuild_after_invalidation()?;
                Ok(FrameOutcome::Skip)
            }
            PresentResult::Failed(reason) => {
                engine_error!(SOURCE, "Failed to present swap chain image: {}", reason);
                Err(Error::DeviceError(format!("Failed to present swap chain image: {}", reason)))
            }
        }
    }

    fn rebuild_after_invalidation(&mut self) -> Result<CreateOutcome> {
        self.backend.wait_device_idle().map_err(|e| {
            engine_error!(SOURCE, "Failed to wait for device idle: {}", e);
            Error::DeviceError(format!("Failed to wait for device idle: {}", e))
        })?;
        self.recreate()
    }

    /// Release the swap chain; safe to call more than once
    ///
    /// The semaphore pair survives until the manager is dropped.
    pub fn destroy(&mut self) {
        if let Some(state) = self.state.take() {
            self.backend.destroy_swap_chain(state.handle);
            engine_debug!(SOURCE, "Swap chain destroyed");
        }
        self.status = SwapChainStatus::Destroyed;
    }

    // ===== QUERIES =====

    pub fn status(&self) -> SwapChainStatus {
        self.status
    }

    /// Whether a swap chain is installed
    pub fn is_valid(&self) -> bool {
        self.state.is_some()
    }

    pub fn handle(&self) -> Option<B::SwapChain> {
        self.state.as_ref().map(|state| state.handle)
    }

    pub fn surface_format(&self) -> Option<SurfaceFormat> {
        self.state.as_ref().map(|state| state.surface_format)
    }

    pub fn present_mode(&self) -> Option<PresentMode> {
        self.state.as_ref().map(|state| state.present_mode)
    }

    /// Current extent, `Extent2D::ZERO` without a swap chain
    pub fn extent(&self) -> Extent2D {
        self.state.as_ref().map_or(Extent2D::ZERO, |state| state.extent)
    }

    pub fn image_count(&self) -> u32 {
        self.state.as_ref().map_or(0, |state| state.images.len() as u32)
    }

    pub fn image(&self, index: u32) -> Option<B::Image> {
        self.state.as_ref().and_then(|state| state.images.get(index as usize).copied())
    }

    pub fn images(&self) -> &[B::Image] {
        self.state.as_ref().map_or(&[][..], |state| state.images.as_slice())
    }

    /// Index of the image acquired for the current frame
    pub fn current_image_index(&self) -> u32 {
        self.state.as_ref().map_or(0, |state| state.current_image_index)
    }

    /// Semaphore to wait on before writing the acquired image
    pub fn image_available_semaphore(&self) -> B::Semaphore {
        self.sync.image_available
    }

    /// Semaphore to signal when rendering is done, waited on by `present`
    pub fn render_finished_semaphore(&self) -> B::Semaphore {
        self.sync.render_finished
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SwapChainConfig {
        &self.config
    }
}

impl<B: PresentBackend> Drop for SwapChainManager<B> {
    fn drop(&mut self) {
        self.destroy();
        self.backend.destroy_semaphore(self.sync.image_available);
        self.backend.destroy_semaphore(self.sync.render_finished);
    }
}

#[cfg(test)]
#[path = "swap_chain_tests.rs"]
mod tests;
