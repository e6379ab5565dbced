/// Mock presentation backend for unit tests (no GPU required)
///
/// Records every call and lets tests script surface capabilities, failures
/// and acquire/present results.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use super::backend::{OutputWindow, PresentBackend};
use super::types::{
    AcquireResult, CompositeAlpha, Extent2D, PresentMode, PresentResult, QueueFamilies,
    SurfaceCapabilities, SurfaceFormat, SurfaceTransform, SwapChainDesc,
};

// ============================================================================
// Mock state
// ============================================================================

#[derive(Debug)]
pub struct MockState {
    pub capabilities: SurfaceCapabilities,
    pub formats: Vec<SurfaceFormat>,
    pub present_modes: Vec<PresentMode>,
    pub queue_families: QueueFamilies,

    /// Scripted results, consumed front first; empty means success
    pub acquire_results: VecDeque<AcquireResult>,
    pub present_results: VecDeque<PresentResult>,

    pub fail_create: bool,
    pub fail_images: bool,
    pub empty_images: bool,
    pub fail_semaphore_after: Option<u32>,
    pub fail_device_idle: bool,

    pub next_handle: u64,
    pub image_counts: HashMap<u64, u32>,
    pub live_swap_chains: Vec<u64>,
    pub destroyed_swap_chains: Vec<u64>,
    pub created: Vec<(SwapChainDesc, Option<u64>)>,
    pub live_semaphores: Vec<u64>,
    pub destroyed_semaphores: Vec<u64>,

    pub capability_queries: u32,
    pub device_idle_waits: u32,
    pub present_queue_idle_waits: u32,
    pub acquires: Vec<(u64, u64)>,
    pub presents: Vec<(u64, u32, u64)>,
    pub acquire_cursor: u32,
    /// Ordered destruction events ("swap_chain:N", "semaphore:N")
    pub destruction_order: Vec<String>,
}

pub fn default_capabilities() -> SurfaceCapabilities {
    SurfaceCapabilities {
        min_image_count: 2,
        max_image_count: 8,
        current_extent: Extent2D::new(800, 600),
        min_image_extent: Extent2D::new(1, 1),
        max_image_extent: Extent2D::new(4096, 4096),
        current_transform: SurfaceTransform::IDENTITY,
        supported_transforms: SurfaceTransform::IDENTITY | SurfaceTransform::ROTATE_90,
        supported_composite_alpha: CompositeAlpha::OPAQUE,
    }
}

pub fn minimized_capabilities() -> SurfaceCapabilities {
    SurfaceCapabilities {
        current_extent: Extent2D::ZERO,
        min_image_extent: Extent2D::ZERO,
        max_image_extent: Extent2D::ZERO,
        ..default_capabilities()
    }
}

// ============================================================================
// Mock backend
// ============================================================================

pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_capabilities(default_capabilities())
    }

    pub fn with_capabilities(capabilities: SurfaceCapabilities) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                capabilities,
                formats: vec![SurfaceFormat::PREFERRED],
                present_modes: vec![PresentMode::Fifo],
                queue_families: QueueFamilies { graphics: 0, present: 0 },
                acquire_results: VecDeque::new(),
                present_results: VecDeque::new(),
                fail_create: false,
                fail_images: false,
                empty_images: false,
                fail_semaphore_after: None,
                fail_device_idle: false,
                next_handle: 1,
                image_counts: HashMap::new(),
                live_swap_chains: Vec::new(),
                destroyed_swap_chains: Vec::new(),
                created: Vec::new(),
                live_semaphores: Vec::new(),
                destroyed_semaphores: Vec::new(),
                capability_queries: 0,
                device_idle_waits: 0,
                present_queue_idle_waits: 0,
                acquires: Vec::new(),
                presents: Vec::new(),
                acquire_cursor: 0,
                destruction_order: Vec::new(),
            })),
        }
    }

    /// Inspect or tweak the mock state
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Shared handle on the state, still readable after the backend is dropped
    pub fn shared_state(&self) -> Arc<Mutex<MockState>> {
        self.state.clone()
    }

    fn alloc_handle(state: &mut MockState) -> u64 {
        let handle = state.next_handle;
        state.next_handle += 1;
        handle
    }
}

impl PresentBackend for MockBackend {
    type SwapChain = u64;
    type Image = u64;
    type Semaphore = u64;

    fn surface_capabilities(&self) -> Result<SurfaceCapabilities> {
        let mut state = self.state();
        state.capability_queries += 1;
        Ok(state.capabilities)
    }

    fn surface_formats(&self) -> Result<Vec<SurfaceFormat>> {
        Ok(self.state().formats.clone())
    }

    fn present_modes(&self) -> Result<Vec<PresentMode>> {
        Ok(self.state().present_modes.clone())
    }

    fn queue_families(&self) -> QueueFamilies {
        self.state().queue_families
    }

    fn create_swap_chain(&self, desc: &SwapChainDesc, old: Option<u64>) -> Result<u64> {
        let mut state = self.state();
        if state.fail_create {
            return Err(Error::BackendError("mock create_swap_chain failure".to_string()));
        }
        let handle = Self::alloc_handle(&mut state);
        state.image_counts.insert(handle, desc.min_image_count);
        state.live_swap_chains.push(handle);
        state.created.push((*desc, old));
        Ok(handle)
    }

    fn swap_chain_images(&self, swap_chain: u64) -> Result<Vec<u64>> {
        let state = self.state();
        if state.fail_images {
            return Err(Error::BackendError("mock swap_chain_images failure".to_string()));
        }
        if state.empty_images {
            return Ok(Vec::new());
        }
        let count = state.image_counts.get(&swap_chain).copied().unwrap_or(0);
        Ok((0..count as u64).map(|i| swap_chain * 100 + i).collect())
    }

    fn destroy_swap_chain(&self, swap_chain: u64) {
        let mut state = self.state();
        state.live_swap_chains.retain(|&h| h != swap_chain);
        state.destroyed_swap_chains.push(swap_chain);
        state.destruction_order.push(format!("swap_chain:{}", swap_chain));
    }

    fn acquire_next_image(&self, swap_chain: u64, signal: u64) -> AcquireResult {
        let mut state = self.state();
        state.acquires.push((swap_chain, signal));
        if let Some(result) = state.acquire_results.pop_front() {
            return result;
        }
        let count = state.image_counts.get(&swap_chain).copied().unwrap_or(1).max(1);
        let index = state.acquire_cursor % count;
        state.acquire_cursor += 1;
        AcquireResult::Success(index)
    }

    fn queue_present(&self, swap_chain: u64, image_index: u32, wait: u64) -> PresentResult {
        let mut state = self.state();
        state.presents.push((swap_chain, image_index, wait));
        state.present_results.pop_front().unwrap_or(PresentResult::Success)
    }

    fn wait_device_idle(&self) -> Result<()> {
        let mut state = self.state();
        if state.fail_device_idle {
            return Err(Error::BackendError("mock device lost".to_string()));
        }
        state.device_idle_waits += 1;
        Ok(())
    }

    fn wait_present_queue_idle(&self) -> Result<()> {
        self.state().present_queue_idle_waits += 1;
        Ok(())
    }

    fn create_semaphore(&self) -> Result<u64> {
        let mut state = self.state();
        if let Some(remaining) = state.fail_semaphore_after {
            if remaining == 0 {
                return Err(Error::BackendError("mock semaphore failure".to_string()));
            }
            state.fail_semaphore_after = Some(remaining - 1);
        }
        let handle = Self::alloc_handle(&mut state) + 10_000;
        state.live_semaphores.push(handle);
        Ok(handle)
    }

    fn destroy_semaphore(&self, semaphore: u64) {
        let mut state = self.state();
        state.live_semaphores.retain(|&s| s != semaphore);
        state.destroyed_semaphores.push(semaphore);
        state.destruction_order.push(format!("semaphore:{}", semaphore));
    }
}

// ============================================================================
// Mock window
// ============================================================================

pub struct MockWindow {
    size: Mutex<(i32, i32)>,
}

impl MockWindow {
    pub fn new(width: i32, height: i32) -> Self {
        Self { size: Mutex::new((width, height)) }
    }

    pub fn set_size(&self, width: i32, height: i32) {
        *self.size.lock().unwrap() = (width, height);
    }
}

impl OutputWindow for MockWindow {
    fn client_size(&self) -> (i32, i32) {
        *self.size.lock().unwrap()
    }
}
