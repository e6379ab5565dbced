//! Unit tests for SwapChainManager
//!
//! All tests run against MockBackend / MockWindow (no GPU required).

use std::sync::Arc;

use crate::error::Error;
use crate::swapchain::mock_backend::{
    default_capabilities, minimized_capabilities, MockBackend, MockWindow,
};
use crate::swapchain::{
    AcquireResult, ColorSpace, CompositeAlpha, CreateOutcome, Extent2D, Format, FrameOutcome,
    ImageUsage, OutputWindow, PresentMode, PresentResult, QueueFamilies, SharingMode,
    SurfaceFormat, SurfaceTransform, SwapChainConfig, SwapChainManager,
    SwapChainStatus,
};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn setup_full(
    backend: MockBackend,
    window: (i32, i32),
    config: SwapChainConfig,
) -> (SwapChainManager<MockBackend>, Arc<MockWindow>) {
    let window = Arc::new(MockWindow::new(window.0, window.1));
    let output: Arc<dyn OutputWindow> = window.clone();
    let manager = SwapChainManager::new(backend, output, config).unwrap();
    (manager, window)
}

fn setup() -> SwapChainManager<MockBackend> {
    setup_full(MockBackend::new(), (800, 600), SwapChainConfig::default()).0
}

fn config_with_count(requested_image_count: u32) -> SwapChainConfig {
    SwapChainConfig { requested_image_count, ..SwapChainConfig::default() }
}

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn test_new_creates_ready_swap_chain() {
    let manager = setup();

    assert_eq!(manager.status(), SwapChainStatus::Ready);
    assert!(manager.is_valid());
    assert_eq!(manager.extent(), Extent2D::new(800, 600));
    assert_eq!(manager.image_count(), 3);
    assert_eq!(manager.current_image_index(), 0);
    assert_eq!(manager.surface_format(), Some(SurfaceFormat::PREFERRED));
    assert_eq!(manager.present_mode(), Some(PresentMode::Fifo));

    let handle = manager.handle().unwrap();
    assert_eq!(manager.images().len(), 3);
    assert_eq!(manager.image(0), Some(handle * 100));
    assert_eq!(manager.image(2), Some(handle * 100 + 2));
    assert_eq!(manager.image(3), None);

    let state = manager.backend().state();
    assert_eq!(state.live_semaphores.len(), 2);
    assert_eq!(state.created.len(), 1);
    assert_eq!(state.created[0].1, None);
}

#[test]
fn test_creation_parameters() {
    let mut caps = default_capabilities();
    caps.current_transform = SurfaceTransform::ROTATE_90;
    let backend = MockBackend::with_capabilities(caps);
    {
        let mut state = backend.state();
        state.present_modes = vec![PresentMode::Fifo, PresentMode::Immediate, PresentMode::Mailbox];
        state.formats = vec![
            SurfaceFormat::new(Format::R8G8B8A8_SRGB, ColorSpace::SrgbNonlinear),
            SurfaceFormat::PREFERRED,
        ];
    }
    let config = SwapChainConfig {
        requested_image_count: 4,
        image_usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_DST,
        validation_sync: false,
    };
    let (manager, _window) = setup_full(backend, (800, 600), config);

    let state = manager.backend().state();
    let (desc, old) = state.created[0];
    assert_eq!(old, None);
    assert_eq!(desc.min_image_count, 4);
    assert_eq!(desc.surface_format, SurfaceFormat::PREFERRED);
    assert_eq!(desc.extent, Extent2D::new(800, 600));
    assert_eq!(desc.image_array_layers, 1);
    assert_eq!(desc.image_usage, ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_DST);
    assert_eq!(desc.sharing_mode, SharingMode::Exclusive);
    assert_eq!(desc.pre_transform, SurfaceTransform::ROTATE_90);
    assert_eq!(desc.composite_alpha, CompositeAlpha::OPAQUE);
    assert_eq!(desc.present_mode, PresentMode::Mailbox);
    assert!(desc.clipped);
}

#[test]
fn test_concurrent_sharing_when_queue_families_differ() {
    let backend = MockBackend::new();
    backend.state().queue_families = QueueFamilies { graphics: 0, present: 2 };
    let (manager, _window) = setup_full(backend, (800, 600), SwapChainConfig::default());

    assert_eq!(
        manager.backend().state().created[0].0.sharing_mode,
        SharingMode::Concurrent { graphics_family: 0, present_family: 2 }
    );
}

#[test]
fn test_image_count_bounded_surface() {
    for (min, max) in [(1u32, 3u32), (2, 3), (2, 8), (3, 4)] {
        for requested in 0..10u32 {
            let mut caps = default_capabilities();
            caps.min_image_count = min;
            caps.max_image_count = max;
            let (manager, _w) = setup_full(
                MockBackend::with_capabilities(caps),
                (800, 600),
                config_with_count(requested),
            );
            assert_eq!(
                manager.image_count(),
                requested.max(min + 1).clamp(min, max),
                "requested={} min={} max={}", requested, min, max
            );
        }
    }
}

#[test]
fn test_image_count_unbounded_surface() {
    for min in [1u32, 2, 3] {
        for requested in [0u32, 2, 5, 16] {
            let mut caps = default_capabilities();
            caps.min_image_count = min;
            caps.max_image_count = 0;
            let (manager, _w) = setup_full(
                MockBackend::with_capabilities(caps),
                (800, 600),
                config_with_count(requested),
            );
            assert_eq!(manager.image_count(), requested.max(min + 1));
        }
    }
}

#[test]
fn test_extent_from_window_when_surface_defers() {
    let mut caps = default_capabilities();
    caps.current_extent = Extent2D::UNDEFINED;
    caps.min_image_extent = Extent2D::new(100, 100);
    caps.max_image_extent = Extent2D::new(1920, 1080);
    let (mut manager, window) = setup_full(
        MockBackend::with_capabilities(caps),
        (2000, 2000),
        SwapChainConfig::default(),
    );
    assert_eq!(manager.extent(), Extent2D::new(1920, 1080));

    window.set_size(1280, 720);
    assert_eq!(manager.recreate().unwrap(), CreateOutcome::Created);
    assert_eq!(manager.extent(), Extent2D::new(1280, 720));
}

#[test]
fn test_degenerate_extent_is_configuration_error() {
    let mut caps = default_capabilities();
    caps.current_extent = Extent2D::UNDEFINED;
    let backend = MockBackend::with_capabilities(caps);
    let shared = backend.shared_state();
    let window: Arc<dyn OutputWindow> = Arc::new(MockWindow::new(0, 100));

    let result = SwapChainManager::new(backend, window, SwapChainConfig::default());

    assert!(matches!(result, Err(Error::ConfigurationError(_))));
    let state = shared.lock().unwrap();
    assert!(state.created.is_empty());
    assert!(state.live_semaphores.is_empty(), "semaphores leaked");
    assert_eq!(state.destroyed_semaphores.len(), 2);
}

#[test]
fn test_out_of_bounds_extent_is_configuration_error() {
    let mut caps = default_capabilities();
    caps.current_extent = Extent2D::new(5000, 600);
    let backend = MockBackend::with_capabilities(caps);
    let window: Arc<dyn OutputWindow> = Arc::new(MockWindow::new(800, 600));

    let result = SwapChainManager::new(backend, window, SwapChainConfig::default());
    assert!(matches!(result, Err(Error::ConfigurationError(_))));
}

#[test]
fn test_semaphore_failure_is_initialization_error() {
    for fail_after in [0u32, 1] {
        let backend = MockBackend::new();
        backend.state().fail_semaphore_after = Some(fail_after);
        let shared = backend.shared_state();
        let window: Arc<dyn OutputWindow> = Arc::new(MockWindow::new(800, 600));

        let result = SwapChainManager::new(backend, window, SwapChainConfig::default());

        assert!(matches!(result, Err(Error::InitializationFailed(_))));
        let state = shared.lock().unwrap();
        assert!(state.live_semaphores.is_empty());
        assert!(state.created.is_empty());
    }
}

// ============================================================================
// MINIMIZED SURFACE
// ============================================================================

#[test]
fn test_recreate_while_minimized_keeps_everything() {
    let mut manager = setup();
    let handle = manager.handle();
    let images = manager.images().to_vec();
    let extent = manager.extent();
    let format = manager.surface_format();

    manager.backend().state().capabilities = minimized_capabilities();

    for _ in 0..3 {
        assert_eq!(manager.recreate().unwrap(), CreateOutcome::Skipped);
    }

    assert_eq!(manager.status(), SwapChainStatus::Stale);
    assert_eq!(manager.handle(), handle);
    assert_eq!(manager.images(), images.as_slice());
    assert_eq!(manager.extent(), extent);
    assert_eq!(manager.surface_format(), format);

    let state = manager.backend().state();
    assert!(state.destroyed_swap_chains.is_empty());
    assert_eq!(state.created.len(), 1);
}

#[test]
fn test_stale_swap_chain_remains_usable() {
    let mut manager = setup();
    manager.backend().state().capabilities = minimized_capabilities();
    manager.recreate().unwrap();

    assert_eq!(manager.acquire().unwrap(), FrameOutcome::Proceed);
    assert_eq!(manager.present().unwrap(), FrameOutcome::Proceed);
}

#[test]
fn test_start_minimized_then_restore() {
    let (mut manager, _w) = setup_full(
        MockBackend::with_capabilities(minimized_capabilities()),
        (0, 0),
        SwapChainConfig::default(),
    );

    assert_eq!(manager.status(), SwapChainStatus::Stale);
    assert!(!manager.is_valid());
    assert_eq!(manager.image_count(), 0);
    assert_eq!(manager.extent(), Extent2D::ZERO);
    assert_eq!(manager.acquire().unwrap(), FrameOutcome::Skip);
    assert_eq!(manager.present().unwrap(), FrameOutcome::Skip);
    assert!(manager.backend().state().acquires.is_empty());

    manager.backend().state().capabilities = default_capabilities();
    assert_eq!(manager.recreate().unwrap(), CreateOutcome::Created);
    assert_eq!(manager.status(), SwapChainStatus::Ready);
    assert_eq!(manager.backend().state().created[0].1, None);
}

// ============================================================================
// RECREATION
// ============================================================================

#[test]
fn test_recreate_replaces_then_destroys_old() {
    let mut manager = setup();
    let old = manager.handle().unwrap();
    manager.acquire().unwrap();
    manager.acquire().unwrap();
    assert_eq!(manager.current_image_index(), 1);

    manager.backend().state().capabilities.current_extent = Extent2D::new(1024, 768);
    assert_eq!(manager.recreate().unwrap(), CreateOutcome::Created);

    let new = manager.handle().unwrap();
    assert_ne!(new, old);
    assert_eq!(manager.extent(), Extent2D::new(1024, 768));
    assert_eq!(manager.current_image_index(), 0);
    assert_eq!(manager.image(0), Some(new * 100));

    let state = manager.backend().state();
    assert_eq!(state.created[1].1, Some(old));
    assert_eq!(state.destroyed_swap_chains, vec![old]);
    assert_eq!(state.live_swap_chains, vec![new]);
}

#[test]
fn test_semaphores_survive_recreation() {
    let mut manager = setup();
    let available = manager.image_available_semaphore();
    let finished = manager.render_finished_semaphore();
    assert_ne!(available, finished);

    manager.recreate().unwrap();
    manager.recreate().unwrap();

    assert_eq!(manager.image_available_semaphore(), available);
    assert_eq!(manager.render_finished_semaphore(), finished);
    let state = manager.backend().state();
    assert_eq!(state.live_semaphores.len(), 2);
    assert!(state.destroyed_semaphores.is_empty());
}

#[test]
fn test_create_failure_leaves_state_untouched() {
    let mut manager = setup();
    let handle = manager.handle();
    let images = manager.images().to_vec();
    let extent = manager.extent();

    manager.backend().state().capabilities.current_extent = Extent2D::new(1024, 768);
    manager.backend().state().fail_create = true;

    assert!(manager.recreate().is_err());
    assert_eq!(manager.handle(), handle);
    assert_eq!(manager.images(), images.as_slice());
    assert_eq!(manager.extent(), extent);
    assert_eq!(manager.status(), SwapChainStatus::Ready);
    assert!(manager.backend().state().destroyed_swap_chains.is_empty());
}

#[test]
fn test_image_query_failure_destroys_only_new_swap_chain() {
    let mut manager = setup();
    let old = manager.handle().unwrap();
    let images = manager.images().to_vec();

    manager.backend().state().fail_images = true;
    assert!(manager.recreate().is_err());

    assert_eq!(manager.handle(), Some(old));
    assert_eq!(manager.images(), images.as_slice());
    let state = manager.backend().state();
    assert_eq!(state.created.len(), 2);
    assert_eq!(state.live_swap_chains, vec![old]);
    assert_eq!(state.destroyed_swap_chains.len(), 1);
    assert_ne!(state.destroyed_swap_chains[0], old);
}

#[test]
fn test_empty_image_set_is_rejected() {
    let mut manager = setup();
    let old = manager.handle().unwrap();

    manager.backend().state().empty_images = true;
    assert!(matches!(manager.recreate(), Err(Error::BackendError(_))));

    assert_eq!(manager.handle(), Some(old));
    assert_eq!(manager.backend().state().live_swap_chains, vec![old]);
}

#[test]
fn test_configuration_error_on_recreate_keeps_previous() {
    let mut manager = setup();
    let old = manager.handle();

    manager.backend().state().capabilities.current_extent = Extent2D::new(9000, 9000);
    assert!(matches!(manager.recreate(), Err(Error::ConfigurationError(_))));
    assert_eq!(manager.handle(), old);
    assert_eq!(manager.backend().state().created.len(), 1);
}

// ============================================================================
// ACQUIRE
// ============================================================================

#[test]
fn test_acquire_cycles_indices() {
    let mut manager = setup();
    for expected in [0u32, 1, 2, 0] {
        assert_eq!(manager.acquire().unwrap(), FrameOutcome::Proceed);
        assert_eq!(manager.current_image_index(), expected);
    }
}

#[test]
fn test_acquire_signals_image_available() {
    let mut manager = setup();
    manager.acquire().unwrap();

    let handle = manager.handle().unwrap();
    let available = manager.image_available_semaphore();
    assert_eq!(manager.backend().state().acquires, vec![(handle, available)]);
}

#[test]
fn test_acquire_out_of_date_recreates_once() {
    let mut manager = setup();
    let old = manager.handle().unwrap();
    let queries_before = manager.backend().state().capability_queries;
    manager.backend().state().acquire_results.push_back(AcquireResult::OutOfDate);

    assert_eq!(manager.acquire().unwrap(), FrameOutcome::Skip);

    {
        let state = manager.backend().state();
        assert_eq!(state.capability_queries, queries_before + 1);
        assert_eq!(state.created.len(), 2);
        assert_eq!(state.device_idle_waits, 1);
        assert_eq!(state.destroyed_swap_chains, vec![old]);
    }

    assert_eq!(manager.acquire().unwrap(), FrameOutcome::Proceed);
    assert!(manager.current_image_index() < manager.image_count());
    assert_eq!(manager.backend().state().created.len(), 2);
}

#[test]
fn test_acquire_suboptimal_is_success() {
    let mut manager = setup();
    manager.backend().state().acquire_results.push_back(AcquireResult::Suboptimal(2));

    assert_eq!(manager.acquire().unwrap(), FrameOutcome::Proceed);
    assert_eq!(manager.current_image_index(), 2);
    assert_eq!(manager.backend().state().created.len(), 1);
}

#[test]
fn test_acquire_failure_is_fatal() {
    let mut manager = setup();
    manager.backend().state().acquire_results
        .push_back(AcquireResult::Failed("ERROR_DEVICE_LOST".to_string()));

    match manager.acquire() {
        Err(Error::DeviceError(msg)) => assert!(msg.contains("ERROR_DEVICE_LOST")),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(manager.backend().state().created.len(), 1);
}

#[test]
fn test_acquire_index_out_of_range_is_fatal() {
    let mut manager = setup();
    manager.backend().state().acquire_results.push_back(AcquireResult::Success(7));

    assert!(matches!(manager.acquire(), Err(Error::DeviceError(_))));
    assert_eq!(manager.current_image_index(), 0);
}

#[test]
fn test_acquire_validation_sync_waits_for_present_queue() {
    let config = SwapChainConfig { validation_sync: true, ..SwapChainConfig::default() };
    let (mut manager, _w) = setup_full(MockBackend::new(), (800, 600), config);
    manager.acquire().unwrap();
    manager.acquire().unwrap();
    assert_eq!(manager.backend().state().present_queue_idle_waits, 2);

    let mut relaxed = setup();
    relaxed.acquire().unwrap();
    assert_eq!(relaxed.backend().state().present_queue_idle_waits, 0);
}

#[test]
fn test_out_of_date_with_failed_idle_wait_is_fatal() {
    let mut manager = setup();
    {
        let mut state = manager.backend().state();
        state.acquire_results.push_back(AcquireResult::OutOfDate);
        state.fail_device_idle = true;
    }

    assert!(matches!(manager.acquire(), Err(Error::DeviceError(_))));
    assert_eq!(manager.backend().state().created.len(), 1);
}

// ============================================================================
// PRESENT
// ============================================================================

#[test]
fn test_present_uses_current_index_and_render_finished() {
    let mut manager = setup();
    manager.acquire().unwrap();
    manager.acquire().unwrap();

    assert_eq!(manager.present().unwrap(), FrameOutcome::Proceed);

    let handle = manager.handle().unwrap();
    let finished = manager.render_finished_semaphore();
    assert_eq!(manager.backend().state().presents, vec![(handle, 1, finished)]);
}

#[test]
fn test_present_out_of_date_and_suboptimal_recreate() {
    for result in [PresentResult::OutOfDate, PresentResult::Suboptimal] {
        let mut manager = setup();
        manager.acquire().unwrap();
        manager.backend().state().present_results.push_back(result.clone());

        assert_eq!(manager.present().unwrap(), FrameOutcome::Skip);

        let state = manager.backend().state();
        assert_eq!(state.created.len(), 2, "{:?}", result);
        assert_eq!(state.device_idle_waits, 1);
    }
}

#[test]
fn test_present_failure_is_fatal() {
    let mut manager = setup();
    manager.acquire().unwrap();
    manager.backend().state().present_results
        .push_back(PresentResult::Failed("ERROR_SURFACE_LOST_KHR".to_string()));

    assert!(matches!(manager.present(), Err(Error::DeviceError(_))));
}

// ============================================================================
// DESTRUCTION
// ============================================================================

#[test]
fn test_destroy_is_idempotent() {
    let mut manager = setup();
    let handle = manager.handle().unwrap();

    manager.destroy();
    manager.destroy();

    assert_eq!(manager.status(), SwapChainStatus::Destroyed);
    assert!(!manager.is_valid());
    assert_eq!(manager.backend().state().destroyed_swap_chains, vec![handle]);
    assert_eq!(manager.acquire().unwrap(), FrameOutcome::Skip);
    assert_eq!(manager.present().unwrap(), FrameOutcome::Skip);
    assert!(matches!(manager.recreate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_drop_destroys_swap_chain_before_semaphores() {
    let manager = setup();
    let shared = manager.backend().shared_state();
    let handle = manager.handle().unwrap();
    let available = manager.image_available_semaphore();
    let finished = manager.render_finished_semaphore();

    drop(manager);

    let state = shared.lock().unwrap();
    assert_eq!(
        state.destruction_order,
        vec![
            format!("swap_chain:{}", handle),
            format!("semaphore:{}", available),
            format!("semaphore:{}", finished),
        ]
    );
    assert!(state.live_swap_chains.is_empty());
    assert!(state.live_semaphores.is_empty());
}

#[test]
fn test_drop_after_destroy_does_not_double_free() {
    let mut manager = setup();
    let shared = manager.backend().shared_state();
    manager.destroy();
    drop(manager);

    assert_eq!(shared.lock().unwrap().destroyed_swap_chains.len(), 1);
}
