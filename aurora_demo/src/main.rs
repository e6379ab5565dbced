//! Aurora swap chain demo
//!
//! Opens a window, clears each swap chain image to a slowly cycling color
//! and presents it. Resizing, minimizing and restoring the window exercise
//! the full recreation protocol.
//!
//! Run with `RUST_LOG=debug cargo run -p aurora_demo` (add
//! `--features vulkan-validation` for the validation layer).

mod frame_resources;
mod frame_timer;

use aurora_present::aurora::{Engine, Result};
use aurora_present::aurora::log::LogCrateLogger;
use aurora_present::aurora::present::{
    recreate_with_frame_resources, FrameOutcome, FrameResources, SwapChainConfig, SwapChainManager,
};
use aurora_present::{engine_error, engine_info, engine_warn};
use aurora_present_vulkan::{ContextConfig, VulkanContext, VulkanPresentBackend};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use frame_resources::ClearFrameResources;
use frame_timer::FrameTimer;

const APP_NAME: &str = "Aurora Swap Chain Demo";
const REQUESTED_IMAGE_COUNT: u32 = 5;

/// Everything that lives between window creation and exit
///
/// Field order is drop order: frame resources, swap chain, then the Vulkan
/// context that owns the device, then the window.
struct AppContext {
    frame_resources: ClearFrameResources,
    swap_chain: SwapChainManager<VulkanPresentBackend>,
    vulkan: VulkanContext,
    window: Arc<Window>,
    timer: FrameTimer,
    frame_count: u64,
}

impl AppContext {
    fn new(window: Arc<Window>) -> Result<Self> {
        let vulkan = VulkanContext::new(
            window.as_ref(),
            &ContextConfig { app_name: APP_NAME.to_string(), ..Default::default() },
        )?;

        let config = SwapChainConfig {
            requested_image_count: REQUESTED_IMAGE_COUNT,
            validation_sync: vulkan.validation_enabled(),
            ..Default::default()
        };
        let swap_chain = SwapChainManager::new(VulkanPresentBackend::new(&vulkan), window.clone(), config)?;
        let frame_resources = ClearFrameResources::new(&vulkan, &swap_chain)?;

        engine_info!("aurora::demo", "Swap chain ready: {} images, {:?}, {:?}",
            swap_chain.image_count(), swap_chain.extent(), swap_chain.present_mode());

        Ok(Self {
            frame_resources,
            swap_chain,
            vulkan,
            window,
            timer: FrameTimer::new(Instant::now()),
            frame_count: 0,
        })
    }

    fn draw_frame(&mut self) -> Result<()> {
        self.frame_resources.wait_previous_frame()?;

        let outcome = self.swap_chain.acquire()?;
        self.sync_frame_resources()?;
        if outcome == FrameOutcome::Skip {
            return Ok(());
        }

        self.frame_resources.record_and_submit(&self.swap_chain, self.clear_color())?;
        self.swap_chain.present()?;
        self.sync_frame_resources()?;

        self.frame_count += 1;
        if self.timer.tick(Instant::now()).is_some() {
            self.window.set_title(&self.timer.title(APP_NAME));
        }
        Ok(())
    }

    /// Rebuild frame resources if acquire/present replaced the swap chain
    fn sync_frame_resources(&mut self) -> Result<()> {
        if self.frame_resources.is_stale(&self.swap_chain) {
            self.vulkan.wait_idle()?;
            self.frame_resources.release();
            self.frame_resources.rebuild(&self.swap_chain)?;
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        // Minimized: keep the current swap chain until the window is restored
        if width == 0 || height == 0 {
            return Ok(());
        }
        let outcome = recreate_with_frame_resources(&mut self.swap_chain, &mut self.frame_resources)?;
        engine_info!("aurora::demo", "Resized to {}x{} ({:?})", width, height, outcome);
        Ok(())
    }

    fn clear_color(&self) -> [f32; 4] {
        let t = self.frame_count as f32 * 0.01;
        [
            0.5 + 0.5 * t.sin(),
            0.5 + 0.5 * (t + 2.094).sin(),
            0.5 + 0.5 * (t + 4.189).sin(),
            1.0,
        ]
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        // Nothing may be in use when the fields are torn down
        if let Err(e) = self.vulkan.wait_idle() {
            engine_warn!("aurora::demo", "Device idle wait failed during shutdown: {}", e);
        }
    }
}

#[derive(Default)]
struct DemoApp {
    context: Option<AppContext>,
}

impl DemoApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: aurora_present::aurora::Error) {
        engine_error!("aurora::demo", "{}", error);
        self.context = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(APP_NAME)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                engine_error!("aurora::demo", "Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match AppContext::new(window) {
            Ok(context) => self.context = Some(context),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(context) = self.context.as_mut() else {
            return;
        };

        let result = match event {
            WindowEvent::CloseRequested => {
                self.context = None;
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => context.resize(size.width, size.height),
            WindowEvent::RedrawRequested => context.draw_frame(),
            _ => Ok(()),
        };

        if let Err(e) = result {
            if e.is_fatal() {
                self.fail(event_loop, e);
            } else {
                engine_warn!("aurora::demo", "{}", e);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(context) = &self.context {
            context.window.request_redraw();
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Engine::set_logger(LogCrateLogger);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!("aurora::demo", "Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::default();
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!("aurora::demo", "Event loop error: {}", e);
        std::process::exit(1);
    }

    #[cfg(feature = "vulkan-validation")]
    aurora_present_vulkan::print_validation_stats_report();
}
