/// VulkanPresentBackend - Vulkan implementation of the PresentBackend trait
///
/// Thin wrapper over VK_KHR_surface / VK_KHR_swapchain. All lifecycle
/// policy (recreation, validation, state) lives in `SwapChainManager`;
/// this type only translates calls and results.

use aurora_present::aurora::{Error, Result};
use aurora_present::aurora::present::{
    AcquireResult, PresentBackend, PresentMode, PresentResult, QueueFamilies, SharingMode,
    SurfaceCapabilities, SurfaceFormat, SwapChainDesc,
};
use aurora_present::{engine_err, engine_error, engine_trace};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::{
    capabilities_from_vk, color_space_to_vk, composite_alpha_to_vk, extent_to_vk,
    format_to_vk, image_usage_to_vk, present_mode_from_vk, present_mode_to_vk,
    surface_format_from_vk, transform_to_vk,
};

/// Vulkan presentation backend for one device/surface pair
///
/// Borrows the context's device and surface by handle: the owning
/// `VulkanContext` must outlive every backend created from it.
pub struct VulkanPresentBackend {
    device: Arc<ash::Device>,
    physical_device: vk::PhysicalDevice,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,

    present_queue: vk::Queue,
    queue_families: QueueFamilies,
}

impl VulkanPresentBackend {
    pub fn new(context: &VulkanContext) -> Self {
        let swapchain_loader = ash::khr::swapchain::Device::new(context.instance(), context.device());

        Self {
            device: Arc::clone(context.device()),
            physical_device: context.physical_device(),
            surface: context.surface(),
            surface_loader: context.surface_loader().clone(),
            swapchain_loader,
            present_queue: context.present_queue(),
            queue_families: context.queue_families(),
        }
    }

    pub fn device(&self) -> &Arc<ash::Device> {
        &self.device
    }
}

impl PresentBackend for VulkanPresentBackend {
    type SwapChain = vk::SwapchainKHR;
    type Image = vk::Image;
    type Semaphore = vk::Semaphore;

    fn surface_capabilities(&self) -> Result<SurfaceCapabilities> {
        let caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("aurora::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::DeviceError(format!("Failed to get surface capabilities: {:?}", e))
                })?
        };
        Ok(capabilities_from_vk(&caps))
    }

    fn surface_formats(&self) -> Result<Vec<SurfaceFormat>> {
        let formats = unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("aurora::vulkan", "Failed to get surface formats: {:?}", e);
                    Error::DeviceError(format!("Failed to get surface formats: {:?}", e))
                })?
        };
        Ok(formats.into_iter().map(surface_format_from_vk).collect())
    }

    fn present_modes(&self) -> Result<Vec<PresentMode>> {
        let modes = unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("aurora::vulkan", "Failed to get present modes: {:?}", e);
                    Error::DeviceError(format!("Failed to get present modes: {:?}", e))
                })?
        };
        Ok(modes.into_iter().map(present_mode_from_vk).collect())
    }

    fn queue_families(&self) -> QueueFamilies {
        self.queue_families
    }

    fn create_swap_chain(
        &self,
        desc: &SwapChainDesc,
        old: Option<vk::SwapchainKHR>,
    ) -> Result<vk::SwapchainKHR> {
        let queue_family_indices = match desc.sharing_mode {
            SharingMode::Exclusive => Vec::new(),
            SharingMode::Concurrent { graphics_family, present_family } => {
                vec![graphics_family, present_family]
            }
        };

        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(self.surface)
            .min_image_count(desc.min_image_count)
            .image_format(format_to_vk(desc.surface_format.format))
            .image_color_space(color_space_to_vk(desc.surface_format.color_space))
            .image_extent(extent_to_vk(desc.extent))
            .image_array_layers(desc.image_array_layers)
            .image_usage(image_usage_to_vk(desc.image_usage))
            .pre_transform(transform_to_vk(desc.pre_transform))
            .composite_alpha(composite_alpha_to_vk(desc.composite_alpha))
            .present_mode(present_mode_to_vk(desc.present_mode))
            .clipped(desc.clipped)
            .old_swapchain(old.unwrap_or_else(vk::SwapchainKHR::null));

        create_info = if queue_family_indices.is_empty() {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&queue_family_indices)
        };

        unsafe {
            self.swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to create swap chain: {:?}", e))
        }
    }

    fn swap_chain_images(&self, swap_chain: vk::SwapchainKHR) -> Result<Vec<vk::Image>> {
        unsafe {
            self.swapchain_loader
                .get_swapchain_images(swap_chain)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to get swap chain images: {:?}", e))
        }
    }

    fn destroy_swap_chain(&self, swap_chain: vk::SwapchainKHR) {
        engine_trace!("aurora::vulkan", "Destroying swap chain {:?}", swap_chain);
        unsafe {
            self.swapchain_loader.destroy_swapchain(swap_chain, None);
        }
    }

    fn acquire_next_image(
        &self,
        swap_chain: vk::SwapchainKHR,
        signal: vk::Semaphore,
    ) -> AcquireResult {
        let result = unsafe {
            self.swapchain_loader
                .acquire_next_image(swap_chain, u64::MAX, signal, vk::Fence::null())
        };
        match result {
            Ok((index, false)) => AcquireResult::Success(index),
            Ok((index, true)) => AcquireResult::Suboptimal(index),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => AcquireResult::OutOfDate,
            Err(e) => AcquireResult::Failed(format!("{:?}", e)),
        }
    }

    fn queue_present(
        &self,
        swap_chain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> PresentResult {
        let wait_semaphores = [wait];
        let swapchains = [swap_chain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.swapchain_loader.queue_present(self.present_queue, &present_info)
        };
        match result {
            Ok(false) => PresentResult::Success,
            Ok(true) => PresentResult::Suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => PresentResult::OutOfDate,
            Err(e) => PresentResult::Failed(format!("{:?}", e)),
        }
    }

    fn wait_device_idle(&self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to wait for device idle: {:?}", e))
        }
    }

    fn wait_present_queue_idle(&self) -> Result<()> {
        unsafe {
            self.device
                .queue_wait_idle(self.present_queue)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to wait for present queue idle: {:?}", e))
        }
    }

    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        let create_info = vk::SemaphoreCreateInfo::default();
        unsafe {
            self.device
                .create_semaphore(&create_info, None)
                .map_err(|e| engine_err!("aurora::vulkan", "Failed to create semaphore: {:?}", e))
        }
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe {
            self.device.destroy_semaphore(semaphore, None);
        }
    }
}
