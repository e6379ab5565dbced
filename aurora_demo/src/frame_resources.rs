/// Clear-pass frame resources for the demo
///
/// One render pass that clears the acquired image, one framebuffer and view
/// per swap chain image, a single command buffer and its fence (one frame in
/// flight, matching the manager's single sync pair).

use aurora_present::aurora::{Error, Result};
use aurora_present::aurora::present::{FrameResources, SwapChainManager};
use aurora_present::{engine_debug, engine_error};
use aurora_present_vulkan::{extent_to_vk, format_to_vk, VulkanContext, VulkanPresentBackend};
use ash::vk;
use std::sync::Arc;

pub struct ClearFrameResources {
    device: Arc<ash::Device>,
    graphics_queue: vk::Queue,

    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    in_flight: vk::Fence,

    render_pass: vk::RenderPass,
    image_views: Vec<vk::ImageView>,
    framebuffers: Vec<vk::Framebuffer>,
    /// Swap chain the views/framebuffers were built against
    built_for: Option<vk::SwapchainKHR>,
}

impl ClearFrameResources {
    pub fn new(
        context: &VulkanContext,
        swap_chain: &SwapChainManager<VulkanPresentBackend>,
    ) -> Result<Self> {
        let device = Arc::clone(context.device());

        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(context.queue_families().graphics);

        let command_pool = unsafe {
            device.create_command_pool(&pool_info, None).map_err(|e| {
                engine_error!("aurora::demo", "Failed to create command pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
            })?
        };

        // Owned from here so Drop releases whatever is already built
        let mut resources = Self {
            device,
            graphics_queue: context.graphics_queue(),
            command_pool,
            command_buffer: vk::CommandBuffer::null(),
            in_flight: vk::Fence::null(),
            render_pass: vk::RenderPass::null(),
            image_views: Vec::new(),
            framebuffers: Vec::new(),
            built_for: None,
        };

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        resources.command_buffer = unsafe {
            resources.device.allocate_command_buffers(&alloc_info).map_err(|e| {
                engine_error!("aurora::demo", "Failed to allocate command buffer: {:?}", e);
                Error::InitializationFailed(format!("Failed to allocate command buffer: {:?}", e))
            })?[0]
        };

        // Signaled so the first frame does not block
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
        resources.in_flight = unsafe {
            resources.device.create_fence(&fence_info, None).map_err(|e| {
                engine_error!("aurora::demo", "Failed to create fence: {:?}", e);
                Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
            })?
        };

        resources.rebuild(swap_chain)?;
        Ok(resources)
    }

    /// True when the manager replaced its swap chain behind our back
    /// (out-of-date or suboptimal handling during acquire/present)
    pub fn is_stale(&self, swap_chain: &SwapChainManager<VulkanPresentBackend>) -> bool {
        self.built_for != swap_chain.handle()
    }

    /// Block until the previous frame's submission has completed
    pub fn wait_previous_frame(&self) -> Result<()> {
        unsafe {
            self.device
                .wait_for_fences(&[self.in_flight], true, u64::MAX)
                .map_err(|e| {
                    engine_error!("aurora::demo", "Failed to wait for frame fence: {:?}", e);
                    Error::DeviceError(format!("Failed to wait for frame fence: {:?}", e))
                })
        }
    }

    /// Record and submit a clear of the acquired image
    ///
    /// Waits on image-available at the color attachment stage and signals
    /// render-finished for the present that follows.
    pub fn record_and_submit(
        &mut self,
        swap_chain: &SwapChainManager<VulkanPresentBackend>,
        clear_color: [f32; 4],
    ) -> Result<()> {
        let image_index = swap_chain.current_image_index() as usize;
        let framebuffer = *self.framebuffers.get(image_index).ok_or_else(|| {
            Error::InvalidResource(format!("No framebuffer for image {}", image_index))
        })?;
        let extent = extent_to_vk(swap_chain.extent());

        unsafe {
            let to_device_error = |what: &str, e: vk::Result| {
                engine_error!("aurora::demo", "Failed to {}: {:?}", what, e);
                Error::DeviceError(format!("Failed to {}: {:?}", what, e))
            };

            self.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| to_device_error("reset command buffer", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            self.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| to_device_error("begin command buffer", e))?;

            let clear_values = [vk::ClearValue {
                color: vk::ClearColorValue { float32: clear_color },
            }];
            let render_pass_info = vk::RenderPassBeginInfo::default()
                .render_pass(self.render_pass)
                .framebuffer(framebuffer)
                .render_area(vk::Rect2D { offset: vk::Offset2D { x: 0, y: 0 }, extent })
                .clear_values(&clear_values);

            self.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );
            self.device.cmd_end_render_pass(self.command_buffer);

            self.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| to_device_error("end command buffer", e))?;

            let wait_semaphores = [swap_chain.image_available_semaphore()];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let signal_semaphores = [swap_chain.render_finished_semaphore()];
            let command_buffers = [self.command_buffer];
            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            self.device
                .reset_fences(&[self.in_flight])
                .map_err(|e| to_device_error("reset frame fence", e))?;
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], self.in_flight)
                .map_err(|e| to_device_error("submit frame", e))?;
        }

        Ok(())
    }

    unsafe fn create_render_pass(&self, format: vk::Format) -> Result<vk::RenderPass> {
        let attachments = [vk::AttachmentDescription::default()
            .format(format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let subpasses = [vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)];

        // Layout transition waits for the acquire semaphore's stage
        let dependencies = [vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)];

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        self.device.create_render_pass(&create_info, None).map_err(|e| {
            engine_error!("aurora::demo", "Failed to create render pass: {:?}", e);
            Error::InitializationFailed(format!("Failed to create render pass: {:?}", e))
        })
    }
}

impl FrameResources<VulkanPresentBackend> for ClearFrameResources {
    fn release(&mut self) {
        unsafe {
            for framebuffer in self.framebuffers.drain(..) {
                self.device.destroy_framebuffer(framebuffer, None);
            }
            for view in self.image_views.drain(..) {
                self.device.destroy_image_view(view, None);
            }
            if self.render_pass != vk::RenderPass::null() {
                self.device.destroy_render_pass(self.render_pass, None);
                self.render_pass = vk::RenderPass::null();
            }
        }
        self.built_for = None;
    }

    fn rebuild(&mut self, swap_chain: &SwapChainManager<VulkanPresentBackend>) -> Result<()> {
        // Nothing to build against (minimized or destroyed)
        let (Some(handle), Some(surface_format)) = (swap_chain.handle(), swap_chain.surface_format()) else {
            return Ok(());
        };

        // Rebuilding over a live set (e.g. after a failed recreate) starts clean
        self.release();

        let format = format_to_vk(surface_format.format);
        let extent = extent_to_vk(swap_chain.extent());

        unsafe {
            self.render_pass = self.create_render_pass(format)?;

            for &image in swap_chain.images() {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(format)
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });
                let view = self.device.create_image_view(&view_info, None).map_err(|e| {
                    engine_error!("aurora::demo", "Failed to create image view: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
                })?;
                self.image_views.push(view);

                let attachments = [view];
                let framebuffer_info = vk::FramebufferCreateInfo::default()
                    .render_pass(self.render_pass)
                    .attachments(&attachments)
                    .width(extent.width)
                    .height(extent.height)
                    .layers(1);
                let framebuffer = self.device.create_framebuffer(&framebuffer_info, None).map_err(|e| {
                    engine_error!("aurora::demo", "Failed to create framebuffer: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create framebuffer: {:?}", e))
                })?;
                self.framebuffers.push(framebuffer);
            }
        }

        self.built_for = Some(handle);
        engine_debug!("aurora::demo", "Frame resources built for {} images ({}x{})",
            self.framebuffers.len(), extent.width, extent.height);
        Ok(())
    }
}

impl Drop for ClearFrameResources {
    fn drop(&mut self) {
        self.release();
        unsafe {
            if self.in_flight != vk::Fence::null() {
                self.device.destroy_fence(self.in_flight, None);
            }
            // Frees the command buffer with it
            self.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
