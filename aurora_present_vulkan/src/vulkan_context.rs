/// VulkanContext - instance, surface, device and queues for presentation
///
/// Brings up everything the swap chain backend needs:
/// - Vulkan instance (+ validation layer and debug messenger when enabled)
/// - Window surface (via ash-window)
/// - Physical device with graphics and present queue families
/// - Logical device with the swapchain extension
///
/// Teardown order is device -> surface -> debug messenger -> instance.
/// Everything created from the device (swap chains, semaphores, frame
/// resources) must be dropped before the context.

use aurora_present::aurora::{Error, Result};
use aurora_present::aurora::present::QueueFamilies;
use aurora_present::{engine_error, engine_info, engine_debug};
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::sync::Arc;

/// Context configuration
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Application name reported to the driver
    pub app_name: String,
    /// Enable VK_LAYER_KHRONOS_validation + debug messenger
    /// (ignored unless built with the `vulkan-validation` feature)
    pub enable_validation: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            app_name: "Aurora Application".to_string(),
            enable_validation: cfg!(feature = "vulkan-validation"),
        }
    }
}

/// Vulkan objects shared by the presentation backend and frame resources
pub struct VulkanContext {
    /// Kept alive for the lifetime of the instance
    _entry: ash::Entry,
    instance: ash::Instance,
    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<crate::debug::DebugMessenger>,

    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,

    physical_device: vk::PhysicalDevice,
    device: Arc<ash::Device>,

    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    queue_families: QueueFamilies,

    validation_enabled: bool,
}

impl VulkanContext {
    /// Create the Vulkan context for `window`
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &ContextConfig) -> Result<Self> {
        let validation_enabled = cfg!(feature = "vulkan-validation") && config.enable_validation;

        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| {
                    engine_error!("aurora::vulkan", "Failed to load Vulkan library: {:?}", e);
                    Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
                })?;

            let app_name = CString::new(config.app_name.as_str())
                .unwrap_or_else(|_| CString::from(c"Aurora Application"));
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Aurora")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            let display_handle = window.display_handle()
                .map_err(|e| {
                    engine_error!("aurora::vulkan", "Failed to get display handle: {}", e);
                    Error::InitializationFailed(format!("Failed to get display handle: {}", e))
                })?;
            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!("aurora::vulkan", "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            if validation_enabled {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            let layer_names = if validation_enabled {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| {
                    engine_error!("aurora::vulkan", "Failed to create Vulkan instance: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
                })?;

            #[cfg(feature = "vulkan-validation")]
            let debug_messenger = if validation_enabled {
                match crate::debug::DebugMessenger::new(&entry, &instance) {
                    Ok(messenger) => Some(messenger),
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                None
            };

            let window_handle = match window.window_handle() {
                Ok(handle) => handle,
                Err(e) => {
                    #[cfg(feature = "vulkan-validation")]
                    if let Some(messenger) = &debug_messenger {
                        messenger.destroy();
                    }
                    instance.destroy_instance(None);
                    engine_error!("aurora::vulkan", "Failed to get window handle: {}", e);
                    return Err(Error::InitializationFailed(format!("Failed to get window handle: {}", e)));
                }
            };

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
            let surface = match ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            ) {
                Ok(surface) => surface,
                Err(e) => {
                    #[cfg(feature = "vulkan-validation")]
                    if let Some(messenger) = &debug_messenger {
                        messenger.destroy();
                    }
                    instance.destroy_instance(None);
                    engine_error!("aurora::vulkan", "Failed to create surface: {:?}", e);
                    return Err(Error::InitializationFailed(format!("Failed to create surface: {:?}", e)));
                }
            };

            // From here on, partially built state is released by Drop
            let mut context = PartialContext {
                instance: &instance,
                surface_loader: &surface_loader,
                surface,
                #[cfg(feature = "vulkan-validation")]
                debug_messenger: debug_messenger.as_ref(),
                armed: true,
            };

            let (physical_device, queue_families) =
                Self::pick_physical_device(&instance, &surface_loader, surface)?;

            let properties = instance.get_physical_device_properties(physical_device);
            let name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            engine_info!("aurora::vulkan", "Using GPU '{}' (graphics family {}, present family {})",
                name, queue_families.graphics, queue_families.present);

            let device = Arc::new(Self::create_device(&instance, physical_device, queue_families)?);

            context.armed = false;
            drop(context);

            let graphics_queue = device.get_device_queue(queue_families.graphics, 0);
            let present_queue = device.get_device_queue(queue_families.present, 0);

            engine_debug!("aurora::vulkan", "Vulkan context created (validation: {})", validation_enabled);

            Ok(Self {
                _entry: entry,
                instance,
                #[cfg(feature = "vulkan-validation")]
                debug_messenger,
                surface_loader,
                surface,
                physical_device,
                device,
                graphics_queue,
                present_queue,
                queue_families,
                validation_enabled,
            })
        }
    }

    /// First device exposing a graphics family, a present family for
    /// `surface` and the swapchain extension. A family supporting both is
    /// preferred.
    unsafe fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, QueueFamilies)> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| {
                engine_error!("aurora::vulkan", "Failed to enumerate physical devices: {:?}", e);
                Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
            })?;

        for physical_device in physical_devices {
            let has_swapchain = instance
                .enumerate_device_extension_properties(physical_device)
                .map(|extensions| {
                    extensions.iter().any(|ext| {
                        ext.extension_name_as_c_str()
                            .map_or(false, |name| name == ash::khr::swapchain::NAME)
                    })
                })
                .unwrap_or(false);
            if !has_swapchain {
                continue;
            }

            let families = instance.get_physical_device_queue_family_properties(physical_device);
            let supports_present = |index: u32| {
                surface_loader
                    .get_physical_device_surface_support(physical_device, index, surface)
                    .unwrap_or(false)
            };

            let graphics: Vec<u32> = families
                .iter()
                .enumerate()
                .filter(|(_, family)| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .map(|(index, _)| index as u32)
                .collect();

            if let Some(&both) = graphics.iter().find(|&&index| supports_present(index)) {
                return Ok((physical_device, QueueFamilies { graphics: both, present: both }));
            }

            let present = (0..families.len() as u32).find(|&index| supports_present(index));
            if let (Some(&graphics), Some(present)) = (graphics.first(), present) {
                return Ok((physical_device, QueueFamilies { graphics, present }));
            }
        }

        engine_error!("aurora::vulkan", "No Vulkan-capable GPU can present to this surface");
        Err(Error::InitializationFailed("No Vulkan-capable GPU can present to this surface".to_string()))
    }

    unsafe fn create_device(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        queue_families: QueueFamilies,
    ) -> Result<ash::Device> {
        let queue_priorities = [1.0];
        let mut queue_create_infos = vec![
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_families.graphics)
                .queue_priorities(&queue_priorities),
        ];
        if queue_families.present != queue_families.graphics {
            queue_create_infos.push(
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(queue_families.present)
                    .queue_priorities(&queue_priorities),
            );
        }

        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names);

        instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| {
                engine_error!("aurora::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn device(&self) -> &Arc<ash::Device> {
        &self.device
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub fn surface_loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    pub fn queue_families(&self) -> QueueFamilies {
        self.queue_families
    }

    /// Whether the validation layer is active (strict host/device sync expected)
    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }

    /// Block until the device has finished all submitted work
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle().map_err(|e| {
                engine_error!("aurora::vulkan", "Failed to wait for device idle: {:?}", e);
                Error::DeviceError(format!("Failed to wait for device idle: {:?}", e))
            })
        }
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            #[cfg(feature = "vulkan-validation")]
            if let Some(messenger) = self.debug_messenger.take() {
                messenger.destroy();
            }
            self.instance.destroy_instance(None);
        }
        engine_debug!("aurora::vulkan", "Vulkan context destroyed");
    }
}

/// Releases surface, messenger and instance if device bring-up fails midway
struct PartialContext<'a> {
    instance: &'a ash::Instance,
    surface_loader: &'a ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    #[cfg(feature = "vulkan-validation")]
    debug_messenger: Option<&'a crate::debug::DebugMessenger>,
    armed: bool,
}

impl Drop for PartialContext<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
            #[cfg(feature = "vulkan-validation")]
            if let Some(messenger) = self.debug_messenger {
                messenger.destroy();
            }
            self.instance.destroy_instance(None);
        }
    }
}
