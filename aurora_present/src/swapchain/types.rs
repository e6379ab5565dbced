/// Backend-neutral presentation types
///
/// Mirrors the subset of the Vulkan WSI vocabulary the swap chain core needs.
/// Backends convert their native values into these types and back.

use bitflags::bitflags;

// ============================================================================
// Extent
// ============================================================================

/// Pixel width/height of swap chain images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    /// Reserved "defer to application" value for `SurfaceCapabilities::current_extent`
    pub const UNDEFINED: Extent2D = Extent2D { width: u32::MAX, height: u32::MAX };

    /// Degenerate extent, returned when no swap chain can be built right now
    pub const ZERO: Extent2D = Extent2D { width: 0, height: 0 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either component carries the "defer to application" sentinel
    pub fn is_undefined(&self) -> bool {
        self.width == u32::MAX || self.height == u32::MAX
    }

    /// True when either component is zero
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when both components are zero
    pub fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

// ============================================================================
// Formats
// ============================================================================

/// Swap chain image pixel format
///
/// `Other` carries the raw backend value for formats the core has no opinion on,
/// so a fallback choice is passed back to the backend unchanged.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// The surface has no preferred format
    Undefined,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
    Other(i32),
}

/// Color space of presented images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonlinear,
    ExtendedSrgbLinear,
    Hdr10St2084,
    Other(i32),
}

/// Format + color space pair as reported by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub format: Format,
    pub color_space: ColorSpace,
}

impl SurfaceFormat {
    /// Canonical choice: 8-bit BGRA, non-linear sRGB
    pub const PREFERRED: SurfaceFormat = SurfaceFormat {
        format: Format::B8G8R8A8_UNORM,
        color_space: ColorSpace::SrgbNonlinear,
    };

    pub const fn new(format: Format, color_space: ColorSpace) -> Self {
        Self { format, color_space }
    }
}

// ============================================================================
// Present mode
// ============================================================================

/// Display consumption policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentMode {
    /// No synchronization, may tear
    Immediate,
    /// Vsync, latest image replaces the pending one
    Mailbox,
    /// Vsync queue, always supported
    Fifo,
    FifoRelaxed,
    Other(i32),
}

// ============================================================================
// Capability flags
// ============================================================================

bitflags! {
    /// Surface pre-transform flags (bit values match VkSurfaceTransformFlagBitsKHR)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SurfaceTransform: u32 {
        const IDENTITY = 0x0000_0001;
        const ROTATE_90 = 0x0000_0002;
        const ROTATE_180 = 0x0000_0004;
        const ROTATE_270 = 0x0000_0008;
        const HORIZONTAL_MIRROR = 0x0000_0010;
        const HORIZONTAL_MIRROR_ROTATE_90 = 0x0000_0020;
        const HORIZONTAL_MIRROR_ROTATE_180 = 0x0000_0040;
        const HORIZONTAL_MIRROR_ROTATE_270 = 0x0000_0080;
        const INHERIT = 0x0000_0100;
    }
}

bitflags! {
    /// Composite alpha flags (bit values match VkCompositeAlphaFlagBitsKHR)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompositeAlpha: u32 {
        const OPAQUE = 0x0000_0001;
        const PRE_MULTIPLIED = 0x0000_0002;
        const POST_MULTIPLIED = 0x0000_0004;
        const INHERIT = 0x0000_0008;
    }
}

bitflags! {
    /// Swap chain image usage (bit values match VkImageUsageFlagBits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const TRANSFER_SRC = 0x0000_0001;
        const TRANSFER_DST = 0x0000_0002;
        const STORAGE = 0x0000_0008;
        const COLOR_ATTACHMENT = 0x0000_0010;
    }
}

// ============================================================================
// Surface capabilities
// ============================================================================

/// Snapshot of the surface limits, re-queried on every creation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_image_count: u32,
    /// Zero means "no upper bound"
    pub max_image_count: u32,
    pub current_extent: Extent2D,
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
    pub current_transform: SurfaceTransform,
    pub supported_transforms: SurfaceTransform,
    pub supported_composite_alpha: CompositeAlpha,
}

impl SurfaceCapabilities {
    /// A minimized surface reports zero for the current, min and max extents
    pub fn is_minimized(&self) -> bool {
        self.current_extent.is_zero()
            && self.min_image_extent.is_zero()
            && self.max_image_extent.is_zero()
    }
}

// ============================================================================
// Creation parameters
// ============================================================================

/// Queue family ownership of swap chain images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingMode {
    /// One queue family owns an image at a time
    Exclusive,
    /// Images usable from both families without ownership transfers
    Concurrent { graphics_family: u32, present_family: u32 },
}

/// Graphics and present queue family indices of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    pub fn sharing_mode(&self) -> SharingMode {
        if self.graphics != self.present {
            SharingMode::Concurrent {
                graphics_family: self.graphics,
                present_family: self.present,
            }
        } else {
            SharingMode::Exclusive
        }
    }
}

/// Everything a backend needs to build a swap chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapChainDesc {
    pub min_image_count: u32,
    pub surface_format: SurfaceFormat,
    pub extent: Extent2D,
    pub image_array_layers: u32,
    pub image_usage: ImageUsage,
    pub sharing_mode: SharingMode,
    pub pre_transform: SurfaceTransform,
    pub composite_alpha: CompositeAlpha,
    pub present_mode: PresentMode,
    /// Allow the presentation engine to skip obscured pixels
    pub clipped: bool,
}

// ============================================================================
// Backend call results
// ============================================================================

/// Result of an image acquisition request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireResult {
    Success(u32),
    /// Usable, but the surface no longer matches exactly
    Suboptimal(u32),
    OutOfDate,
    Failed(String),
}

/// Result of a present request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentResult {
    Success,
    Suboptimal,
    OutOfDate,
    Failed(String),
}

// ============================================================================
// Outcomes exposed to the frame loop
// ============================================================================

/// Non-fatal outcome of acquire/present
///
/// Fatal conditions are returned as `Err`, so a frame loop matches on
/// `Ok(Proceed)`, `Ok(Skip)` or `Err(reason)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Continue with this frame
    Proceed,
    /// The surface was invalid (or got rebuilt): skip this frame's rendering
    Skip,
}

impl FrameOutcome {
    pub fn is_proceed(self) -> bool {
        self == FrameOutcome::Proceed
    }
}

/// What a create/recreate call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new swap chain was installed
    Created,
    /// The surface is minimized; the previous swap chain (if any) is kept
    Skipped,
}

/// Lifecycle of the swap chain manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapChainStatus {
    Uninitialized,
    Ready,
    /// Last creation attempt was skipped because the surface is minimized
    Stale,
    Destroyed,
}

/// Swap chain tuning knobs
#[derive(Debug, Clone, Copy)]
pub struct SwapChainConfig {
    /// Lower bound on the image count, clamped to the surface limits
    pub requested_image_count: u32,
    /// Usage flags for the swap chain images
    pub image_usage: ImageUsage,
    /// Wait for the present queue to be idle before every acquire
    /// (strict validation setups expect explicit host/device sync)
    pub validation_sync: bool,
}

impl Default for SwapChainConfig {
    fn default() -> Self {
        Self {
            requested_image_count: 3,
            image_usage: ImageUsage::COLOR_ATTACHMENT,
            validation_sync: false,
        }
    }
}
