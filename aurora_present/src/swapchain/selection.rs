/// Pure selection functions feeding swap chain creation
///
/// No I/O, no logging on the hot path: every function here is a
/// deterministic mapping from surface capabilities to a creation parameter.

use crate::error::{Error, Result};
use crate::engine_warn;
use super::types::{Extent2D, Format, PresentMode, SurfaceCapabilities, SurfaceFormat};

/// Choose the color format + color space for the swap chain
///
/// - A single `Undefined` entry means "no preference": the canonical
///   B8G8R8A8_UNORM / sRGB non-linear pair is returned.
/// - Otherwise the canonical pair is returned if listed anywhere.
/// - Otherwise the first listed entry.
pub fn choose_surface_format(available: &[SurfaceFormat]) -> SurfaceFormat {
    match available {
        [] => {
            engine_warn!("aurora::SwapChain",
                "Surface reported no formats, using {:?}", SurfaceFormat::PREFERRED);
            SurfaceFormat::PREFERRED
        }
        [only] if only.format == Format::Undefined => SurfaceFormat::PREFERRED,
        _ => available
            .iter()
            .copied()
            .find(|f| *f == SurfaceFormat::PREFERRED)
            .unwrap_or(available[0]),
    }
}

/// Choose the display synchronization policy
///
/// MAILBOX > IMMEDIATE > FIFO. FIFO is always supported and is the fallback.
pub fn choose_present_mode(available: &[PresentMode]) -> PresentMode {
    let mut best = PresentMode::Fifo;

    for &mode in available {
        match mode {
            PresentMode::Mailbox => return mode,
            PresentMode::Immediate => best = mode,
            _ => {}
        }
    }

    best
}

/// Compute the pixel resolution of the next swap chain
///
/// `window_size` is the live client-area size, signed because window systems
/// report non-positive sizes for unmapped or minimized windows.
pub fn resolve_extent(capabilities: &SurfaceCapabilities, window_size: (i32, i32)) -> Extent2D {
    let current = capabilities.current_extent;
    if !current.is_undefined() && !current.is_degenerate() {
        return current;
    }

    let (width, height) = window_size;
    if width <= 0 || height <= 0 {
        return Extent2D::ZERO;
    }

    // A zero max bound means "unconstrained", not "clamp to zero"
    let clamp = |value: u32, min: u32, max: u32| {
        if max > 0 {
            min.max(max.min(value))
        } else {
            value
        }
    };

    Extent2D {
        width: clamp(width as u32, capabilities.min_image_extent.width, capabilities.max_image_extent.width),
        height: clamp(height as u32, capabilities.min_image_extent.height, capabilities.max_image_extent.height),
    }
}

/// Number of images to request: `max(requested, min + 1)`, capped by a nonzero max
pub fn choose_image_count(capabilities: &SurfaceCapabilities, requested: u32) -> u32 {
    let count = requested.max(capabilities.min_image_count.saturating_add(1));
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

/// Reject a degenerate extent or one outside the surface bounds
///
/// Upper bounds of zero are treated as unconstrained, consistent with
/// `resolve_extent`.
pub fn validate_extent(extent: Extent2D, capabilities: &SurfaceCapabilities) -> Result<()> {
    if extent.is_degenerate() {
        return Err(Error::ConfigurationError(format!(
            "Cannot create swap chain with degenerate extent {}x{}",
            extent.width, extent.height
        )));
    }

    let min = capabilities.min_image_extent;
    let max = capabilities.max_image_extent;
    let width_ok = extent.width >= min.width && (max.width == 0 || extent.width <= max.width);
    let height_ok = extent.height >= min.height && (max.height == 0 || extent.height <= max.height);

    if !width_ok || !height_ok {
        return Err(Error::ConfigurationError(format!(
            "Swap chain extent {}x{} is outside surface bounds [{}x{}, {}x{}]",
            extent.width, extent.height, min.width, min.height, max.width, max.height
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
