/// Swap chain module - presentation surface lifecycle

// Module declarations
pub mod types;
pub mod selection;
pub mod backend;
pub mod swap_chain;
pub mod frame_resources;

// Re-export everything
pub use types::*;
pub use selection::*;
pub use backend::*;
pub use swap_chain::*;
pub use frame_resources::*;

// Mock backend for tests (no GPU required)
#[cfg(test)]
pub mod mock_backend;
