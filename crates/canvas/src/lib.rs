//! Layered pixel canvas: buffers, layers, and frame compositing.

pub mod buffer;
pub mod frame;
pub mod layer;

pub use buffer::{PixelBuffer, MAX_CANVAS_SIZE, MIN_CANVAS_SIZE};
pub use frame::{Frame, LayerTransform};
pub use layer::{Layer, LayerId};
