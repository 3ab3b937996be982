//! Rendering module
//!
//! The compositor (`pipeline`) draws through the `DrawingSurface` trait. `batch`
//! tessellates into vertices that `gpu` presents with WebGPU; `record` captures
//! commands for inspection.

pub mod batch;
pub mod beam;
pub mod gpu;
pub mod pipeline;
pub mod record;
pub mod style;
pub mod surface;
pub mod vertex;

pub use batch::VertexBatch;
pub use beam::{parse_hex_color, pulse_opacity};
pub use gpu::BatchPresenter;
pub use pipeline::{Backdrop, Toggles, hit_test_label};
pub use record::{DrawCommand, RecordingSurface};
pub use style::{DefaultLabelStyle, LabelStyle, LabelStyleProvider};
pub use surface::{Color, DrawingSurface, ImageId, Layer, Paint};
