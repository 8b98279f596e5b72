pub mod chart;
pub mod document;
pub mod engine;
pub mod metrics;
pub mod pdf;

pub use document::*;
pub use engine::{LayoutConfig, LayoutEngine, TextStyle};
pub use metrics::{wrap_text, Font};
