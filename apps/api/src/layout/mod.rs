// CV layout engine: measurement, line breaking, justification, paragraph flow,
// and the page/section flow controller that drives a `Canvas`.
// Rendering is synchronous and CPU-bound; HTTP handlers run it inside
// tokio::task::spawn_blocking.

pub mod canvas;
pub mod flow;
pub mod font_metrics;
pub mod justify;
pub mod line_breaker;
pub mod markdown;
pub mod normalize;
pub mod paragraph;
pub mod pdf_canvas;

use thiserror::Error;

// Re-export the public API consumed by the render handlers.
pub use canvas::RecordingCanvas;
pub use flow::{lay_out, render_document, LayoutConfig, RenderSummary};
pub use pdf_canvas::PdfCanvas;

/// Failures that abort a render. Missing fields, oversized fields and the page
/// limit are not errors; they are resolved by defaults and truncation.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("cannot measure glyph {glyph:?} in {text:?}")]
    UnsupportedGlyph { glyph: char, text: String },

    #[error("drawing failed: {0}")]
    Drawing(String),
}
