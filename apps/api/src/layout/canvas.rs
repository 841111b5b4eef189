//! The paginated drawing surface the layout engine writes to.
//!
//! The engine only ever talks to `Canvas`; the byte format is the canvas's
//! business. `RecordingCanvas` keeps positioned commands in memory and
//! finalizes to a JSON `LayoutReport`; `PdfCanvas` writes a PDF.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{self, Font};
use crate::layout::LayoutError;

/// Drawing contract used by the section flow controller.
///
/// Coordinates are PDF user space: points, origin bottom-left, `y` is the
/// text baseline.
pub trait Canvas {
    fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font: Font,
        size: f32,
    ) -> Result<(), LayoutError>;

    fn draw_centered_text(
        &mut self,
        center_x: f32,
        y: f32,
        text: &str,
        font: Font,
        size: f32,
    ) -> Result<(), LayoutError> {
        let width = self.measure_text_width(text, font, size)?;
        self.draw_text(center_x - width / 2.0, y, text, font, size)
    }

    fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        line_width: f32,
    ) -> Result<(), LayoutError>;

    fn measure_text_width(&self, text: &str, font: Font, size: f32) -> Result<f32, LayoutError> {
        font_metrics::measure(text, font, size)
    }

    /// Closes the current page and opens an empty one.
    fn new_page(&mut self) -> Result<(), LayoutError>;

    /// Pages written so far, including the open one.
    fn page_count(&self) -> usize;

    /// Serializes the document. Consumes the canvas.
    fn finalize(self) -> Result<Vec<u8>, LayoutError>
    where
        Self: Sized;
}

// ────────────────────────────────────────────────────────────────────────────
// Recording canvas
// ────────────────────────────────────────────────────────────────────────────

/// A single positioned drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        line_width: f32,
    },
}

impl DrawCommand {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { text, .. } => Some(text),
            DrawCommand::Line { .. } => None,
        }
    }
}

/// The recorded commands of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedPage {
    pub commands: Vec<DrawCommand>,
}

/// JSON form of a finished recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub page_count: usize,
    pub pages: Vec<RecordedPage>,
}

/// In-memory canvas. Used for layout previews and for inspecting renders in tests.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    pages: Vec<RecordedPage>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            pages: vec![RecordedPage::default()],
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    /// All text strings in drawing order, across pages.
    pub fn texts(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|p| p.commands.iter())
            .filter_map(DrawCommand::text)
            .collect()
    }

    /// Baseline of the first text command equal to `needle`.
    pub fn find_text_y(&self, needle: &str) -> Option<f32> {
        self.pages
            .iter()
            .flat_map(|p| p.commands.iter())
            .find_map(|c| match c {
                DrawCommand::Text { y, text, .. } if text == needle => Some(*y),
                _ => None,
            })
    }

    pub fn into_report(self) -> LayoutReport {
        LayoutReport {
            page_count: self.pages.len(),
            pages: self.pages,
        }
    }

    fn current_page(&mut self) -> &mut RecordedPage {
        if self.pages.is_empty() {
            self.pages.push(RecordedPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl Canvas for RecordingCanvas {
    fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font: Font,
        size: f32,
    ) -> Result<(), LayoutError> {
        // Validate the glyphs the same way a real canvas would.
        self.measure_text_width(text, font, size)?;
        self.current_page().commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            font,
            size,
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        line_width: f32,
    ) -> Result<(), LayoutError> {
        self.current_page().commands.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            line_width,
        });
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), LayoutError> {
        self.pages.push(RecordedPage::default());
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finalize(self) -> Result<Vec<u8>, LayoutError> {
        serde_json::to_vec(&self.into_report())
            .map_err(|e| LayoutError::Drawing(format!("failed to serialize layout report: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_canvas_starts_with_one_page() {
        let canvas = RecordingCanvas::new();
        assert_eq!(canvas.page_count(), 1);
        assert!(canvas.texts().is_empty());
    }

    #[test]
    fn test_centered_text_is_offset_by_half_width() {
        let mut canvas = RecordingCanvas::new();
        let width = canvas.measure_text_width("Centered", Font::Helvetica, 10.0).unwrap();
        canvas
            .draw_centered_text(300.0, 700.0, "Centered", Font::Helvetica, 10.0)
            .unwrap();
        match &canvas.pages()[0].commands[0] {
            DrawCommand::Text { x, y, .. } => {
                assert!((x - (300.0 - width / 2.0)).abs() < 1e-4);
                assert_eq!(*y, 700.0);
            }
            other => panic!("expected text command, got {other:?}"),
        }
    }

    #[test]
    fn test_new_page_routes_commands_to_new_page() {
        let mut canvas = RecordingCanvas::new();
        canvas.draw_text(10.0, 10.0, "one", Font::Helvetica, 10.0).unwrap();
        canvas.new_page().unwrap();
        canvas.draw_line(0.0, 0.0, 5.0, 0.0, 0.5).unwrap();
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.pages()[0].commands.len(), 1);
        assert_eq!(canvas.pages()[1].commands.len(), 1);
    }

    #[test]
    fn test_draw_text_rejects_unmeasurable_text() {
        let mut canvas = RecordingCanvas::new();
        let result = canvas.draw_text(0.0, 0.0, "emoji 🚀", Font::Helvetica, 10.0);
        assert!(result.is_err());
        assert!(canvas.texts().is_empty());
    }

    #[test]
    fn test_finalize_produces_json_report() {
        let mut canvas = RecordingCanvas::new();
        canvas.draw_text(1.0, 2.0, "hello", Font::HelveticaBold, 12.0).unwrap();
        let bytes = canvas.finalize().unwrap();
        let report: LayoutReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report.page_count, 1);
        assert_eq!(report.pages[0].commands[0].text(), Some("hello"));
    }
}
