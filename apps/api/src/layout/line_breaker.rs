//! Greedy line breaking.
//!
//! Produces concrete lines with measured word widths so the justifier can
//! place every word without re-measuring.

use crate::layout::font_metrics::Font;
use crate::layout::LayoutError;

/// A word token with its rendered width at the line's font and size.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub width: f32,
}

/// One packed line. Transient: produced by `pack`, consumed by `justify`.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub words: Vec<Word>,
    /// Natural inter-word gap (one space at the paragraph font/size).
    pub gap: f32,
    /// True for the final line of the packed word sequence.
    pub is_last: bool,
}

impl Line {
    /// Sum of word widths plus one natural gap between each pair of words.
    pub fn natural_width(&self) -> f32 {
        let words: f32 = self.words.iter().map(|w| w.width).sum();
        let gaps = self.words.len().saturating_sub(1) as f32 * self.gap;
        words + gaps
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// The words joined by single spaces, as an ATS parser reads the line.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Packs `words` into lines no wider than `max_width`.
///
/// Each word costs its width plus one `gap` allowance; it joins the current
/// line while the running total stays within `max_width`, otherwise it opens
/// a new line. A word wider than `max_width` is placed alone on its own line.
/// Empty input yields no lines.
pub fn pack<S, M>(
    words: &[S],
    measure: M,
    max_width: f32,
    font: Font,
    size: f32,
    gap: f32,
) -> Result<Vec<Line>, LayoutError>
where
    S: AsRef<str>,
    M: Fn(&str, Font, f32) -> Result<f32, LayoutError>,
{
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut current_width = 0.0_f32;

    for word in words {
        let text = word.as_ref();
        let width = measure(text, font, size)?;
        let cost = width + gap;

        if !current.is_empty() && current_width + cost > max_width {
            lines.push(Line {
                words: std::mem::take(&mut current),
                gap,
                is_last: false,
            });
            current_width = 0.0;
        }
        current.push(Word {
            text: text.to_string(),
            width,
        });
        current_width += cost;
    }

    if !current.is_empty() {
        lines.push(Line {
            words: current,
            gap,
            is_last: false,
        });
    }
    if let Some(last) = lines.last_mut() {
        last.is_last = true;
    }
    Ok(lines)
}
