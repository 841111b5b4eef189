//! Paragraph flow: split text into paragraphs, pack, justify, draw, and
//! advance the vertical cursor.

use serde::{Deserialize, Serialize};

use crate::layout::canvas::Canvas;
use crate::layout::font_metrics::Font;
use crate::layout::justify::{justify, PlacedWord};
use crate::layout::line_breaker::{pack, Line};
use crate::layout::LayoutError;

/// Extra vertical space after each non-empty paragraph.
pub const PARAGRAPH_GAP: f32 = 2.0;

const ELLIPSIS: &str = "...";

/// Words of one justified line, offsets relative to the paragraph's left edge.
pub type JustifiedLine = Vec<PlacedWord>;

/// Font, size, and leading for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub line_height: f32,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32, line_height: f32) -> Self {
        Self {
            font,
            size,
            line_height,
        }
    }
}

/// Splits text at blank lines, or after a sentence terminator (`.`, `!`, `?`)
/// followed by two or more whitespace characters.
///
/// Always returns at least one paragraph; paragraphs may be empty.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            let start = i;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            let run = &chars[start..i];
            let blank_line = run.iter().filter(|ch| **ch == '\n').count() >= 2;
            let after_sentence = run.len() >= 2
                && current
                    .chars()
                    .last()
                    .is_some_and(|last| matches!(last, '.' | '!' | '?'));

            if blank_line || after_sentence {
                paragraphs.push(std::mem::take(&mut current));
            } else {
                current.extend(run.iter());
            }
            continue;
        }

        current.push(c);
        i += 1;
    }
    paragraphs.push(current);
    paragraphs
}

/// Packs and justifies every paragraph of `text` at `width`, without drawing.
///
/// One entry per paragraph from `split_paragraphs`; an empty paragraph has no
/// lines.
pub fn justify_paragraphs<C: Canvas>(
    canvas: &C,
    text: &str,
    width: f32,
    style: TextStyle,
) -> Result<Vec<Vec<JustifiedLine>>, LayoutError> {
    split_paragraphs(text)
        .iter()
        .map(|paragraph| {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            let lines = pack_words(canvas, &words, width, style)?;
            Ok(lines.iter().map(|line| justify(line, width)).collect())
        })
        .collect()
}

/// Draws `text` as justified paragraphs starting at baseline `y` and returns
/// the baseline below the last paragraph.
///
/// Each line advances `y` by `line_height`; each non-empty paragraph adds
/// `PARAGRAPH_GAP`. An empty paragraph draws nothing and advances exactly one
/// `line_height`.
pub fn flow<C: Canvas>(
    canvas: &mut C,
    text: &str,
    x: f32,
    y: f32,
    width: f32,
    style: TextStyle,
) -> Result<f32, LayoutError> {
    let mut y = y;
    for lines in justify_paragraphs(canvas, text, width, style)? {
        if lines.is_empty() {
            y -= style.line_height;
            continue;
        }
        for line in &lines {
            for placed in line {
                canvas.draw_text(x + placed.x_offset, y, &placed.text, style.font, style.size)?;
            }
            y -= style.line_height;
        }
        y -= PARAGRAPH_GAP;
    }
    Ok(y)
}

/// Packs whitespace-delimited `text` into left-aligned line strings no wider
/// than `width`. Empty text gives no lines.
pub fn wrap_lines<C: Canvas>(
    canvas: &C,
    text: &str,
    width: f32,
    style: TextStyle,
) -> Result<Vec<String>, LayoutError> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let lines = pack_words(canvas, &words, width, style)?;
    Ok(lines.iter().map(Line::text).collect())
}

/// Shortens `text` with a trailing "..." until it fits in `max_width`.
///
/// Glyph widths are additive, so the cut point is found in one pass over the
/// characters.
pub fn ellipsize_to_width<C: Canvas>(
    canvas: &C,
    text: &str,
    max_width: f32,
    style: TextStyle,
) -> Result<String, LayoutError> {
    if canvas.measure_text_width(text, style.font, style.size)? <= max_width {
        return Ok(text.to_string());
    }
    // Small slack absorbs per-glyph rounding against a whole-string measure.
    let budget =
        max_width - canvas.measure_text_width(ELLIPSIS, style.font, style.size)? - 1e-3;
    let mut used = 0.0_f32;
    let mut cut = 0;
    let mut buf = [0u8; 4];
    for (i, c) in text.char_indices() {
        let width = canvas.measure_text_width(c.encode_utf8(&mut buf), style.font, style.size)?;
        if used + width > budget {
            break;
        }
        used += width;
        cut = i + c.len_utf8();
    }
    Ok(format!("{}{ELLIPSIS}", text[..cut].trim_end()))
}

fn pack_words<C: Canvas>(
    canvas: &C,
    words: &[&str],
    width: f32,
    style: TextStyle,
) -> Result<Vec<Line>, LayoutError> {
    let gap = canvas.measure_text_width(" ", style.font, style.size)?;
    pack(
        words,
        |text, font, size| canvas.measure_text_width(text, font, size),
        width,
        style.font,
        style.size,
        gap,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::canvas::{DrawCommand, RecordingCanvas};

    const BODY: TextStyle = TextStyle::new(Font::Helvetica, 10.0, 12.0);

    const PROSE: &str = "Platform engineer with eight years of experience building \
        reliable distributed systems, leading small teams, and mentoring engineers. \
        Comfortable across the stack from kernel tuning to product analytics, with a \
        strong bias for measurable outcomes and clear written communication.";

    #[test]
    fn test_split_paragraphs_blank_lines() {
        let paras = split_paragraphs("first para\n\nsecond para\n  \n third");
        assert_eq!(paras, vec!["first para", "second para", "third"]);
    }

    #[test]
    fn test_split_paragraphs_single_newline_is_not_a_break() {
        let paras = split_paragraphs("one\ntwo");
        assert_eq!(paras, vec!["one\ntwo"]);
    }

    #[test]
    fn test_split_paragraphs_sentence_with_extra_space() {
        let paras = split_paragraphs("Ends here.  Starts again. Same para.");
        assert_eq!(paras, vec!["Ends here.", "Starts again. Same para."]);
    }

    #[test]
    fn test_split_paragraphs_empty_text_is_one_empty_paragraph() {
        assert_eq!(split_paragraphs(""), vec![String::new()]);
    }

    #[test]
    fn test_flow_empty_text_advances_one_line() {
        let mut canvas = RecordingCanvas::new();
        let y = flow(&mut canvas, "", 36.0, 700.0, 500.0, BODY).unwrap();
        assert_eq!(y, 688.0);
        assert!(canvas.texts().is_empty(), "empty text must draw nothing");
    }

    #[test]
    fn test_flow_returns_cursor_below_paragraph() {
        let mut canvas = RecordingCanvas::new();
        let width = 300.0;
        let lines = wrap_lines(&canvas, PROSE, width, BODY).unwrap();
        let y = flow(&mut canvas, PROSE, 36.0, 700.0, width, BODY).unwrap();
        let expected = 700.0 - lines.len() as f32 * 12.0 - PARAGRAPH_GAP;
        assert!((y - expected).abs() < 1e-3, "expected {expected}, got {y}");
        assert!(lines.len() > 2);
    }

    #[test]
    fn test_flow_justifies_all_but_last_line() {
        let mut canvas = RecordingCanvas::new();
        let x = 36.0;
        let width = 300.0;
        flow(&mut canvas, PROSE, x, 700.0, width, BODY).unwrap();

        // Group words by baseline and check each line's right edge.
        let mut rows: Vec<(f32, Vec<(f32, String)>)> = Vec::new();
        for cmd in &canvas.pages()[0].commands {
            if let DrawCommand::Text { x, y, text, .. } = cmd {
                match rows.last_mut() {
                    Some((row_y, words)) if *row_y == *y => words.push((*x, text.clone())),
                    _ => rows.push((*y, vec![(*x, text.clone())])),
                }
            }
        }
        assert!(rows.len() > 2);
        let (last_row, full_rows) = rows.split_last().unwrap();
        for (_, words) in full_rows {
            let (wx, wtext) = words.last().unwrap();
            let w = canvas
                .measure_text_width(wtext, Font::Helvetica, 10.0)
                .unwrap();
            let edge = wx + w;
            assert!(
                (edge - (x + width)).abs() < 0.01,
                "justified line should end at {}, got {edge}",
                x + width
            );
        }
        // Last line keeps natural spacing.
        let gap = canvas.measure_text_width(" ", Font::Helvetica, 10.0).unwrap();
        let words = &last_row.1;
        for pair in words.windows(2) {
            let w = canvas
                .measure_text_width(&pair[0].1, Font::Helvetica, 10.0)
                .unwrap();
            assert!((pair[1].0 - (pair[0].0 + w + gap)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_flow_paragraph_breaks_add_gap() {
        let mut canvas = RecordingCanvas::new();
        let y = flow(&mut canvas, "One.\n\nTwo.", 36.0, 700.0, 500.0, BODY).unwrap();
        assert_eq!(y, 700.0 - 2.0 * (12.0 + PARAGRAPH_GAP));
        assert_eq!(canvas.texts(), vec!["One.", "Two."]);
    }

    #[test]
    fn test_wrap_lines_empty() {
        let canvas = RecordingCanvas::new();
        assert!(wrap_lines(&canvas, "   ", 100.0, BODY).unwrap().is_empty());
    }

    #[test]
    fn test_ellipsize_to_width() {
        let canvas = RecordingCanvas::new();
        let long = "Organised weekly coding workshops for underrepresented students".repeat(3);
        let out = ellipsize_to_width(&canvas, &long, 200.0, BODY).unwrap();
        assert!(out.ends_with("..."));
        assert!(canvas.measure_text_width(&out, Font::Helvetica, 10.0).unwrap() <= 200.0 + 1e-3);

        let short = ellipsize_to_width(&canvas, "fits", 200.0, BODY).unwrap();
        assert_eq!(short, "fits");
    }

    #[test]
    fn test_ellipsize_huge_input_keeps_longest_fitting_prefix() {
        let canvas = RecordingCanvas::new();
        let huge = "W".repeat(100_000);
        let out = ellipsize_to_width(&canvas, &huge, 200.0, BODY).unwrap();
        let width = canvas.measure_text_width(&out, Font::Helvetica, 10.0).unwrap();
        assert!(width <= 200.0 + 1e-3, "ellipsized width {width} exceeds 200");

        let kept = out.trim_end_matches("...");
        assert!(!kept.is_empty(), "some prefix must survive");
        let one_more = format!("W{kept}...");
        let wider = canvas.measure_text_width(&one_more, Font::Helvetica, 10.0).unwrap();
        assert!(wider > 200.0, "one more glyph should not fit, got {wider}");
    }

    #[test]
    fn test_ellipsize_trims_space_before_ellipsis() {
        let canvas = RecordingCanvas::new();
        let text = format!("ab {}", "x".repeat(200));
        // Room for "ab " plus "..." but not for any "x".
        let width = canvas.measure_text_width("ab ...", Font::Helvetica, 10.0).unwrap() + 0.5;
        let out = ellipsize_to_width(&canvas, &text, width, BODY).unwrap();
        assert_eq!(out, "ab...");
    }

    #[test]
    fn test_justify_paragraphs_matches_flow() {
        let mut canvas = RecordingCanvas::new();
        let text = format!("{PROSE}\n\n\n\nShort tail.");
        let paragraphs = justify_paragraphs(&canvas, &text, 300.0, BODY).unwrap();
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[0].len() > 2);
        assert_eq!(paragraphs[1].len(), 1);

        flow(&mut canvas, &text, 36.0, 700.0, 300.0, BODY).unwrap();
        let drawn: usize = paragraphs.iter().flatten().map(|line| line.len()).sum();
        assert_eq!(canvas.texts().len(), drawn);
    }

    #[test]
    fn test_justify_paragraphs_empty_paragraph_has_no_lines() {
        let canvas = RecordingCanvas::new();
        let paragraphs = justify_paragraphs(&canvas, "", 300.0, BODY).unwrap();
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].is_empty());
    }
}
