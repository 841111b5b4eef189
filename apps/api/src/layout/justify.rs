//! Full justification of packed lines.

use crate::layout::line_breaker::Line;

/// A word and its x offset from the start of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub x_offset: f32,
}

/// Distributes the slack of `line` across its gaps so the last word's right
/// edge lands on `target_width`.
///
/// The last line of a paragraph, a single-word line, and a line whose
/// natural width already reaches the target are left-aligned with the
/// natural gap instead.
pub fn justify(line: &Line, target_width: f32) -> Vec<PlacedWord> {
    let gaps = line.word_count().saturating_sub(1);
    let natural = line.natural_width();

    let extra = if line.is_last || gaps == 0 || natural >= target_width {
        0.0
    } else {
        (target_width - natural) / gaps as f32
    };

    let mut placed = Vec::with_capacity(line.word_count());
    let mut x = 0.0_f32;
    for word in &line.words {
        placed.push(PlacedWord {
            text: word.text.clone(),
            x_offset: x,
        });
        x += word.width + line.gap + extra;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::line_breaker::Word;

    fn make_line(widths: &[f32], gap: f32, is_last: bool) -> Line {
        Line {
            words: widths
                .iter()
                .enumerate()
                .map(|(i, w)| Word {
                    text: format!("w{i}"),
                    width: *w,
                })
                .collect(),
            gap,
            is_last,
        }
    }

    fn right_edge(line: &Line, placed: &[PlacedWord]) -> f32 {
        let last = placed.last().unwrap();
        last.x_offset + line.words.last().unwrap().width
    }

    #[test]
    fn test_justified_line_hits_target_exactly() {
        let line = make_line(&[31.2, 12.7, 48.05, 20.0, 9.9], 2.78, false);
        let placed = justify(&line, 300.0);
        assert_eq!(placed.len(), 5);
        assert_eq!(placed[0].x_offset, 0.0);
        let edge = right_edge(&line, &placed);
        assert!(
            (edge - 300.0).abs() < 0.01,
            "right edge should be 300.0, got {edge}"
        );
    }

    #[test]
    fn test_justified_gaps_are_uniform() {
        let line = make_line(&[10.0, 10.0, 10.0], 3.0, false);
        let placed = justify(&line, 100.0);
        // natural = 36, slack = 64 over 2 gaps → 32 extra each → step 45
        assert!((placed[1].x_offset - 45.0).abs() < 1e-4);
        assert!((placed[2].x_offset - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_last_line_is_not_stretched() {
        let line = make_line(&[10.0, 20.0, 30.0], 2.5, true);
        let placed = justify(&line, 500.0);
        assert_eq!(placed[1].x_offset, 12.5);
        assert_eq!(placed[2].x_offset, 35.0);
    }

    #[test]
    fn test_single_word_non_last_line_is_left_aligned() {
        let line = make_line(&[400.0], 2.5, false);
        let placed = justify(&line, 300.0);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].x_offset, 0.0);
        assert!(placed[0].x_offset.is_finite());
    }

    #[test]
    fn test_full_line_is_not_compressed() {
        let line = make_line(&[60.0, 60.0], 5.0, false);
        let placed = justify(&line, 100.0);
        assert_eq!(placed[1].x_offset, 65.0);
    }

    #[test]
    fn test_word_order_preserved() {
        let line = make_line(&[5.0, 6.0, 7.0], 1.0, false);
        let placed = justify(&line, 50.0);
        let texts: Vec<&str> = placed.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["w0", "w1", "w2"]);
        assert!(placed.windows(2).all(|p| p[0].x_offset < p[1].x_offset));
    }
}
