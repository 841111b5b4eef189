//! Static font-metric tables for the two standard PDF fonts the CV uses.
//!
//! Widths are glyph advances in 1/1000 em, taken from the Adobe core-14 AFM
//! files for Helvetica and Helvetica-Bold. Because both fonts are standard
//! Type1 fonts every PDF viewer ships, measuring against these tables matches
//! what the viewer draws without embedding or parsing any font file.
//!
//! ASCII 0x20..=0x7E is looked up by index (`char as usize - 32`). The
//! WinAnsi extras the renderer emits and the Latin-1 supplement are handled
//! separately; everything else is a measurement failure.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Font enum
// ────────────────────────────────────────────────────────────────────────────

/// The fonts available to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Font {
    /// Body text, job title, contact line.
    Helvetica,
    /// Name, section headings, item titles.
    HelveticaBold,
}

impl Font {
    /// PostScript base font name written into the PDF font dictionary.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Immutable page dimensions for one render, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// ISO A4 (210 × 297 mm) with half-inch margins on every side.
    pub fn a4() -> Self {
        let margin = 0.5 * POINTS_PER_INCH;
        PageGeometry {
            width: 595.2756,
            height: 841.8898,
            margin_left: margin,
            margin_right: margin,
            margin_top: margin,
            margin_bottom: margin,
        }
    }

    /// Usable text width between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Baseline of the first line on a fresh page.
    pub fn top_y(&self) -> f32 {
        self.height - self.margin_top
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static advance-width table for one font.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: Font,
    widths: [u16; 95],
    /// Used for Latin-1 supplement glyphs (accented letters, symbols).
    pub latin1_width: u16,
}

impl FontMetricTable {
    /// Advance width of a single character in 1/1000 em, if the font can show it.
    pub fn glyph_width(&self, c: char) -> Option<u16> {
        let code = c as u32;
        match code {
            32..=126 => Some(self.widths[(code - 32) as usize]),
            0xA0..=0xFF => Some(self.latin1_width),
            _ => winansi_extra_width(c),
        }
    }

    /// Measures the rendered width of `text` at `size` points.
    ///
    /// Fails on the first character outside the supported repertoire.
    pub fn measure(&self, text: &str, size: f32) -> Result<f32, LayoutError> {
        let mut units: u32 = 0;
        for c in text.chars() {
            let w = self
                .glyph_width(c)
                .ok_or_else(|| LayoutError::UnsupportedGlyph {
                    glyph: c,
                    text: text.to_string(),
                })?;
            units += u32::from(w);
        }
        Ok(units as f32 * size / 1000.0)
    }

    /// Width of one space glyph at `size` points.
    pub fn space_width(&self, size: f32) -> f32 {
        f32::from(self.widths[0]) * size / 1000.0
    }
}

/// Widths for the WinAnsi glyphs outside Latin-1 that CV text commonly carries.
/// Identical across both Helvetica weights.
fn winansi_extra_width(c: char) -> Option<u16> {
    match c {
        '•' => Some(350),
        '–' => Some(556),
        '—' => Some(1000),
        '‘' | '’' => Some(278),
        '“' | '”' => Some(500),
        '…' => Some(1000),
        '€' => Some(556),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    font: Font::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    latin1_width: 556,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    font: Font::HelveticaBold,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    latin1_width: 611,
};

/// Returns the static metric table for a font.
pub fn get_metrics(font: Font) -> &'static FontMetricTable {
    match font {
        Font::Helvetica => &HELVETICA_TABLE,
        Font::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}

/// Measures `text` in `font` at `size` points.
pub fn measure(text: &str, font: Font, size: f32) -> Result<f32, LayoutError> {
    get_metrics(font).measure(text, size)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
