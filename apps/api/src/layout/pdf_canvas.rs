//! PDF canvas backed by `pdf-writer`.
//!
//! Text is set in the standard Type1 fonts with WinAnsiEncoding, so no font
//! program is embedded and the widths in `font_metrics` are exactly what the
//! viewer uses. Each page gets one content stream; pages are assembled into
//! the document on `finalize`.

use chrono::{DateTime, Datelike, Timelike, Utc};
use pdf_writer::{Content, Date, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::layout::canvas::Canvas;
use crate::layout::font_metrics::{Font, PageGeometry};
use crate::layout::LayoutError;

const PRODUCER: &str = concat!("atscv-api ", env!("CARGO_PKG_VERSION"));
const FONTS: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];

pub struct PdfCanvas {
    geometry: PageGeometry,
    pages: Vec<Content>,
    title: Option<String>,
    created_at: DateTime<Utc>,
}

impl PdfCanvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Content::new()],
            title: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the document-info title (the candidate's name).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.trim().is_empty() {
            self.title = Some(title);
        }
        self
    }

    pub fn with_creation_date(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    fn current(&mut self) -> &mut Content {
        if self.pages.is_empty() {
            self.pages.push(Content::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn pdf_date(&self) -> Date {
        let t = self.created_at;
        Date::new(t.year().clamp(0, 9999) as u16)
            .month(t.month() as u8)
            .day(t.day() as u8)
            .hour(t.hour() as u8)
            .minute(t.minute() as u8)
            .second(t.second() as u8)
    }
}

impl Canvas for PdfCanvas {
    fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font: Font,
        size: f32,
    ) -> Result<(), LayoutError> {
        let encoded = encode_winansi(text)?;
        self.current()
            .begin_text()
            .set_font(Name(font.resource_name().as_bytes()), size)
            .next_line(x, y)
            .show(Str(&encoded))
            .end_text();
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
        self.current()
            .set_line_width(line_width)
            .move_to(x1, y1)
            .line_to(x2, y2)
            .stroke();
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), LayoutError> {
        self.pages.push(Content::new());
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finalize(self) -> Result<Vec<u8>, LayoutError> {
        let date = self.pdf_date();
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();
        let font_ids: Vec<(Font, Ref)> = FONTS.iter().map(|f| (*f, alloc())).collect();
        let page_refs: Vec<(Ref, Ref)> = self.pages.iter().map(|_| (alloc(), alloc())).collect();

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_refs.iter().map(|(page_id, _)| *page_id))
            .count(page_refs.len() as i32);

        for (font, font_id) in &font_ids {
            pdf.type1_font(*font_id)
                .base_font(Name(font.base_name().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        {
            let mut info = pdf.document_info(info_id);
            info.producer(TextStr(PRODUCER)).creation_date(date);
            if let Some(title) = &self.title {
                info.title(TextStr(title.as_str()));
            }
        }

        let g = self.geometry;
        for (content, (page_id, content_id)) in self.pages.into_iter().zip(page_refs.iter()) {
            {
                let mut page = pdf.page(*page_id);
                page.media_box(Rect::new(0.0, 0.0, g.width, g.height))
                    .parent(pages_id)
                    .contents(*content_id);
                let mut resources = page.resources();
                let mut fonts = resources.fonts();
                for (font, font_id) in &font_ids {
                    fonts.pair(Name(font.resource_name().as_bytes()), *font_id);
                }
            }
            pdf.stream(*content_id, &content.finish());
        }

        Ok(pdf.finish())
    }
}

/// Encodes text as WinAnsi (Windows-1252) bytes for a simple-font `Tj`.
pub fn encode_winansi(text: &str) -> Result<Vec<u8>, LayoutError> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            let byte = match c {
                ' '..='~' => Some(code as u8),
                '\u{A0}'..='\u{FF}' => Some(code as u8),
                '€' => Some(0x80),
                '…' => Some(0x85),
                '‘' => Some(0x91),
                '’' => Some(0x92),
                '“' => Some(0x93),
                '”' => Some(0x94),
                '•' => Some(0x95),
                '–' => Some(0x96),
                '—' => Some(0x97),
                _ => None,
            };
            byte.ok_or_else(|| LayoutError::UnsupportedGlyph {
                glyph: c,
                text: text.to_string(),
            })
        })
        .collect()
}
