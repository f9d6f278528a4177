// src/documents/pdf.rs
//
// Academic report renderer. Flows the structured report schema onto A4
// pages with the builtin Helvetica family: title page, table of contents,
// numbered sections/subsections, typed citation templates, appendices.
// Every page carries a fixed header line and a bottom-right page stamp.
//
// Builtin PDF fonts expose no glyph metrics, so line wrapping and
// centering work from an average character width. That is plenty for
// left-aligned body text.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};

use super::schema::{format_citation, ReportDocument, StyledSpan};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_LEFT_MM: f32 = 18.0;
const MARGIN_RIGHT_MM: f32 = 18.0;
const MARGIN_TOP_MM: f32 = 22.0;
const MARGIN_BOTTOM_MM: f32 = 22.0;

const PT_TO_MM: f32 = 0.352_778;
// Average glyph advance for Helvetica, as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

const PAGE_HEADER: &str = "Research Report";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

struct Style {
    size_pt: f32,
    color: (f32, f32, f32),
}

const TITLE: Style = Style { size_pt: 24.0, color: BLACK };
const METADATA: Style = Style { size_pt: 11.0, color: GREY };
const HEADING1: Style = Style { size_pt: 18.0, color: DARK_BLUE };
const HEADING2: Style = Style { size_pt: 14.0, color: DARK_BLUE };
const BODY: Style = Style { size_pt: 11.0, color: BLACK };
const CITATION: Style = Style { size_pt: 10.0, color: BLACK };
const STAMP: Style = Style { size_pt: 8.0, color: BLACK };

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const GREY: (f32, f32, f32) = (0.45, 0.45, 0.45);
const DARK_BLUE: (f32, f32, f32) = (0.0, 0.0, 0.55);

pub fn build_pdf(report: &ReportDocument) -> Result<Vec<u8>, String> {
    let (doc, page, layer) = PdfDocument::new(
        "Research Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| format!("font error: {}", e))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| format!("font error: {}", e))?,
        oblique: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| format!("font error: {}", e))?,
    };

    let mut writer = PageWriter {
        doc: &doc,
        fonts: &fonts,
        layer: doc.get_page(page).get_layer(layer),
        page_number: 1,
        cursor_mm: MARGIN_TOP_MM,
    };
    writer.stamp_page();

    render_title_page(&mut writer, report);
    render_table_of_contents(&mut writer, report);
    render_body(&mut writer, report);
    render_references(&mut writer, report);
    render_appendices(&mut writer, report);
    drop(writer);

    doc.save_to_bytes().map_err(|e| format!("pdf error: {}", e))
}

fn render_title_page(w: &mut PageWriter, report: &ReportDocument) {
    let meta = &report.metadata;

    w.advance(38.0);
    let title = meta.title.as_deref().unwrap_or("Research Report");
    w.write_centered(title, Bold, &TITLE);
    w.advance(12.0);

    if let Some(author) = meta.author.as_deref() {
        w.write_centered(&format!("Author: {}", author), Regular, &METADATA);
    }
    if let Some(date) = meta.date.as_deref() {
        w.write_centered(&format!("Date: {}", date), Regular, &METADATA);
    }
    if let Some(document_type) = meta.document_type.as_deref() {
        w.write_centered(&format!("Document Type: {}", document_type), Regular, &METADATA);
    }

    w.new_page();
}

fn render_table_of_contents(w: &mut PageWriter, report: &ReportDocument) {
    w.write_wrapped("Table of Contents", Bold, &HEADING1, 0.0);
    w.advance(4.0);
    for (idx, section) in report.sections.iter().enumerate() {
        let heading = section.heading.as_deref().unwrap_or("Untitled Section");
        w.write_wrapped(&format!("{}. {}", idx + 1, heading), Regular, &BODY, 0.0);
    }
    w.new_page();
}

fn render_body(w: &mut PageWriter, report: &ReportDocument) {
    for (idx, section) in report.sections.iter().enumerate() {
        let number = idx + 1;
        let heading = section.heading.as_deref().unwrap_or("Untitled Section");

        if section.level == 1 {
            w.ensure_space(14.0);
            w.advance(4.0);
            w.write_wrapped(&format!("{}. {}", number, heading), Bold, &HEADING1, 0.0);
        } else {
            w.ensure_space(10.0);
            w.advance(3.0);
            w.write_wrapped(heading, Bold, &HEADING2, 0.0);
        }
        w.advance(2.0);

        for paragraph in &section.paragraphs {
            if paragraph.trim().is_empty() {
                continue;
            }
            w.write_wrapped(paragraph, Regular, &BODY, 0.0);
            w.advance(3.0);
        }

        for (sub_idx, subsection) in section.subsections.iter().enumerate() {
            let sub_heading = subsection
                .heading
                .as_deref()
                .unwrap_or("Untitled Subsection");
            w.ensure_space(10.0);
            w.advance(3.0);
            w.write_wrapped(
                &format!("{}.{} {}", number, sub_idx + 1, sub_heading),
                Bold,
                &HEADING2,
                0.0,
            );
            w.advance(2.0);

            for paragraph in &subsection.paragraphs {
                if paragraph.trim().is_empty() {
                    continue;
                }
                w.write_wrapped(paragraph, Regular, &BODY, 0.0);
                w.advance(3.0);
            }
        }

        if section.level == 1 {
            w.advance(7.5);
        }
    }
}

fn render_references(w: &mut PageWriter, report: &ReportDocument) {
    if report.citations.is_empty() {
        return;
    }
    w.new_page();
    w.write_wrapped("References", Bold, &HEADING1, 0.0);
    w.advance(4.0);
    for citation in &report.citations {
        let spans = format_citation(citation);
        w.write_spans(&spans, &CITATION, 7.0);
        w.advance(2.0);
    }
}

fn render_appendices(w: &mut PageWriter, report: &ReportDocument) {
    if report.appendices.is_empty() {
        return;
    }
    w.new_page();
    for (idx, appendix) in report.appendices.iter().enumerate() {
        let title = appendix.title.as_deref().unwrap_or("Supplementary Material");
        w.ensure_space(14.0);
        w.write_wrapped(&format!("Appendix {}: {}", idx + 1, title), Bold, &HEADING1, 0.0);
        w.advance(2.0);
        for block in &appendix.content {
            if block.trim().is_empty() {
                continue;
            }
            w.write_wrapped(block, Regular, &BODY, 0.0);
            w.advance(3.0);
        }
        w.advance(6.0);
    }
}

#[derive(Clone, Copy, PartialEq)]
enum FontKind {
    Regular,
    Bold,
    Oblique,
}
use FontKind::{Bold, Oblique, Regular};

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    fonts: &'a Fonts,
    layer: PdfLayerReference,
    page_number: u32,
    cursor_mm: f32,
}

impl<'a> PageWriter<'a> {
    fn font(&self, kind: FontKind) -> &IndirectFontRef {
        match kind {
            Regular => &self.fonts.regular,
            Bold => &self.fonts.bold,
            Oblique => &self.fonts.oblique,
        }
    }

    fn set_color(&self, color: (f32, f32, f32)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_number += 1;
        self.cursor_mm = MARGIN_TOP_MM;
        self.stamp_page();
    }

    /// Fixed header top-left, "Page N" bottom-right.
    fn stamp_page(&self) {
        self.set_color(STAMP.color);
        self.layer.use_text(
            PAGE_HEADER,
            STAMP.size_pt,
            Mm(MARGIN_LEFT_MM),
            Mm(PAGE_HEIGHT_MM - 11.0),
            &self.fonts.regular,
        );

        let stamp = format!("Page {}", self.page_number);
        let stamp_width = text_width_mm(&stamp, STAMP.size_pt);
        self.layer.use_text(
            stamp,
            STAMP.size_pt,
            Mm(PAGE_WIDTH_MM - MARGIN_RIGHT_MM - stamp_width),
            Mm(11.0),
            &self.fonts.regular,
        );
    }

    fn advance(&mut self, mm: f32) {
        self.cursor_mm += mm;
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.cursor_mm + needed_mm > PAGE_HEIGHT_MM - MARGIN_BOTTOM_MM {
            self.new_page();
        }
    }

    fn line_height_mm(style: &Style) -> f32 {
        style.size_pt * 1.4 * PT_TO_MM
    }

    fn write_line(&mut self, text: &str, kind: FontKind, style: &Style, x_mm: f32) {
        let line_height = Self::line_height_mm(style);
        self.ensure_space(line_height);
        self.cursor_mm += line_height;
        self.set_color(style.color);
        self.layer.use_text(
            text,
            style.size_pt,
            Mm(x_mm),
            Mm(PAGE_HEIGHT_MM - self.cursor_mm),
            self.font(kind),
        );
    }

    fn write_centered(&mut self, text: &str, kind: FontKind, style: &Style) {
        let width = text_width_mm(text, style.size_pt);
        let x = ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_LEFT_MM);
        self.write_line(text, kind, style, x);
    }

    fn write_wrapped(&mut self, text: &str, kind: FontKind, style: &Style, indent_mm: f32) {
        let usable_mm = PAGE_WIDTH_MM - MARGIN_LEFT_MM - MARGIN_RIGHT_MM - indent_mm;
        let max_chars = max_chars_per_line(usable_mm, style.size_pt);
        for line in wrap_text(text, max_chars) {
            self.write_line(&line, kind, style, MARGIN_LEFT_MM + indent_mm);
        }
    }

    /// Writes a run of styled spans (citations) with wrapping. Words carry
    /// their span's italic flag across line breaks.
    fn write_spans(&mut self, spans: &[StyledSpan], style: &Style, indent_mm: f32) {
        let usable_mm = PAGE_WIDTH_MM - MARGIN_LEFT_MM - MARGIN_RIGHT_MM - indent_mm;
        let max_chars = max_chars_per_line(usable_mm, style.size_pt);

        let mut words: Vec<(String, bool)> = Vec::new();
        for span in spans {
            for word in span.text.split_whitespace() {
                words.push((word.to_string(), span.italic));
            }
        }
        // Reattach punctuation-only fragments ("." after an italic venue)
        // to the preceding word so they do not wrap alone.
        let mut merged: Vec<(String, bool)> = Vec::new();
        for (word, italic) in words {
            if word.chars().all(|c| c.is_ascii_punctuation()) {
                if let Some(last) = merged.last_mut() {
                    last.0.push_str(&word);
                    continue;
                }
            }
            merged.push((word, italic));
        }

        let mut line: Vec<(String, bool)> = Vec::new();
        let mut line_len = 0usize;
        for (word, italic) in merged {
            let added = word.chars().count() + usize::from(!line.is_empty());
            if line_len + added > max_chars && !line.is_empty() {
                self.flush_span_line(&line, style, indent_mm);
                line.clear();
                line_len = 0;
            }
            line_len += word.chars().count() + usize::from(!line.is_empty());
            line.push((word, italic));
        }
        if !line.is_empty() {
            self.flush_span_line(&line, style, indent_mm);
        }
    }

    fn flush_span_line(&mut self, words: &[(String, bool)], style: &Style, indent_mm: f32) {
        let line_height = Self::line_height_mm(style);
        self.ensure_space(line_height);
        self.cursor_mm += line_height;
        self.set_color(style.color);

        let y = Mm(PAGE_HEIGHT_MM - self.cursor_mm);
        let mut x_mm = MARGIN_LEFT_MM + indent_mm;
        for (word, italic) in words {
            let font = if *italic { Oblique } else { Regular };
            self.layer
                .use_text(word.clone(), style.size_pt, Mm(x_mm), y, self.font(font));
            x_mm += text_width_mm(word, style.size_pt) + text_width_mm(" ", style.size_pt);
        }
    }
}

fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * AVG_CHAR_WIDTH * size_pt * PT_TO_MM
}

fn max_chars_per_line(usable_mm: f32, size_pt: f32) -> usize {
    let chars = usable_mm / (AVG_CHAR_WIDTH * size_pt * PT_TO_MM);
    (chars as usize).max(1)
}

/// Greedy word wrap; words longer than a line are hard-split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current_len + word_len + usize::from(!current.is_empty()) <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if word_len <= max_chars {
                current.push_str(word);
            } else {
                let mut rest: Vec<char> = word.chars().collect();
                while rest.len() > max_chars {
                    lines.push(rest.drain(..max_chars).collect());
                }
                current = rest.into_iter().collect();
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::schema::ReportDocument;

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 15);
        assert!(lines.iter().all(|l| l.chars().count() <= 15));
        assert_eq!(
            lines.join(" "),
            "the quick brown fox jumps over the lazy dog"
        );
    }

    #[test]
    fn test_wrap_text_splits_oversized_words() {
        let lines = wrap_text("supercalifragilisticexpialidocious", 10);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_text_empty_input() {
        assert!(wrap_text("", 20).is_empty());
        assert!(wrap_text("   ", 20).is_empty());
    }

    #[test]
    fn test_build_pdf_produces_pdf_bytes() {
        let report: ReportDocument = serde_json::from_str(
            r#"{
                "metadata": {"title": "On Cats", "author": "J. Smith",
                             "date": "2026-01-01", "document_type": "Report"},
                "sections": [
                    {"heading": "Introduction", "level": 1,
                     "paragraphs": ["Cats are great.", "   ", "Very great."],
                     "subsections": [{"heading": "Scope", "paragraphs": ["All cats."]}]}
                ],
                "citations": [{"authors": ["Smith, J."], "year": "2021",
                               "title": "On Cats", "venue": "Journal of Felines",
                               "type": "journal"}],
                "appendices": [{"title": "Data", "content": ["Raw numbers."]}]
            }"#,
        )
        .unwrap();

        let bytes = build_pdf(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_build_pdf_handles_empty_report() {
        let report = ReportDocument::default();
        let bytes = build_pdf(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
