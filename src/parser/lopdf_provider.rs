//! Page text provider backed by lopdf.
//!
//! Walks each page's content stream, tracks the text matrix and emits one
//! [`Span`] per text-showing operator with an approximate top-down bounding
//! box. Glyph widths are not read from the font; a span's width is estimated
//! from its character count.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect;
use crate::error::{Error, Result};
use crate::model::{BBox, PageSpans, Span};

use super::options::ParseOptions;
use super::provider::{PageIter, PageTextProvider};

const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Threshold for inserting a word space on a TJ adjustment (1/1000 em).
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Average glyph advance as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// Ascender height as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// PDF page text provider.
pub struct LopdfProvider {
    doc: LopdfDocument,
    options: ParseOptions,
}

impl LopdfProvider {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let header = detect::sniff_path(path)?;
        log::debug!("{}: {}", path.display(), header);

        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc, options })
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Load a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        detect::sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc, options })
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// PDF version from the file header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// The options this provider reads with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Extract the spans of one page (1-indexed).
    pub fn extract_page(&self, page_num: u32) -> Result<PageSpans> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;
        self.read_page(page_num, page_id)
    }

    fn read_page(&self, page_num: u32, page_id: ObjectId) -> Result<PageSpans> {
        let [llx, lly, urx, ury] = self.media_box(page_id);
        let mut page = PageSpans::new(
            page_num.saturating_sub(1) as usize,
            (urx - llx).abs(),
            (ury - lly).abs(),
        );

        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = self.page_content(page_id)?;
        if content.is_empty() {
            return Ok(page);
        }

        let origin = (llx, ury.max(lly));
        page.spans = self.parse_content_stream(&content, &fonts, origin, page.index)?;
        Ok(page)
    }

    /// Resolve the page's MediaBox, walking up the page tree when inherited.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let mut current = Some(page_id);
        let mut depth = 0;

        while let Some(id) = current {
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            if let Some(rect) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|obj| self.resolve(obj).as_array().ok())
                .and_then(|arr| rect_from_array(arr))
            {
                return rect;
            }

            depth += 1;
            if depth > 32 {
                break;
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }

        LETTER
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Get the concatenated, decompressed page content.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let refs: Vec<ObjectId> = match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Array(arr)) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
                _ => vec![*r],
            },
            Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
        };

        let mut content = Vec::new();
        for r in refs {
            if let Ok(Object::Stream(s)) = self.doc.get_object(r) {
                let data = s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone());
                content.extend_from_slice(&data);
                content.push(b'\n');
            }
        }
        Ok(content)
    }

    /// Parse a content stream into spans.
    ///
    /// `origin` is the top-left corner of the MediaBox in PDF user space.
    fn parse_content_stream(
        &self,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        origin: (f32, f32),
        page_index: usize,
    ) -> Result<Vec<Span>> {
        let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let base_fonts: HashMap<&[u8], String> = fonts
            .iter()
            .map(|(name, dict)| {
                let base = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                (name.as_slice(), base)
            })
            .collect();

        let mut state = TextState::default();
        let mut spans = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => {
                    state.in_text = true;
                    state.matrix = TextMatrix::default();
                }
                "ET" => state.in_text = false,
                "Tf" if operands.len() >= 2 => {
                    if let Object::Name(name) = &operands[0] {
                        state.font_key = name.clone();
                        state.font_name = base_fonts
                            .get(name.as_slice())
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                    }
                    state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.matrix.leading = leading;
                    }
                }
                "Td" | "TD" if operands.len() >= 2 => {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.matrix.leading = -ty;
                    }
                    state.matrix.translate(tx, ty);
                }
                "Tm" if operands.len() >= 6 => {
                    let n: Vec<f32> = operands.iter().take(6).map(|o| get_number(o).unwrap_or(0.0)).collect();
                    state.matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
                "T*" => state.matrix.next_line(),
                "Tj" | "TJ" if state.in_text => {
                    if let Some(operand) = operands.first() {
                        let text = self.show_text(fonts.get(&state.font_key).copied(), operand);
                        spans.extend(state.emit(text, origin, page_index));
                    }
                }
                "'" | "\"" => {
                    state.matrix.next_line();
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    if let (true, Some(operand)) = (state.in_text, operands.get(idx)) {
                        let text = self.show_text(fonts.get(&state.font_key).copied(), operand);
                        spans.extend(state.emit(text, origin, page_index));
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Decode the operand of a text-showing operator.
    fn show_text(&self, font: Option<&Dictionary>, operand: &Object) -> String {
        let encoding = font.and_then(|f| f.get_font_encoding(&self.doc).ok());
        let decode = |bytes: &[u8]| match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
            None => decode_text_simple(bytes),
        };

        match operand {
            Object::String(bytes, _) => decode(bytes),
            Object::Array(items) => {
                let mut combined = String::new();
                for item in items {
                    match item {
                        Object::String(bytes, _) => combined.push_str(&decode(bytes)),
                        other => {
                            // Large negative adjustments advance past a word gap
                            if let Some(adjust) = get_number(other) {
                                if -adjust > TJ_SPACE_THRESHOLD && needs_space(&combined) {
                                    combined.push(' ');
                                }
                            }
                        }
                    }
                }
                combined
            }
            _ => String::new(),
        }
    }
}

impl PageTextProvider for LopdfProvider {
    fn get_pages(&self) -> Result<PageIter<'_>> {
        let pages: Vec<(u32, ObjectId)> = self
            .doc
            .get_pages()
            .into_iter()
            .filter(|(num, _)| self.options.pages.includes(*num))
            .collect();

        let lenient = self.options.is_lenient();
        Ok(Box::new(pages.into_iter().map(move |(num, id)| {
            match self.read_page(num, id) {
                Ok(page) => Ok(page),
                Err(e) if lenient => {
                    log::warn!("Failed to extract text from page {}: {}", num, e);
                    Ok(PageSpans::letter(num.saturating_sub(1) as usize))
                }
                Err(e) => Err(e),
            }
        })))
    }

    fn page_count(&self) -> Option<u32> {
        Some(self.doc.get_pages().len() as u32)
    }
}

/// Graphics state relevant to text extraction.
#[derive(Debug, Clone)]
struct TextState {
    in_text: bool,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    matrix: TextMatrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            in_text: false,
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            matrix: TextMatrix::default(),
        }
    }
}

impl TextState {
    /// Turn shown text into a span and advance the text position.
    fn emit(&mut self, text: String, origin: (f32, f32), page_index: usize) -> Option<Span> {
        let size = self.font_size * self.matrix.scale();
        let width = text.chars().count() as f32 * size * AVG_CHAR_WIDTH;
        let (x, y) = self.matrix.position();
        self.matrix.advance(text.chars().count() as f32 * self.font_size * AVG_CHAR_WIDTH);

        if text.trim().is_empty() {
            return None;
        }

        let x0 = x - origin.0;
        let top = origin.1 - (y + size * ASCENT);
        Some(Span::new(
            text,
            size,
            self.font_name.clone(),
            BBox::new(x0, top, x0 + width, top + size),
            page_index,
        ))
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    // Start of the current line
    line_e: f32,
    line_f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
            leading: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
        self.line_e = e;
        self.line_f = f;
    }

    /// Move to the start of the next line, offset by (tx, ty).
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 { self.leading } else { 12.0 };
        self.translate(0.0, -leading);
    }

    /// Move along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Vertical scale factor.
    fn scale(&self) -> f32 {
        let s = (self.c * self.c + self.d * self.d).sqrt();
        if s > 0.0 {
            s
        } else {
            1.0
        }
    }
}

fn rect_from_array(arr: &[Object]) -> Option<[f32; 4]> {
    if arr.len() < 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, obj) in rect.iter_mut().zip(arr) {
        *slot = get_number(obj)?;
    }
    Some(rect)
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && !is_spaceless_script_char(c),
        None => false,
    }
}

/// Check if a character is from a script that doesn't use word spaces
/// (Chinese and Japanese; Korean does use spaces).
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK symbols and punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
