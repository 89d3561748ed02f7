//! Content stream interpretation: text operators to positioned glyph runs.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};

/// ForceBold bit of a font descriptor's /Flags entry.
const FORCE_BOLD_FLAG: i64 = 1 << 18;

/// TJ adjustment (thousandths of text space) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Average glyph width as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// Deepest Form XObject nesting that is interpreted.
const MAX_FORM_DEPTH: usize = 8;

/// A run of text as found in the content stream, in PDF user space
/// (origin bottom-left, `y` is the baseline).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
    pub bold: bool,
}

/// Font information resolved from the page resources.
#[derive(Debug, Clone)]
struct FontInfo {
    base_font: String,
    bold: bool,
}

/// Fonts visible to one content stream, keyed by resource name.
struct FontTable<'a> {
    info: HashMap<Vec<u8>, FontInfo>,
    dicts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl<'a> FontTable<'a> {
    fn new(doc: &LopdfDocument, dicts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        let mut info = HashMap::new();
        for (name, font) in &dicts {
            let base_font = font
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let bold = is_bold_font_name(&base_font) || has_force_bold(doc, font);
            info.insert(name.clone(), FontInfo { base_font, bold });
        }
        Self { info, dicts }
    }

    /// Fonts of a `/Resources` dictionary.
    fn from_resources(doc: &'a LopdfDocument, resources: &'a Dictionary) -> Self {
        let mut dicts = BTreeMap::new();
        if let Some(fonts) = resources.get(b"Font").ok().and_then(|o| resolve_dict(doc, o)) {
            for (name, font) in fonts.iter() {
                if let Some(font) = resolve_dict(doc, font) {
                    dicts.insert(name.clone(), font);
                }
            }
        }
        Self::new(doc, dicts)
    }
}

/// Graphics state saved and restored by `q`/`Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_key: Vec<u8>,
    font_size: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font_key: Vec::new(),
            font_size: 12.0,
        }
    }
}

/// Reads the text runs of one page.
pub(crate) struct ContentReader<'a> {
    doc: &'a LopdfDocument,
    fonts: FontTable<'a>,
    resources: Option<&'a Dictionary>,
}

impl<'a> ContentReader<'a> {
    /// Prepare a reader for the page `page_id`.
    pub fn for_page(doc: &'a LopdfDocument, page_id: ObjectId) -> Result<Self> {
        let dicts = doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(Self {
            doc,
            fonts: FontTable::new(doc, dicts),
            resources: page_resources(doc, page_id),
        })
    }

    /// Get the concatenated content streams of a page.
    pub fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content streams is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => {
                // Unfiltered streams report an error from decompressed_content.
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return Ok(s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone()));
                }
                Err(Error::PdfParse("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            let data = s
                                .decompressed_content()
                                .unwrap_or_else(|_| s.content.clone());
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Interpret a content stream and collect its text runs.
    pub fn read(&self, content: &[u8]) -> Result<Vec<RawSpan>> {
        let mut spans = Vec::new();
        let mut state = GraphicsState::default();
        self.interpret(content, &self.fonts, self.resources, &mut state, 0, &mut spans)?;
        Ok(spans)
    }

    fn interpret(
        &self,
        content: &[u8],
        fonts: &FontTable<'a>,
        resources: Option<&'a Dictionary>,
        state: &mut GraphicsState,
        depth: usize,
        spans: &mut Vec<RawSpan>,
    ) -> Result<()> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in content.operations {
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        *state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        state.ctm = m.multiply(&state.ctm);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        self.show_form(name, fonts, resources, state, depth, spans);
                    }
                }
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(name) = &op.operands[0] {
                            state.font_key = name.clone();
                        }
                        state.font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        matrix.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            matrix.leading = -ty;
                        }
                        matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        matrix.set(m);
                    }
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        matrix.next_line();
                    }
                    if !in_text {
                        continue;
                    }

                    let font_key = &state.font_key;
                    let text = match op.operator.as_str() {
                        "TJ" => match op.operands.first() {
                            Some(Object::Array(arr)) => self.decode_array(fonts, font_key, arr),
                            _ => String::new(),
                        },
                        "\"" => match op.operands.get(2) {
                            Some(Object::String(bytes, _)) => self.decode(fonts, font_key, bytes),
                            _ => String::new(),
                        },
                        _ => match op.operands.first() {
                            Some(Object::String(bytes, _)) => self.decode(fonts, font_key, bytes),
                            _ => String::new(),
                        },
                    };

                    if text.trim().is_empty() {
                        continue;
                    }

                    // Text space to user space: Tm x CTM.
                    let rendering = matrix.current().multiply(&state.ctm);
                    let (x, y) = rendering.origin();
                    let advance = text.chars().count() as f32 * state.font_size * AVG_CHAR_WIDTH;
                    let (font_name, bold) = match fonts.info.get(font_key) {
                        Some(info) => (info.base_font.clone(), info.bold),
                        None => (String::from_utf8_lossy(font_key).to_string(), false),
                    };

                    spans.push(RawSpan {
                        text,
                        x,
                        y,
                        width: advance * rendering.horizontal_scale(),
                        font_size: state.font_size * rendering.vertical_scale(),
                        font_name,
                        bold,
                    });
                    matrix.advance(advance);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Interpret a Form XObject under its own matrix and resources.
    ///
    /// Image XObjects and unreadable forms are skipped.
    fn show_form(
        &self,
        name: &[u8],
        fonts: &FontTable<'a>,
        resources: Option<&'a Dictionary>,
        state: &GraphicsState,
        depth: usize,
        spans: &mut Vec<RawSpan>,
    ) {
        if depth >= MAX_FORM_DEPTH {
            log::debug!("Form XObject nesting exceeds {}, skipping", MAX_FORM_DEPTH);
            return;
        }
        let Some(form) = self.form_xobject(resources, name) else {
            return;
        };

        let form_matrix = form
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| Matrix::from_operands(arr))
            .unwrap_or(Matrix::IDENTITY);
        let mut inner = state.clone();
        inner.ctm = form_matrix.multiply(&state.ctm);

        // A form without /Resources uses those of the page that draws it.
        let own = form
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_dict(self.doc, o));
        let own_fonts;
        let (fonts, resources) = match own {
            Some(res) => {
                own_fonts = FontTable::from_resources(self.doc, res);
                (&own_fonts, Some(res))
            }
            None => (fonts, resources),
        };

        let content = form
            .decompressed_content()
            .unwrap_or_else(|_| form.content.clone());
        if let Err(e) = self.interpret(&content, fonts, resources, &mut inner, depth + 1, spans) {
            log::debug!(
                "Skipping Form XObject {}: {}",
                String::from_utf8_lossy(name),
                e
            );
        }
    }

    /// Look up `name` in the XObject resources, keeping only forms.
    fn form_xobject(&self, resources: Option<&'a Dictionary>, name: &[u8]) -> Option<&'a Stream> {
        let xobjects = resolve_dict(self.doc, resources?.get(b"XObject").ok()?)?;
        let stream = match xobjects.get(name).ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_stream().ok()?,
            Object::Stream(stream) => stream,
            _ => return None,
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|subtype| subtype == b"Form");
        is_form.then_some(stream)
    }

    /// Decode one string operand with the current font's encoding.
    fn decode(&self, fonts: &FontTable<'a>, font_key: &[u8], bytes: &[u8]) -> String {
        let encoding = fonts
            .dicts
            .get(font_key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());

        match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
            None => decode_text_simple(bytes),
        }
    }

    /// Decode a TJ array, turning large negative adjustments into spaces.
    fn decode_array(&self, fonts: &FontTable<'a>, font_key: &[u8], arr: &[Object]) -> String {
        let mut combined = String::new();

        for item in arr {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode(fonts, font_key, bytes))
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    let word_gap = adjustment > TJ_SPACE_THRESHOLD
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}');
                    if word_gap {
                        if let Some(c) = combined.chars().last() {
                            if !is_spaceless_script_char(c) {
                                combined.push(' ');
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        combined
    }
}

fn is_bold_font_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}

/// Check the ForceBold flag of a font's descriptor.
fn has_force_bold(doc: &LopdfDocument, font: &Dictionary) -> bool {
    let descriptor = match font.get(b"FontDescriptor") {
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok(),
        Ok(Object::Dictionary(d)) => Some(d),
        _ => None,
    };

    descriptor
        .and_then(|d| d.get(b"Flags").ok())
        .and_then(|f| f.as_i64().ok())
        .map(|flags| flags & FORCE_BOLD_FLAG != 0)
        .unwrap_or(false)
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// Six numeric operands, as taken by `cm` and `Tm` or stored in `/Matrix`.
    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let mut v = [0.0f32; 6];
        for (slot, obj) in v.iter_mut().zip(operands) {
            *slot = get_number(obj)?;
        }
        Some(Self {
            a: v[0],
            b: v[1],
            c: v[2],
            d: v[3],
            e: v[4],
            f: v[5],
        })
    }

    /// `self` applied first, then `other`.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn origin(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Length of the transformed unit x vector.
    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Length of the transformed unit y vector; glyph height scales by this.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text and line matrices of a text object.
#[derive(Debug, Clone)]
struct TextMatrix {
    matrix: Matrix,
    /// Line start, restored by line moves
    line: Matrix,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line: Matrix::IDENTITY,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, m: Matrix) {
        self.matrix = m;
        self.line = m;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line = Matrix::translation(tx, ty).multiply(&self.line);
        self.matrix = self.line;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    /// Move past shown text without starting a new line.
    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).multiply(&self.matrix);
    }

    fn current(&self) -> &Matrix {
        &self.matrix
    }
}

/// Resources of a page, following /Parent for inherited entries.
fn page_resources(doc: &LopdfDocument, page_id: ObjectId) -> Option<&Dictionary> {
    let mut current = page_id;
    // Bounded against /Parent cycles.
    for _ in 0..32 {
        let dict = doc.get_dictionary(current).ok()?;
        if let Some(resources) = dict.get(b"Resources").ok().and_then(|o| resolve_dict(doc, o)) {
            return Some(resources);
        }
        current = match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => *parent,
            _ => return None,
        };
    }
    None
}

/// A dictionary given inline or by reference.
fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Characters of scripts written without word spaces (Chinese, Japanese).
/// Hangul is deliberately absent: Korean uses spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Fallback decoding when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
