//! Content stream interpretation.
//!
//! Walks a page's content operators with lopdf and reports where text runs
//! and images land in native PDF space. Glyph widths are estimated from the
//! font size rather than read from font metrics.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

use super::raw::RawWord;

/// Nesting limit for Form XObjects.
const MAX_FORM_DEPTH: usize = 4;

/// Limit on `/Parent` hops when resolving inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Average glyph advance as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// Ascent and descent as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// TJ adjustment (thousandths of an em) treated as a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Leading used by `T*` when none was set with `TL`.
const DEFAULT_LEADING: f32 = 12.0;

/// Affine transform `[a b c d e f]` as used by `cm` and `Tm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self` followed by `next` (the PDF product `self × next`).
    pub fn then(&self, next: &Matrix) -> Matrix {
        Matrix {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Vertical scale factor.
    pub fn scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Bounding box of the unit square under this transform.
    pub fn unit_square_bounds(&self) -> [f32; 4] {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        let mut bounds = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
        for (x, y) in corners {
            bounds[0] = bounds[0].min(x);
            bounds[1] = bounds[1].min(y);
            bounds[2] = bounds[2].max(x);
            bounds[3] = bounds[3].max(y);
        }
        bounds
    }
}

/// A piece of text shown by one text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Baseline start in native space
    pub start: (f32, f32),
    /// Baseline end in native space
    pub end: (f32, f32),
    /// Font size after all transforms
    pub font_size: f32,
}

impl TextRun {
    /// Bounding box of the whole run in native space.
    pub fn bbox(&self) -> [f32; 4] {
        span_box(self.start, self.end, self.font_size)
    }

    /// Split the run into words on whitespace, dividing its extent evenly
    /// between characters.
    pub fn words(&self) -> Vec<RawWord> {
        let chars: Vec<char> = self.text.chars().collect();
        let n = chars.len() as f32;
        if chars.is_empty() {
            return Vec::new();
        }
        let at = |i: usize| {
            let t = i as f32 / n;
            (
                self.start.0 + (self.end.0 - self.start.0) * t,
                self.start.1 + (self.end.1 - self.start.1) * t,
            )
        };

        let mut words = Vec::new();
        let mut start: Option<usize> = None;
        for (i, c) in chars.iter().enumerate() {
            match (c.is_whitespace(), start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    words.push(self.word(&chars[s..i], at(s), at(i)));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            words.push(self.word(&chars[s..], at(s), at(chars.len())));
        }
        words
    }

    fn word(&self, chars: &[char], from: (f32, f32), to: (f32, f32)) -> RawWord {
        RawWord {
            text: chars.iter().collect(),
            bbox: span_box(from, to, self.font_size),
        }
    }
}

fn span_box(from: (f32, f32), to: (f32, f32), font_size: f32) -> [f32; 4] {
    [
        from.0.min(to.0),
        from.1.min(to.1) - DESCENT * font_size,
        from.0.max(to.0),
        from.1.max(to.1) + ASCENT * font_size,
    ]
}

/// Text runs and image placements found on a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub runs: Vec<TextRun>,
    /// Image bounds `[x0, y0, x1, y1]` in native space
    pub images: Vec<[f32; 4]>,
}

/// Graphics state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

type FontTable<'a> = BTreeMap<Vec<u8>, &'a Dictionary>;

/// Interprets content streams of one document.
pub struct ContentInterpreter<'a> {
    doc: &'a LopdfDocument,
    content: PageContent,
}

impl<'a> ContentInterpreter<'a> {
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self {
            doc,
            content: PageContent::default(),
        }
    }

    /// Interpret every content stream of a page.
    pub fn interpret_page(mut self, page_id: ObjectId) -> Result<PageContent> {
        let data = page_content(self.doc, page_id)?;
        let ops = Content::decode(&data)
            .map_err(|e| Error::PdfParse(e.to_string()))?
            .operations;
        let resources = inherited(self.doc, page_id, b"Resources").and_then(|o| o.as_dict().ok());
        self.run(&ops, resources, Matrix::IDENTITY, 0);
        Ok(self.content)
    }

    fn run(
        &mut self,
        ops: &[Operation],
        resources: Option<&'a Dictionary>,
        base_ctm: Matrix,
        depth: usize,
    ) {
        let fonts = font_table(self.doc, resources);
        let mut state = GraphicsState::new(base_ctm);
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut text_matrix = Matrix::IDENTITY;
        let mut line_matrix = Matrix::IDENTITY;

        for op in ops {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_operand(operands) {
                        state.ctm = m.then(&state.ctm);
                    }
                }
                "BT" => {
                    text_matrix = Matrix::IDENTITY;
                    line_matrix = Matrix::IDENTITY;
                }
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            state.font = name.clone();
                        }
                        state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        line_matrix = Matrix::translation(tx, ty).then(&line_matrix);
                        text_matrix = line_matrix;
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_operand(operands) {
                        line_matrix = m;
                        text_matrix = m;
                    }
                }
                "T*" => {
                    line_matrix = next_line(&line_matrix, state.leading);
                    text_matrix = line_matrix;
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode(&fonts, &state.font, bytes);
                        self.show(&mut text_matrix, &state, text, 0.0);
                    }
                }
                "'" | "\"" => {
                    line_matrix = next_line(&line_matrix, state.leading);
                    text_matrix = line_matrix;
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(text_idx) {
                        let text = self.decode(&fonts, &state.font, bytes);
                        self.show(&mut text_matrix, &state, text, 0.0);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let mut combined = String::new();
                        let mut adjustment = 0.0;
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    combined.push_str(&self.decode(&fonts, &state.font, bytes));
                                }
                                other => {
                                    if let Some(n) = get_number(other) {
                                        if -n > TJ_SPACE_THRESHOLD
                                            && !combined.is_empty()
                                            && !combined.ends_with(' ')
                                        {
                                            combined.push(' ');
                                        }
                                        adjustment += -n / 1000.0 * state.font_size;
                                    }
                                }
                            }
                        }
                        self.show(&mut text_matrix, &state, combined, adjustment);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.invoke_xobject(resources, name, &state.ctm, depth);
                    }
                }
                "BI" => {
                    self.content.images.push(state.ctm.unit_square_bounds());
                }
                _ => {}
            }
        }
    }

    /// Record a text run and advance the text matrix past it.
    fn show(&mut self, text_matrix: &mut Matrix, state: &GraphicsState, text: String, extra: f32) {
        let advance =
            text.chars().count() as f32 * state.font_size * AVG_CHAR_WIDTH + extra;
        let render = text_matrix.then(&state.ctm);
        let start = render.apply(0.0, 0.0);
        let end = render.apply(advance, 0.0);
        let font_size = state.font_size * render.scale();

        *text_matrix = Matrix::translation(advance, 0.0).then(text_matrix);

        if text.trim().is_empty() {
            return;
        }
        self.content.runs.push(TextRun {
            text,
            start,
            end,
            font_size,
        });
    }

    fn invoke_xobject(
        &mut self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
        ctm: &Matrix,
        depth: usize,
    ) {
        let doc = self.doc;
        let stream = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_stream().ok());
        let Some(stream) = stream else {
            log::debug!(
                "XObject /{} not found in resources",
                String::from_utf8_lossy(name)
            );
            return;
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok());
        match subtype {
            Some(b"Image") => self.content.images.push(ctm.unit_square_bounds()),
            Some(b"Form") => {
                if depth >= MAX_FORM_DEPTH {
                    log::warn!("Form XObject nesting deeper than {}; skipped", MAX_FORM_DEPTH);
                    return;
                }
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| o.as_array().ok())
                    .and_then(|arr| matrix_operand(arr))
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|o| resolve(doc, o))
                    .and_then(|o| o.as_dict().ok())
                    .or(resources);
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                match Content::decode(&data) {
                    Ok(content) => self.run(
                        &content.operations,
                        form_resources,
                        form_matrix.then(ctm),
                        depth + 1,
                    ),
                    Err(e) => log::warn!("Cannot decode Form XObject content: {}", e),
                }
            }
            _ => {}
        }
    }

    fn decode(&self, fonts: &FontTable<'a>, font: &[u8], bytes: &[u8]) -> String {
        if let Some(font_dict) = fonts.get(font) {
            if let Ok(enc) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

fn next_line(line_matrix: &Matrix, leading: f32) -> Matrix {
    let leading = if leading == 0.0 { DEFAULT_LEADING } else { leading };
    Matrix::translation(0.0, -leading).then(line_matrix)
}

fn font_table<'a>(doc: &'a LopdfDocument, resources: Option<&'a Dictionary>) -> FontTable<'a> {
    let mut fonts = BTreeMap::new();
    let font_dict = resources
        .and_then(|r| r.get(b"Font").ok())
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok());
    if let Some(font_dict) = font_dict {
        for (name, value) in font_dict.iter() {
            if let Some(dict) = resolve(doc, value).and_then(|o| o.as_dict().ok()) {
                fonts.insert(name.clone(), dict);
            }
        }
    }
    fonts
}

/// Concatenated, decompressed content streams of a page.
pub(crate) fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        // A page without content is valid and empty
        Err(_) => return Ok(Vec::new()),
    };

    let mut content = Vec::new();
    let mut append = |obj: &Object| -> Result<()> {
        match resolve(doc, obj) {
            Some(Object::Stream(s)) => {
                let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                content.extend_from_slice(&data);
                content.push(b'\n');
                Ok(())
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    };

    match resolve(doc, contents) {
        Some(Object::Array(arr)) => {
            for obj in arr {
                if let Err(e) = append(obj) {
                    log::warn!("Skipping unreadable content stream: {}", e);
                }
            }
        }
        Some(_) => append(contents)?,
        None => return Err(Error::PdfParse("Invalid content stream".to_string())),
    }
    Ok(content)
}

/// Look up a page attribute, following `/Parent` for inheritable keys.
pub(crate) fn inherited<'a>(
    doc: &'a LopdfDocument,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Follow one level of indirection.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let v: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
    match v.as_slice() {
        [a, b, c, d, e, f] => Some(Matrix::new(*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
