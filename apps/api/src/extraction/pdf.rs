//! Page-level PDF text extraction on top of `lopdf`.
//!
//! Text is decoded per font: through the font's `ToUnicode` CMap when it has
//! one, through lopdf's named single-byte encodings otherwise. Composite fonts
//! with an `Identity-*` encoding and no CMap carry no recoverable text and
//! contribute nothing to the page.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("not a readable PDF document: {0}")]
    Malformed(#[from] lopdf::Error),
    #[error("PDF is password protected or uses an unsupported encryption scheme")]
    Encrypted,
}

/// Returns the text of every page in page order. A page whose content cannot
/// be decoded yields an empty string instead of failing the document.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    let mut document = Document::load_mem(bytes)?;
    if document.is_encrypted() {
        // Permission-only encryption opens with the empty user password.
        document.decrypt("").map_err(|e| {
            warn!("PDF could not be decrypted with an empty password: {e}");
            PdfError::Encrypted
        })?;
        debug!("Encrypted PDF opened with the empty user password");
    }

    // BTreeMap keys are page numbers, so iteration is already in page order.
    let pages = document.get_pages();
    debug!("PDF loaded with {} page(s)", pages.len());

    Ok(pages
        .iter()
        .map(|(&page_number, &page_id)| {
            page_text(&document, page_id).unwrap_or_else(|e| {
                warn!("Text extraction failed for PDF page {page_number}: {e}");
                String::new()
            })
        })
        .collect())
}

fn page_text(document: &Document, page_id: ObjectId) -> Result<String, lopdf::Error> {
    let decoders: BTreeMap<Vec<u8>, FontDecoder> = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, FontDecoder::for_font(document, font)))
        .collect();
    let content = document.get_and_decode_page_content(page_id)?;

    let fallback = FontDecoder::Named("StandardEncoding");
    let mut current = &fallback;
    let mut text = String::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(name) = operation.operands.first().and_then(|o| o.as_name().ok()) {
                    current = decoders.get(name).unwrap_or(&fallback);
                }
            }
            "Tj" | "TJ" => current.collect(&mut text, &operation.operands),
            "'" | "\"" => {
                push_line_break(&mut text);
                if let Some(shown) = operation.operands.last() {
                    current.collect(&mut text, std::slice::from_ref(shown));
                }
            }
            "ET" => push_line_break(&mut text),
            _ => {}
        }
    }
    Ok(text)
}

fn push_line_break(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

enum FontDecoder<'a> {
    Cmap(ToUnicodeMap),
    Named(&'a str),
    /// Glyph ids with no way back to characters.
    Opaque,
}

impl<'a> FontDecoder<'a> {
    fn for_font(document: &Document, font: &'a Dictionary) -> Self {
        let is_composite =
            font.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Type0".as_slice());
        if let Some(map) = ToUnicodeMap::from_font(document, font, is_composite) {
            return FontDecoder::Cmap(map);
        }

        // lopdf only knows the UCS-2 family among the predefined CJK CMaps.
        let encoding = font.get_font_encoding();
        if encoding.starts_with("Identity-") || (is_composite && !encoding.starts_with("Uni")) {
            FontDecoder::Opaque
        } else {
            FontDecoder::Named(encoding)
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match self {
            FontDecoder::Cmap(map) => map.decode(bytes),
            FontDecoder::Named(encoding) => Document::decode_text(Some(*encoding), bytes),
            FontDecoder::Opaque => String::new(),
        }
    }

    fn collect(&self, text: &mut String, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => text.push_str(&self.decode(bytes)),
                Object::Array(items) => {
                    self.collect(text, items);
                    text.push(' ');
                }
                // Large negative kerning inside TJ is how producers space words.
                Object::Integer(offset) if *offset < -100 => text.push(' '),
                _ => {}
            }
        }
    }
}

/// Character codes to Unicode, read from a font's `ToUnicode` CMap stream.
#[derive(Debug)]
struct ToUnicodeMap {
    code_width: usize,
    entries: HashMap<u32, String>,
}

enum Token {
    Hex(Vec<u8>),
    Word(String),
    ArrayStart,
    ArrayEnd,
}

impl ToUnicodeMap {
    fn from_font(document: &Document, font: &Dictionary, is_composite: bool) -> Option<Self> {
        let stream = font
            .get_deref(b"ToUnicode", document)
            .and_then(Object::as_stream)
            .ok()?;
        // decompressed_content errors on unfiltered streams.
        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let map = Self::parse(&data, if is_composite { 2 } else { 1 });
        if map.entries.is_empty() {
            warn!("Font ToUnicode CMap has no usable mappings");
            None
        } else {
            Some(map)
        }
    }

    fn parse(data: &[u8], default_width: usize) -> Self {
        let tokens = tokenize(data);
        let mut map = ToUnicodeMap {
            code_width: default_width,
            entries: HashMap::new(),
        };

        let mut rest = tokens.as_slice();
        while let Some((token, tail)) = rest.split_first() {
            rest = tail;
            let Token::Word(word) = token else { continue };
            match word.as_str() {
                "begincodespacerange" => {
                    if let [Token::Hex(low), ..] = rest {
                        if (1..=4).contains(&low.len()) {
                            map.code_width = low.len();
                        }
                    }
                }
                "beginbfchar" => {
                    while let [Token::Hex(src), Token::Hex(dst), tail @ ..] = rest {
                        map.entries.insert(code_of(src), unicode_of(dst));
                        rest = tail;
                    }
                }
                "beginbfrange" => loop {
                    match rest {
                        [Token::Hex(low), Token::Hex(high), Token::Hex(dst), tail @ ..] => {
                            map.insert_range(code_of(low), code_of(high), dst);
                            rest = tail;
                        }
                        [Token::Hex(low), Token::Hex(high), Token::ArrayStart, tail @ ..] => {
                            let high = code_of(high);
                            let mut code = code_of(low);
                            let mut items = tail;
                            while let [Token::Hex(dst), after @ ..] = items {
                                if code <= high {
                                    map.entries.insert(code, unicode_of(dst));
                                }
                                code = code.saturating_add(1);
                                items = after;
                            }
                            if let [Token::ArrayEnd, after @ ..] = items {
                                items = after;
                            }
                            rest = items;
                        }
                        _ => break,
                    }
                },
                _ => {}
            }
        }
        map
    }

    /// Consecutive codes map to consecutive values of the last UTF-16 unit.
    fn insert_range(&mut self, low: u32, high: u32, dst: &[u8]) {
        if high < low || high - low > 0xFFFF {
            return;
        }
        let base = utf16_units(dst);
        let Some((&last, prefix)) = base.split_last() else {
            return;
        };
        for (offset, code) in (low..=high).enumerate() {
            let mut units = prefix.to_vec();
            units.push(last.wrapping_add(offset as u16));
            self.entries.insert(code, String::from_utf16_lossy(&units));
        }
    }

    /// Unmapped codes are dropped.
    fn decode(&self, bytes: &[u8]) -> String {
        bytes
            .chunks(self.code_width)
            .filter_map(|chunk| self.entries.get(&code_of(chunk)))
            .map(String::as_str)
            .collect()
    }
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    fn is_delimiter(byte: u8) -> bool {
        byte.is_ascii_whitespace() || b"<>[]()%/".contains(&byte)
    }

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'<' => {
                let start = i + 1;
                let end = data[start..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| start + p);
                tokens.push(Token::Hex(hex_bytes(&data[start..end])));
                i = end + 1;
            }
            b'>' => i += 1,
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'(' => {
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                i += 1;
                while i < data.len() && !is_delimiter(data[i]) {
                    i += 1;
                }
                tokens.push(Token::Word(String::from_utf8_lossy(&data[start..i]).into_owned()));
            }
        }
    }
    tokens
}

/// A trailing odd digit is padded with zero.
fn hex_bytes(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|&c| (c as char).to_digit(16))
        .map(|d| d as u8)
        .collect();
    nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().take(4).fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect()
}

fn unicode_of(dst: &[u8]) -> String {
    if let [byte] = dst {
        char::from(*byte).to_string()
    } else {
        String::from_utf16_lossy(&utf16_units(dst))
    }
}
