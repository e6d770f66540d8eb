//! Shared fixtures for unit tests: fabricated PDFs, counting mocks, local servers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, encryption, Document, Object, ObjectId, Stream, StringFormat};

use crate::errors::PipelineError;
use crate::llm_client::{LlmBackend, LlmError};
use crate::pipeline::jd_resolver::PageFetcher;

/// Builds an in-memory PDF with one page per entry. An empty entry produces a
/// page with no text layer, like a scanned image.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    save(&mut courier_document(pages))
}

/// Builds a one-page PDF drawn with a composite (Type0) font using two-byte
/// `Identity-H` glyph codes. With `to_unicode` the font carries a CMap mapping
/// each code back to its character; without it the glyphs are unreadable.
pub fn sample_cid_pdf(text: &str, to_unicode: bool) -> Vec<u8> {
    let mut glyphs: Vec<char> = Vec::new();
    let mut codes = Vec::new();
    for ch in text.chars() {
        let index = glyphs.iter().position(|&g| g == ch).unwrap_or_else(|| {
            glyphs.push(ch);
            glyphs.len() - 1
        });
        codes.extend_from_slice(&(index as u16 + 1).to_be_bytes());
    }

    let mut doc = Document::with_version("1.5");
    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "Inter",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
    });
    let mut font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "Inter",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::from(descendant_id)],
    };
    if to_unicode {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        cmap.push_str(&format!("{} beginbfchar\n", glyphs.len()));
        for (index, ch) in glyphs.iter().enumerate() {
            let mut buf = [0u16; 2];
            let unicode: String = ch
                .encode_utf16(&mut buf)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{unicode}>\n", index + 1));
        }
        cmap.push_str("endbfchar\nendcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        let cmap_id = doc.add_object(Stream::new(dictionary! {}, cmap.into_bytes()));
        font.set("ToUnicode", cmap_id);
    }
    let font_id = doc.add_object(font);

    let shown = Object::String(codes, StringFormat::Hexadecimal);
    add_pages(&mut doc, font_id, vec![text_operations(shown)]);
    save(&mut doc)
}

/// Same pages as [`sample_pdf`], encrypted with the standard security handler
/// and an empty user password. Algorithm versions other than 1 and 2 are
/// declared but not applied, so the result cannot be opened.
pub fn encrypted_pdf(pages: &[&str], version: i64) -> Vec<u8> {
    let mut doc = courier_document(pages);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => version,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(vec![0x5a; 32], StringFormat::Hexadecimal),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(b"resume-file-id-0".to_vec(), StringFormat::Hexadecimal),
            Object::String(b"resume-file-id-1".to_vec(), StringFormat::Hexadecimal),
        ],
    );

    // RC4 is symmetric: lopdf's per-object decryption doubles as encryption.
    if let Ok(key) = encryption::get_encryption_key(&doc, "", false) {
        for (&id, object) in doc.objects.iter_mut() {
            if id == encrypt_id {
                continue;
            }
            let Ok(cipher) = encryption::decrypt_object(&key, id, object) else {
                continue;
            };
            match object {
                Object::Stream(stream) => stream.set_content(cipher),
                Object::String(content, _) => *content = cipher,
                _ => {}
            }
        }
    }
    save(&mut doc)
}

fn courier_document(pages: &[&str]) -> Document {
    let mut doc = Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let page_operations = pages
        .iter()
        .map(|text| {
            if text.is_empty() {
                vec![]
            } else {
                text_operations(Object::string_literal(*text))
            }
        })
        .collect();
    add_pages(&mut doc, font_id, page_operations);
    doc
}

fn text_operations(shown: Object) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
        Operation::new("Tj", vec![shown]),
        Operation::new("ET", vec![]),
    ]
}

fn add_pages(doc: &mut Document, font_id: ObjectId, page_operations: Vec<Vec<Operation>>) {
    let pages_id = doc.new_object_id();
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in page_operations {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
}

fn save(doc: &mut Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize sample pdf");
    bytes
}

/// Serves `app` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// LLM backend that returns a fixed reply and records every prompt it sees.
pub struct MockBackend {
    reply: String,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn generate(&self, _api_key: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// Page fetcher that serves the same HTML for every URL.
pub struct MockFetcher {
    html: String,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn serving(html: &str) -> Self {
        Self {
            html: html.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }
}
