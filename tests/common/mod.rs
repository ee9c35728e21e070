//! In-memory PDF engine for integration tests
//!
//! Documents are `%PDF-FAKE` followed by a JSON page list, so tests can
//! build inputs by hand and inspect outputs without PDFium.

#![allow(dead_code)]

use image::{DynamicImage, RgbaImage};
use parking_lot::Mutex;
use pdf_toolbox::pdf::{DocumentModel, PageRenderer, PageSize, PdfEngine, TextStamp, Viewport};
use pdf_toolbox::{Error, Result, UploadedDocument};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAGIC: &[u8] = b"%PDF-FAKE\n";

/// Small default page so image tests stay cheap at high DPI
pub const SMALL_PAGE: PageSize = PageSize {
    width: 40.0,
    height: 60.0,
};

pub const LETTER: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedStamp {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub opacity: f32,
    pub rotation_degrees: f32,
    pub rgb: (f32, f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakePage {
    pub label: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub stamps: Vec<RecordedStamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeDoc {
    pub pages: Vec<FakePage>,
}

impl FakeDoc {
    pub fn labels(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.label.clone()).collect()
    }
}

/// Serialize pages labelled `p1..=pN` of the given size
pub fn fake_pdf_sized(pages: u32, size: PageSize) -> Vec<u8> {
    let doc = FakeDoc {
        pages: (1..=pages)
            .map(|n| FakePage {
                label: format!("p{}", n),
                width: size.width,
                height: size.height,
                stamps: Vec::new(),
            })
            .collect(),
    };
    encode(&doc)
}

pub fn fake_pdf(pages: u32) -> Vec<u8> {
    fake_pdf_sized(pages, SMALL_PAGE)
}

/// A fake PDF whose pages carry the given labels
pub fn fake_pdf_labelled(labels: &[&str]) -> Vec<u8> {
    let doc = FakeDoc {
        pages: labels
            .iter()
            .map(|label| FakePage {
                label: label.to_string(),
                width: SMALL_PAGE.width,
                height: SMALL_PAGE.height,
                stamps: Vec::new(),
            })
            .collect(),
    };
    encode(&doc)
}

pub fn encode(doc: &FakeDoc) -> Vec<u8> {
    let mut bytes = MAGIC.to_vec();
    bytes.extend(serde_json::to_vec(doc).expect("fake document serializes"));
    bytes
}

pub fn decode(bytes: &[u8]) -> Result<FakeDoc> {
    let body = bytes.strip_prefix(MAGIC).ok_or_else(|| Error::InvalidPdf {
        reason: "not a fake PDF".to_string(),
    })?;
    serde_json::from_slice(body).map_err(|e| Error::InvalidPdf {
        reason: e.to_string(),
    })
}

pub fn uploaded(name: &str, pages: u32) -> UploadedDocument {
    UploadedDocument::new(name, fake_pdf(pages), pages)
}

pub fn uploaded_labelled(name: &str, labels: &[&str]) -> UploadedDocument {
    UploadedDocument::new(name, fake_pdf_labelled(labels), labels.len() as u32)
}

/// Engine whose documents live entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    /// Held by a test to keep runs from binding until it is released
    pub gate: Arc<Mutex<()>>,
    /// Pages (1-based) whose rendering fails
    pub failing_pages: Vec<u32>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pages: &[u32]) -> Self {
        Self {
            failing_pages: pages.to_vec(),
            ..Self::default()
        }
    }
}

impl PdfEngine for MemoryEngine {
    type Library = MemoryLibrary;

    fn bind(&self) -> Result<MemoryLibrary> {
        drop(self.gate.lock());
        Ok(MemoryLibrary {
            failing_pages: self.failing_pages.clone(),
        })
    }

    fn inspect(&self, bytes: &[u8]) -> Result<u32> {
        Ok(decode(bytes)?.pages.len() as u32)
    }
}

pub struct MemoryLibrary {
    failing_pages: Vec<u32>,
}

fn page_at(doc: &FakeDoc, index: u32) -> Result<&FakePage> {
    doc.pages
        .get(index as usize)
        .ok_or(Error::PageOutOfBounds {
            page: index + 1,
            total: doc.pages.len() as u32,
        })
}

impl DocumentModel for MemoryLibrary {
    type Document<'a> = FakeDoc where Self: 'a;

    fn load(&self, bytes: Vec<u8>) -> Result<FakeDoc> {
        decode(&bytes)
    }

    fn create(&self) -> Result<FakeDoc> {
        Ok(FakeDoc::default())
    }

    fn page_count(&self, document: &FakeDoc) -> u32 {
        document.pages.len() as u32
    }

    fn page_size(&self, document: &FakeDoc, index: u32) -> Result<PageSize> {
        let page = page_at(document, index)?;
        Ok(PageSize {
            width: page.width,
            height: page.height,
        })
    }

    fn remove_page(&self, document: &mut FakeDoc, index: u32) -> Result<()> {
        page_at(document, index)?;
        document.pages.remove(index as usize);
        Ok(())
    }

    fn copy_pages(
        &self,
        destination: &mut FakeDoc,
        source: &FakeDoc,
        indices: &[u32],
    ) -> Result<()> {
        for &index in indices {
            destination.pages.push(page_at(source, index)?.clone());
        }
        Ok(())
    }

    fn draw_text(&self, document: &mut FakeDoc, index: u32, stamp: &TextStamp) -> Result<()> {
        page_at(document, index)?;
        document.pages[index as usize].stamps.push(RecordedStamp {
            text: stamp.text.clone(),
            x: stamp.x,
            y: stamp.y,
            font_size: stamp.font_size,
            opacity: stamp.opacity,
            rotation_degrees: stamp.rotation_degrees,
            rgb: (stamp.color.r, stamp.color.g, stamp.color.b),
        });
        Ok(())
    }

    fn save(&self, document: &FakeDoc) -> Result<Vec<u8>> {
        Ok(encode(document))
    }
}

impl PageRenderer for MemoryLibrary {
    type Handle<'a> = FakeDoc where Self: 'a;

    fn open(&self, bytes: Vec<u8>) -> Result<FakeDoc> {
        decode(&bytes)
    }

    fn num_pages(&self, handle: &FakeDoc) -> u32 {
        handle.pages.len() as u32
    }

    fn viewport(&self, handle: &FakeDoc, page: u32, scale: f32) -> Result<Viewport> {
        let size = DocumentModel::page_size(self, handle, page.saturating_sub(1))?;
        Ok(Viewport::for_page(size, scale))
    }

    fn render(&self, handle: &FakeDoc, page: u32, viewport: &Viewport) -> Result<DynamicImage> {
        page_at(handle, page.saturating_sub(1))?;
        if self.failing_pages.contains(&page) {
            return Err(Error::Pdfium {
                reason: format!("cannot render page {}", page),
            });
        }
        // Shade encodes the page number so outputs differ per page
        let shade = 255u8.saturating_sub((page as u8).wrapping_mul(20));
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            viewport.width,
            viewport.height,
            [shade, shade, shade, 255].into(),
        )))
    }
}
