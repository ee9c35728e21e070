//! PDFium-backed document model and renderer

use super::model::{
    DocumentModel, PageRenderer, PageSize, PdfEngine, TextStamp, Viewport,
};
use super::qpdf::QpdfWrapper;
use crate::error::{Error, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

/// Engine that binds PDFium for each run and counts pages with qpdf
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine {
    library_dir: Option<PathBuf>,
}

impl PdfiumEngine {
    /// `library_dir` is searched for the PDFium shared library before the
    /// default locations.
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }
}

impl PdfEngine for PdfiumEngine {
    type Library = PdfiumLibrary;

    fn bind(&self) -> Result<PdfiumLibrary> {
        Ok(PdfiumLibrary {
            pdfium: create_pdfium(self.library_dir.as_deref())?,
        })
    }

    fn inspect(&self, bytes: &[u8]) -> Result<u32> {
        QpdfWrapper::get_page_count(bytes)
    }
}

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium(library_dir: Option<&Path>) -> Result<Pdfium> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = library_dir {
        candidates.push(dir.to_path_buf());
    }
    candidates.push(PathBuf::from("./"));
    candidates.push(PathBuf::from("/opt/pdfium/lib"));

    let bindings = candidates
        .iter()
        .find_map(|dir| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)).ok()
        })
        .map(Ok)
        .unwrap_or_else(Pdfium::bind_to_system_library)
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Map PDFium errors to our error type
fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::PasswordRequired
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

fn get_page<'a>(document: &PdfDocument<'a>, index: u32) -> Result<PdfPage<'a>> {
    document
        .pages()
        .get(index as PdfPageIndex)
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to get page {}: {}", index + 1, e),
        })
}

/// 0-based index for a 1-based page number
fn page_index(document: &PdfDocument<'_>, page: u32) -> Result<u32> {
    page.checked_sub(1).ok_or(Error::PageOutOfBounds {
        page,
        total: document.pages().len() as u32,
    })
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// PDFium bound for the duration of one run
pub struct PdfiumLibrary {
    pdfium: Pdfium,
}

impl DocumentModel for PdfiumLibrary {
    type Document<'a> = PdfDocument<'a> where Self: 'a;

    fn load(&self, bytes: Vec<u8>) -> Result<PdfDocument<'_>> {
        self.pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(map_pdfium_error)
    }

    fn create(&self) -> Result<PdfDocument<'_>> {
        self.pdfium.create_new_pdf().map_err(map_pdfium_error)
    }

    fn page_count(&self, document: &PdfDocument<'_>) -> u32 {
        document.pages().len() as u32
    }

    fn page_size(&self, document: &PdfDocument<'_>, index: u32) -> Result<PageSize> {
        let page = get_page(document, index)?;
        Ok(PageSize {
            width: page.width().value,
            height: page.height().value,
        })
    }

    fn remove_page(&self, document: &mut PdfDocument<'_>, index: u32) -> Result<()> {
        get_page(document, index)?
            .delete()
            .map_err(|e| Error::Pdfium {
                reason: format!("Failed to remove page {}: {}", index + 1, e),
            })
    }

    fn copy_pages(
        &self,
        destination: &mut PdfDocument<'_>,
        source: &PdfDocument<'_>,
        indices: &[u32],
    ) -> Result<()> {
        for &index in indices {
            let at = destination.pages().len();
            destination
                .pages_mut()
                .copy_page_from_document(source, index as PdfPageIndex, at)
                .map_err(|e| Error::Pdfium {
                    reason: format!("Failed to copy page {}: {}", index + 1, e),
                })?;
        }
        Ok(())
    }

    fn draw_text(
        &self,
        document: &mut PdfDocument<'_>,
        index: u32,
        stamp: &TextStamp,
    ) -> Result<()> {
        let font = document.fonts_mut().helvetica();

        let mut object = PdfPageTextObject::new(
            document,
            &stamp.text,
            font,
            PdfPoints::new(stamp.font_size),
        )
        .map_err(map_pdfium_error)?;

        // Fill alpha carries the opacity
        object
            .set_fill_color(PdfColor::new(
                to_channel(stamp.color.r),
                to_channel(stamp.color.g),
                to_channel(stamp.color.b),
                to_channel(stamp.opacity),
            ))
            .map_err(map_pdfium_error)?;
        object
            .rotate_counter_clockwise_degrees(stamp.rotation_degrees)
            .map_err(map_pdfium_error)?;
        object
            .translate(PdfPoints::new(stamp.x), PdfPoints::new(stamp.y))
            .map_err(map_pdfium_error)?;

        let mut page = get_page(document, index)?;
        page.objects_mut()
            .add_text_object(object)
            .map_err(|e| Error::Pdfium {
                reason: format!("Failed to draw text on page {}: {}", index + 1, e),
            })?;

        Ok(())
    }

    fn save(&self, document: &PdfDocument<'_>) -> Result<Vec<u8>> {
        document.save_to_bytes().map_err(|e| Error::Pdfium {
            reason: format!("Failed to save PDF: {}", e),
        })
    }
}

impl PageRenderer for PdfiumLibrary {
    type Handle<'a> = PdfDocument<'a> where Self: 'a;

    fn open(&self, bytes: Vec<u8>) -> Result<PdfDocument<'_>> {
        DocumentModel::load(self, bytes)
    }

    fn num_pages(&self, handle: &PdfDocument<'_>) -> u32 {
        handle.pages().len() as u32
    }

    fn viewport(&self, handle: &PdfDocument<'_>, page: u32, scale: f32) -> Result<Viewport> {
        let size = DocumentModel::page_size(self, handle, page_index(handle, page)?)?;
        Ok(Viewport::for_page(size, scale))
    }

    fn render(
        &self,
        handle: &PdfDocument<'_>,
        page: u32,
        viewport: &Viewport,
    ) -> Result<DynamicImage> {
        let pdf_page = get_page(handle, page_index(handle, page)?)?;

        // PDFium clears to white before drawing the page
        let config = PdfRenderConfig::new()
            .set_target_size(viewport.width as i32, viewport.height as i32)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| Error::Pdfium {
                reason: format!("Failed to render page {}: {}", page, e),
            })?;

        Ok(bitmap.as_image())
    }
}
