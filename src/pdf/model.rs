//! Seams between the tools and the PDF libraries
//!
//! The tools only ever talk to a [`DocumentModel`] (load, edit, save) and a
//! [`PageRenderer`] (rasterize). A [`PdfEngine`] binds both for the duration
//! of one run, on the blocking worker that executes it.

use crate::error::Result;
use image::DynamicImage;

/// Page dimensions in PDF points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Text to draw onto a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextStamp {
    pub text: String,
    /// Baseline origin, PDF user space (origin bottom-left)
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: RgbColor,
    /// `0.0` (invisible) to `1.0` (opaque)
    pub opacity: f32,
    /// Counter-clockwise degrees around the origin; negative turns clockwise
    pub rotation_degrees: f32,
}

/// Pixel dimensions of a page rendered at a given scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport for a page of `size` points at `scale` pixels per point
    pub fn for_page(size: PageSize, scale: f32) -> Self {
        Self {
            width: (size.width * scale).round().max(1.0) as u32,
            height: (size.height * scale).round().max(1.0) as u32,
        }
    }
}

/// Load, edit and serialize PDF documents.
///
/// Page indices are 0-based at this level; the tools translate from the
/// 1-based numbers users type.
pub trait DocumentModel {
    type Document<'a>
    where
        Self: 'a;

    fn load(&self, bytes: Vec<u8>) -> Result<Self::Document<'_>>;

    fn create(&self) -> Result<Self::Document<'_>>;

    fn page_count(&self, document: &Self::Document<'_>) -> u32;

    fn page_size(&self, document: &Self::Document<'_>, index: u32) -> Result<PageSize>;

    fn remove_page(&self, document: &mut Self::Document<'_>, index: u32) -> Result<()>;

    /// Copy `indices` from `source` and append them to `destination`, in the
    /// order given.
    fn copy_pages(
        &self,
        destination: &mut Self::Document<'_>,
        source: &Self::Document<'_>,
        indices: &[u32],
    ) -> Result<()>;

    fn draw_text(
        &self,
        document: &mut Self::Document<'_>,
        index: u32,
        stamp: &TextStamp,
    ) -> Result<()>;

    fn save(&self, document: &Self::Document<'_>) -> Result<Vec<u8>>;
}

/// Rasterize pages of a PDF.
///
/// Page numbers are 1-based, as in the page selectors.
pub trait PageRenderer {
    type Handle<'a>
    where
        Self: 'a;

    fn open(&self, bytes: Vec<u8>) -> Result<Self::Handle<'_>>;

    fn num_pages(&self, handle: &Self::Handle<'_>) -> u32;

    fn viewport(&self, handle: &Self::Handle<'_>, page: u32, scale: f32) -> Result<Viewport>;

    /// Render onto a white background at the viewport's size
    fn render(
        &self,
        handle: &Self::Handle<'_>,
        page: u32,
        viewport: &Viewport,
    ) -> Result<DynamicImage>;
}

/// Factory for the libraries a run needs.
///
/// The engine itself is shared across runs; [`PdfEngine::bind`] is called on
/// the blocking worker so the bound library never crosses threads.
pub trait PdfEngine: Send + Sync + 'static {
    type Library: DocumentModel + PageRenderer;

    fn bind(&self) -> Result<Self::Library>;

    /// Count pages without binding the full library. Used when a file is
    /// admitted to the session.
    fn inspect(&self, bytes: &[u8]) -> Result<u32>;
}
